//! # SMARTx Common Library
//!
//! Shared code for the SMARTx public profile services:
//! - Artist data model (raw records and the resolved public profile)
//! - Data platform schema and read queries
//! - Storage reference resolution and URL signing
//! - Video provider classification
//! - Profile aggregation
//! - Configuration loading and logging setup

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod video;

pub use aggregate::ProfileAggregator;
pub use error::{Error, Result};

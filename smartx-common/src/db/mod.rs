//! Data platform: SQLite schema and read queries

pub mod init;
pub mod source;

pub use init::*;
pub use source::{LookupKey, ProfileSource, SqliteProfileSource};

//! HTTP API handlers for smartx-api

pub mod health;
pub mod profile;

pub use health::health_routes;
pub use profile::get_public_profile;

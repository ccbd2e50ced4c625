//! smartx-import library - CSV import of legacy artist exports
//!
//! Reads a member export, maps columns by header name, normalizes legacy
//! video banner paths and inserts artists that are not yet on the data
//! platform.

pub mod banner;
pub mod columns;
pub mod error;
pub mod importer;
pub mod parser;

pub use banner::{normalize_video_banner, BannerPath};
pub use columns::{import_columns, ColumnMap};
pub use error::{ImportError, ImportResult};
pub use importer::{slugify, ImportReport, Importer};
pub use parser::{clean_value, parse_line};

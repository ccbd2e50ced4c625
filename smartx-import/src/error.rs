//! Error types for smartx-import

use thiserror::Error;

/// Import failures that stop the whole file
///
/// Per-row problems are counted in the report instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Header lacks required columns; nothing was written
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// No header line
    #[error("CSV file is empty")]
    EmptyFile,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Common error: {0}")]
    Common(#[from] smartx_common::Error),
}

pub type ImportResult<T> = Result<T, ImportError>;

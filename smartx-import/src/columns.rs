//! Header-validated column mapping
//!
//! CSV headers are matched by name against the artist columns of the data
//! platform, so column order in the file does not matter. `id` and `slug`
//! are generated on import and never read from the file.

use crate::error::{ImportError, ImportResult};
use crate::parser::clean_value;
use smartx_common::db::{PHOTO_COLUMNS, PROFILE_COLUMNS, VIDEO_COLUMNS};
use std::collections::HashMap;
use tracing::debug;

pub const MEMBER_ID: &str = "member_id";
pub const ARTISTIC_NAME: &str = "artistic_name";
pub const FULL_NAME: &str = "full_name";
pub const VIDEO_BANNER_LANDSCAPE: &str = "video_banner_landscape";
pub const VIDEO_BANNER_PORTRAIT: &str = "video_banner_portrait";

/// Yes/no columns stored as 0/1
pub const FLAG_COLUMNS: [&str; 3] = ["perfil_completo", "accepted_terms1", "accepted_terms2"];

/// Every column a CSV may populate, in insert order
pub fn import_columns() -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = PROFILE_COLUMNS
        .iter()
        .copied()
        .filter(|c| !matches!(*c, "id" | "slug"))
        .collect();
    columns.push("email");
    for (image, caption) in PHOTO_COLUMNS {
        columns.push(image);
        columns.push(caption);
    }
    columns.extend(VIDEO_COLUMNS);
    columns
}

/// Positions of known columns within a CSV row
#[derive(Debug, Clone)]
pub struct ColumnMap {
    positions: HashMap<&'static str, usize>,
}

impl ColumnMap {
    /// Match header cells to importable columns
    ///
    /// Fails when `member_id` or both name columns are missing.
    pub fn from_header(header: &[String]) -> ImportResult<Self> {
        let known = import_columns();
        let mut positions = HashMap::new();

        for (index, cell) in header.iter().enumerate() {
            let name = clean_value(cell.trim_start_matches('\u{feff}'))
                .unwrap_or_default()
                .to_ascii_lowercase();

            match known.iter().find(|c| **c == name) {
                Some(column) => {
                    // First occurrence wins on duplicate headers
                    positions.entry(*column).or_insert(index);
                }
                None => debug!(header = %cell, position = index, "Ignoring unknown CSV column"),
            }
        }

        let mut missing = Vec::new();
        if !positions.contains_key(MEMBER_ID) {
            missing.push(MEMBER_ID.to_string());
        }
        if !positions.contains_key(ARTISTIC_NAME) && !positions.contains_key(FULL_NAME) {
            missing.push(format!("{} or {}", ARTISTIC_NAME, FULL_NAME));
        }
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(Self { positions })
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Mapped columns in insert order
    pub fn columns(&self) -> Vec<&'static str> {
        import_columns()
            .into_iter()
            .filter(|c| self.positions.contains_key(c))
            .collect()
    }

    /// Cleaned value of `column` in `row`; short rows read as empty
    pub fn value(&self, row: &[String], column: &str) -> Option<String> {
        let index = *self.positions.get(column)?;
        row.get(index).and_then(|cell| clean_value(cell))
    }
}

/// Truthy CSV markers for flag columns
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "sim" | "s" | "x")
    )
}

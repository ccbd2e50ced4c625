//! Idempotent artist import from CSV
//!
//! Rows are processed in file order, one at a time, so a member id that
//! appears twice is imported once and skipped the second time. A bad row
//! is counted and logged; it never stops the import.

use crate::banner::{normalize_video_banner, BannerPath};
use crate::columns::{
    parse_flag, ColumnMap, ARTISTIC_NAME, FLAG_COLUMNS, FULL_NAME, MEMBER_ID,
    VIDEO_BANNER_LANDSCAPE, VIDEO_BANNER_PORTRAIT,
};
use crate::error::{ImportError, ImportResult};
use crate::parser::parse_line;
use smartx_common::model::DEFAULT_STAGE_NAME;
use smartx_common::storage::BucketConfig;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Counts reported after an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errored: usize,
    pub banners_normalized: usize,
    pub banners_discarded: usize,
}

impl ImportReport {
    /// Operator-facing one-liner
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Imported {}, skipped {}, errors {}.",
            self.imported, self.skipped, self.errored
        );
        if self.banners_normalized > 0 || self.banners_discarded > 0 {
            summary.push_str(&format!(
                " Video banners: {} normalized, {} discarded.",
                self.banners_normalized, self.banners_discarded
            ));
        }
        summary
    }

    fn record_banner(&mut self, banner: &BannerPath) {
        match banner {
            BannerPath::Normalized(_) => self.banners_normalized += 1,
            BannerPath::Invalid(_) => self.banners_discarded += 1,
            BannerPath::Empty | BannerPath::Valid(_) => {}
        }
    }
}

/// Outcome of one row
enum RowOutcome {
    Imported,
    Skipped,
}

/// Writes CSV rows into the `artists` table
pub struct Importer {
    pool: SqlitePool,
    buckets: BucketConfig,
}

impl Importer {
    pub fn new(pool: SqlitePool, buckets: BucketConfig) -> Self {
        Self { pool, buckets }
    }

    pub async fn import_file(&self, path: &Path) -> ImportResult<ImportReport> {
        let content = tokio::fs::read_to_string(path).await?;
        info!("Importing artists from {}", path.display());
        self.import_str(&content).await
    }

    /// Import CSV text; the first non-blank line is the header
    pub async fn import_str(&self, content: &str) -> ImportResult<ImportReport> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or(ImportError::EmptyFile)?;
        let columns = ColumnMap::from_header(&parse_line(header))?;
        debug!(columns = ?columns.columns(), "CSV header mapped");

        let mut report = ImportReport::default();

        for (index, line) in lines {
            let line_number = index + 1;
            let row = parse_line(line);

            match self.import_row(&columns, &row, &mut report).await {
                Ok(RowOutcome::Imported) => report.imported += 1,
                Ok(RowOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    warn!(line = line_number, error = %e, "Row not imported");
                    report.errored += 1;
                }
            }
        }

        info!("{}", report.summary());
        Ok(report)
    }

    async fn import_row(
        &self,
        columns: &ColumnMap,
        row: &[String],
        report: &mut ImportReport,
    ) -> Result<RowOutcome, RowError> {
        let member_id = columns.value(row, MEMBER_ID).ok_or(RowError::MissingMemberId)?;

        if self.member_exists(&member_id).await? {
            debug!(member_id = %member_id, "Member already imported, skipping");
            return Ok(RowOutcome::Skipped);
        }

        let mut names: Vec<&'static str> = vec!["id", "slug"];
        let mut values: Vec<Value> = vec![
            Value::Text(Some(Uuid::new_v4().to_string())),
            Value::Text(Some(self.unique_slug(columns, row, &member_id).await?)),
        ];

        for column in columns.columns() {
            let value = match column {
                VIDEO_BANNER_LANDSCAPE | VIDEO_BANNER_PORTRAIT => {
                    let raw = columns.value(row, column);
                    let banner = normalize_video_banner(raw.as_deref(), &self.buckets);
                    report.record_banner(&banner);
                    if let BannerPath::Invalid(path) = &banner {
                        warn!(member_id = %member_id, column, path = %path, "Discarding banner from another bucket");
                    }
                    Value::Text(banner.into_value())
                }
                c if FLAG_COLUMNS.contains(&c) => {
                    Value::Flag(parse_flag(columns.value(row, c).as_deref()))
                }
                c => Value::Text(columns.value(row, c)),
            };
            names.push(column);
            values.push(value);
        }

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "INSERT INTO artists ({}) VALUES ({})",
            names.join(", "),
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for value in values {
            query = match value {
                Value::Text(text) => query.bind(text),
                Value::Flag(flag) => query.bind(flag as i64),
            };
        }
        query.execute(&self.pool).await?;

        debug!(member_id = %member_id, "Artist imported");
        Ok(RowOutcome::Imported)
    }

    async fn member_exists(&self, member_id: &str) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM artists WHERE member_id = ? LIMIT 1")
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn slug_taken(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM artists WHERE slug = ? LIMIT 1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Slug from the stage name, suffixed with the member id when taken
    async fn unique_slug(
        &self,
        columns: &ColumnMap,
        row: &[String],
        member_id: &str,
    ) -> Result<String, sqlx::Error> {
        let stage_name = columns
            .value(row, ARTISTIC_NAME)
            .or_else(|| columns.value(row, FULL_NAME))
            .unwrap_or_else(|| DEFAULT_STAGE_NAME.to_string());

        let base = slugify(&stage_name);
        let base = if base.is_empty() { slugify(member_id) } else { base };

        if !self.slug_taken(&base).await? {
            return Ok(base);
        }
        Ok(format!("{}-{}", base, slugify(member_id)))
    }
}

/// Insert value for one column
enum Value {
    Text(Option<String>),
    Flag(bool),
}

#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error("row has no member_id")]
    MissingMemberId,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lowercase ASCII slug; common Latin accents are folded first
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars().map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Ana Lua"), "ana-lua");
        assert_eq!(slugify("  João & Conceição  "), "joao-conceicao");
        assert_eq!(slugify("DJ--X!!"), "dj-x");
        assert_eq!(slugify("★"), "");
    }

    #[test]
    fn test_summary_wording() {
        let report = ImportReport {
            imported: 3,
            skipped: 1,
            errored: 0,
            banners_normalized: 2,
            banners_discarded: 1,
        };
        assert_eq!(
            report.summary(),
            "Imported 3, skipped 1, errors 0. Video banners: 2 normalized, 1 discarded."
        );

        let report = ImportReport {
            imported: 1,
            ..Default::default()
        };
        assert_eq!(report.summary(), "Imported 1, skipped 0, errors 0.");
    }
}

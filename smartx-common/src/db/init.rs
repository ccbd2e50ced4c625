//! Database initialization
//!
//! Creates the data platform schema: the `artists` table, the
//! `artist_public_view` read view, and the `projects` and `events`
//! collections. All statements are idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Photo slot columns, in slot order: (image, caption)
pub const PHOTO_COLUMNS: [(&str, &str); 12] = [
    ("image1", "image1_text"),
    ("image2", "image2_text"),
    ("image3", "image3_text"),
    ("image4", "image4_text"),
    ("image5", "image5_text"),
    ("image6", "image6_text"),
    ("image7", "image7_text"),
    ("image8", "image8_text"),
    ("image9", "image9_text"),
    ("image10", "image10_text"),
    ("image11", "image11_text"),
    ("image12", "image12_text"),
];

/// Video slot columns, in slot order
pub const VIDEO_COLUMNS: [&str; 10] = [
    "link_to_video",
    "link_to_video2",
    "link_to_video3",
    "link_to_video4",
    "link_to_video5",
    "link_to_video6",
    "link_to_video7",
    "link_to_video8",
    "link_to_video9",
    "link_to_video10",
];

/// Non-slot columns exposed through `artist_public_view`
pub const PROFILE_COLUMNS: [&str; 25] = [
    "id",
    "slug",
    "member_id",
    "artistic_name",
    "full_name",
    "country_residence",
    "city",
    "country_of_birth",
    "profile_text2",
    "visao_geral_titulo",
    "historia_titulo",
    "carreira_titulo",
    "mais_titulo",
    "profile_image",
    "video_banner_landscape",
    "video_banner_portrait",
    "audio",
    "website",
    "instagram",
    "facebook",
    "youtube_channel",
    "music_spotify_apple",
    "perfil_completo",
    "accepted_terms1",
    "accepted_terms2",
];

/// All columns of `artist_public_view`, in a stable order
pub fn public_columns() -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = PROFILE_COLUMNS.to_vec();
    for (image, caption) in PHOTO_COLUMNS {
        columns.push(image);
        columns.push(caption);
    }
    columns.extend(VIDEO_COLUMNS);
    columns
}

/// Open or create the database file and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
///
/// One connection only: every SQLite `:memory:` connection is a separate database.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Create tables and views if missing
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_artists_table(pool).await?;
    create_public_view(pool).await?;
    create_projects_table(pool).await?;
    create_events_table(pool).await?;

    Ok(())
}

async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    let mut columns = vec![
        "id TEXT PRIMARY KEY".to_string(),
        "slug TEXT UNIQUE".to_string(),
        "member_id TEXT UNIQUE".to_string(),
        "email TEXT".to_string(),
    ];
    for column in PROFILE_COLUMNS.iter().skip(3) {
        let column_type = match *column {
            "perfil_completo" | "accepted_terms1" | "accepted_terms2" => {
                "INTEGER NOT NULL DEFAULT 0"
            }
            _ => "TEXT",
        };
        columns.push(format!("{} {}", column, column_type));
    }
    for (image, caption) in PHOTO_COLUMNS {
        columns.push(format!("{} TEXT", image));
        columns.push(format!("{} TEXT", caption));
    }
    for video in VIDEO_COLUMNS {
        columns.push(format!("{} TEXT", video));
    }
    columns.push("created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP".to_string());

    let sql = format!(
        "CREATE TABLE IF NOT EXISTS artists (\n    {}\n)",
        columns.join(",\n    ")
    );
    sqlx::query(&sql).execute(pool).await?;

    Ok(())
}

async fn create_public_view(pool: &SqlitePool) -> Result<()> {
    let sql = format!(
        "CREATE VIEW IF NOT EXISTS artist_public_view AS SELECT {} FROM artists",
        public_columns().join(", ")
    );
    sqlx::query(&sql).execute(pool).await?;

    Ok(())
}

async fn create_projects_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            member_id TEXT NOT NULL,
            title TEXT,
            description TEXT,
            image_path TEXT,
            video_path TEXT,
            link TEXT,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_projects_member ON projects(member_id, status)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            member_id TEXT NOT NULL,
            title TEXT,
            description TEXT,
            event_date TEXT,
            place TEXT,
            link TEXT,
            image_path TEXT,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_member ON events(member_id, status)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_columns_cover_all_slots() {
        let columns = public_columns();
        assert_eq!(columns.len(), 25 + 24 + 10);
        assert_eq!(columns[0], "id");
        assert!(columns.contains(&"image12_text"));
        assert!(columns.contains(&"link_to_video10"));
        assert!(!columns.contains(&"email"));
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let pool = init_in_memory().await.unwrap();
        init_schema(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artist_public_view")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_file_database_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("smartx.db");

        let pool = init_database(&path).await.unwrap();
        assert!(path.exists());

        sqlx::query("INSERT INTO artists (id, slug) VALUES ('a1', 'ana')")
            .execute(&pool)
            .await
            .unwrap();
        let slug: String = sqlx::query_scalar("SELECT slug FROM artist_public_view WHERE id = 'a1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(slug, "ana");
    }
}

//! Read-only queries the profile aggregator runs against the data platform

use super::init::{public_columns, PHOTO_COLUMNS, VIDEO_COLUMNS};
use crate::model::{
    EventRecord, Narrative, PhotoSlot, ProjectRecord, PublicationStatus, RawArtistRecord,
    SocialLinks, VideoSlot, PHOTO_SLOTS, VIDEO_SLOTS,
};
use crate::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::debug;

/// Column an artist can be looked up by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKey {
    Slug,
    Id,
    MemberId,
}

impl LookupKey {
    /// Lookup order for public identifiers; first match wins
    pub const ORDER: [LookupKey; 3] = [LookupKey::Slug, LookupKey::Id, LookupKey::MemberId];

    pub fn column(&self) -> &'static str {
        match self {
            LookupKey::Slug => "slug",
            LookupKey::Id => "id",
            LookupKey::MemberId => "member_id",
        }
    }
}

/// Data platform queries used by the aggregator
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// One artist by the given key; no matching row is `Ok(None)`
    async fn find_artist(&self, key: LookupKey, value: &str) -> Result<Option<RawArtistRecord>>;

    /// Published projects owned by `member_id`
    async fn published_projects(&self, member_id: &str) -> Result<Vec<ProjectRecord>>;

    /// Published events owned by `member_id`
    async fn published_events(&self, member_id: &str) -> Result<Vec<EventRecord>>;
}

/// `ProfileSource` over the SQLite data platform
#[derive(Clone)]
pub struct SqliteProfileSource {
    pool: SqlitePool,
}

impl SqliteProfileSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ProfileSource for SqliteProfileSource {
    async fn find_artist(&self, key: LookupKey, value: &str) -> Result<Option<RawArtistRecord>> {
        let sql = format!(
            "SELECT {} FROM artist_public_view WHERE {} = ? LIMIT 1",
            public_columns().join(", "),
            key.column()
        );

        let record = sqlx::query_as::<_, RawArtistRecord>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        debug!(
            column = key.column(),
            value = %value,
            found = record.is_some(),
            "Artist lookup"
        );

        Ok(record)
    }

    async fn published_projects(&self, member_id: &str) -> Result<Vec<ProjectRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, member_id, title, description, image_path, video_path, link, status
            FROM projects
            WHERE member_id = ? AND status = 'published'
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<ProjectRecord> {
                Ok(ProjectRecord {
                    id: row.try_get("id")?,
                    member_id: row.try_get("member_id")?,
                    title: row.try_get("title")?,
                    description: row.try_get("description")?,
                    image_path: row.try_get("image_path")?,
                    video_path: row.try_get("video_path")?,
                    link: row.try_get("link")?,
                    status: PublicationStatus::parse(&row.try_get::<String, _>("status")?),
                })
            })
            .collect()
    }

    async fn published_events(&self, member_id: &str) -> Result<Vec<EventRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, member_id, title, description, event_date, place, link, image_path, status
            FROM events
            WHERE member_id = ? AND status = 'published'
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<EventRecord> {
                Ok(EventRecord {
                    id: row.try_get("id")?,
                    member_id: row.try_get("member_id")?,
                    title: row.try_get("title")?,
                    description: row.try_get("description")?,
                    event_date: row.try_get("event_date")?,
                    place: row.try_get("place")?,
                    link: row.try_get("link")?,
                    image_path: row.try_get("image_path")?,
                    status: PublicationStatus::parse(&row.try_get::<String, _>("status")?),
                })
            })
            .collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for RawArtistRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let mut photos: [PhotoSlot; PHOTO_SLOTS] = Default::default();
        for (slot, (image, caption)) in photos.iter_mut().zip(PHOTO_COLUMNS) {
            slot.path = row.try_get(image)?;
            slot.caption = row.try_get(caption)?;
        }

        let mut videos: [VideoSlot; VIDEO_SLOTS] = Default::default();
        for (slot, column) in videos.iter_mut().zip(VIDEO_COLUMNS) {
            slot.link = row.try_get(column)?;
        }

        let flag = |column: &str| -> sqlx::Result<bool> {
            Ok(row.try_get::<Option<bool>, _>(column)?.unwrap_or(false))
        };

        Ok(RawArtistRecord {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            member_id: row.try_get("member_id")?,
            artistic_name: row.try_get("artistic_name")?,
            full_name: row.try_get("full_name")?,
            country_residence: row.try_get("country_residence")?,
            city: row.try_get("city")?,
            country_of_birth: row.try_get("country_of_birth")?,
            profile_text2: row.try_get("profile_text2")?,
            narrative: Narrative {
                vision: row.try_get("visao_geral_titulo")?,
                history: row.try_get("historia_titulo")?,
                career: row.try_get("carreira_titulo")?,
                more: row.try_get("mais_titulo")?,
            },
            profile_image: row.try_get("profile_image")?,
            video_banner_landscape: row.try_get("video_banner_landscape")?,
            video_banner_portrait: row.try_get("video_banner_portrait")?,
            audio: row.try_get("audio")?,
            photos,
            videos,
            socials: SocialLinks {
                website: row.try_get("website")?,
                instagram: row.try_get("instagram")?,
                facebook: row.try_get("facebook")?,
                youtube_channel: row.try_get("youtube_channel")?,
                music_spotify_apple: row.try_get("music_spotify_apple")?,
            },
            perfil_completo: flag("perfil_completo")?,
            accepted_terms1: flag("accepted_terms1")?,
            accepted_terms2: flag("accepted_terms2")?,
        })
    }
}

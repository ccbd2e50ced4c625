//! End-to-end aggregation over an in-memory data platform and the local signer

use smartx_common::db::{init_in_memory, SqliteProfileSource};
use smartx_common::storage::{LocalUrlSigner, StorageResolver};
use smartx_common::video::VideoProvider;
use smartx_common::ProfileAggregator;
use sqlx::SqlitePool;
use std::sync::Arc;
use url::Url;

const SECRET: &str = "test-secret";

async fn setup() -> (SqlitePool, ProfileAggregator) {
    let pool = init_in_memory().await.unwrap();
    let signer = LocalUrlSigner::new("https://media.smartx.test/storage", SECRET).unwrap();
    let resolver = StorageResolver::new(Arc::new(signer), Default::default(), 600);
    let aggregator = ProfileAggregator::new(Arc::new(SqliteProfileSource::new(pool.clone())), resolver);
    (pool, aggregator)
}

async fn exec(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql).execute(pool).await.unwrap();
}

#[tokio::test]
async fn test_full_profile_from_database() {
    let (pool, aggregator) = setup().await;
    exec(
        &pool,
        r#"
        INSERT INTO artists (
            id, slug, member_id, artistic_name, full_name, country_residence, city,
            profile_text2, visao_geral_titulo, carreira_titulo, profile_image,
            video_banner_landscape, audio, image1, image1_text, image4,
            link_to_video, link_to_video3, instagram, website,
            perfil_completo, accepted_terms1, accepted_terms2
        ) VALUES (
            'a-1', 'ana-lua', 'm-1', 'Ana Lua', 'Ana Maria Lua', 'Brasil', 'Recife',
            'Cantora e compositora', '<p>Visão</p>', '<p>Carreira</p>', 'avatars/a-1/me.png',
            'https://cdn.example.com/banner.mp4', 'audio/a-1/demo.mp3', 'photos/a-1/1.jpg', 'Palco', 'photos/a-1/4.jpg',
            'https://vimeo.com/76979871', 'videos/a-1/show.mp4', 'https://instagram.com/analua', 'https://analua.com',
            1, 1, 1
        )
        "#,
    )
    .await;
    exec(
        &pool,
        "INSERT INTO projects (id, member_id, title, image_path, status) VALUES ('p-1', 'm-1', 'Maré', 'projects/p-1/cover.jpg', 'published')",
    )
    .await;
    exec(
        &pool,
        "INSERT INTO projects (id, member_id, title, status) VALUES ('p-2', 'm-1', 'Rascunho', 'draft')",
    )
    .await;
    exec(
        &pool,
        "INSERT INTO events (id, member_id, title, place, event_date, status) VALUES ('e-1', 'm-1', 'Festival', 'Olinda', '2026-12-01', 'published')",
    )
    .await;

    let profile = aggregator.aggregate("ana-lua").await.unwrap();

    assert_eq!(profile.id, "a-1");
    assert_eq!(profile.stage_name, "Ana Lua");
    assert!(profile.profile_complete);
    assert_eq!(profile.cover_url.as_deref(), Some("https://cdn.example.com/banner.mp4"));

    let avatar = Url::parse(profile.avatar_url.as_deref().unwrap()).unwrap();
    assert_eq!(avatar.path(), "/storage/avatars/a-1/me.png");
    let query: std::collections::HashMap<_, _> = avatar.query_pairs().into_owned().collect();
    let expires: i64 = query["expires"].parse().unwrap();
    let signer = LocalUrlSigner::new("https://media.smartx.test/storage", SECRET).unwrap();
    assert!(signer.verify("avatars", "a-1/me.png", expires, &query["token"], unix_now()));

    assert_eq!(profile.photos.len(), 2);
    assert_eq!(profile.photos[0].alt.as_deref(), Some("Palco"));
    assert!(profile.photos[1].url.contains("/storage/photos/a-1/4.jpg"));

    assert_eq!(profile.videos.len(), 2);
    assert_eq!(profile.videos[0].provider, Some(VideoProvider::Vimeo));
    assert_eq!(
        profile.videos[0].embed_url.as_deref(),
        Some("https://player.vimeo.com/video/76979871")
    );
    assert_eq!(profile.videos[1].provider, Some(VideoProvider::File));
    assert!(profile.videos[1].url.contains("/storage/videos/a-1/show.mp4"));

    let sections: Vec<&str> = profile.sections.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(sections, vec!["vision", "career"]);
    let stats: Vec<&str> = profile.stats.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(stats, vec!["País", "Cidade", "Perfil"]);
    let socials: Vec<&str> = profile.socials.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(socials, vec!["Site", "Instagram"]);

    assert_eq!(profile.projects.len(), 1);
    assert_eq!(profile.projects[0].title.as_deref(), Some("Maré"));
    assert!(profile.projects[0].image_url.as_deref().unwrap().contains("/storage/projects/p-1/cover.jpg"));
    assert_eq!(profile.events.len(), 1);
    assert_eq!(profile.events[0].place.as_deref(), Some("Olinda"));
}

#[tokio::test]
async fn test_lookup_by_id_and_member_id() {
    let (pool, aggregator) = setup().await;
    exec(&pool, "INSERT INTO artists (id, member_id, full_name) VALUES ('uuid-9', 'm-9', 'Sem Slug')").await;

    let by_id = aggregator.aggregate("uuid-9").await.unwrap();
    let by_member = aggregator.aggregate("m-9").await.unwrap();

    assert_eq!(by_id, by_member);
    assert_eq!(by_id.stage_name, "Sem Slug");
    assert_eq!(by_id.slug, None);
}

#[tokio::test]
async fn test_missing_artist_is_not_found() {
    let (_pool, aggregator) = setup().await;
    let err = aggregator.aggregate("nobody").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_legacy_path_uses_default_bucket() {
    let (pool, aggregator) = setup().await;
    exec(&pool, "INSERT INTO artists (id, profile_image) VALUES ('a-2', 'legacy/me.png')").await;

    let profile = aggregator.aggregate("a-2").await.unwrap();

    let avatar = Url::parse(profile.avatar_url.as_deref().unwrap()).unwrap();
    assert_eq!(avatar.path(), "/storage/artist-media/legacy/me.png");
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

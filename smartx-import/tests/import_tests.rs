//! CSV import against an in-memory data platform

use smartx_common::db::{init_in_memory, LookupKey, ProfileSource, SqliteProfileSource};
use smartx_common::storage::BucketConfig;
use smartx_import::{ImportError, Importer};
use sqlx::SqlitePool;

async fn setup() -> (SqlitePool, Importer) {
    let pool = init_in_memory().await.unwrap();
    let importer = Importer::new(pool.clone(), BucketConfig::default());
    (pool, importer)
}

async fn artist_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM artists")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_import_maps_columns_by_header() {
    let (pool, importer) = setup().await;
    let csv = "\
city,member_id,artistic_name,full_name,image3,image3_text,link_to_video2,perfil_completo
\"Recife, PE\",m-1,Ana Lua,Ana Maria,photos/m-1/3.jpg,\"Palco, noite\",https://youtu.be/x1,sim
";

    let report = importer.import_str(csv).await.unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.errored, 0);

    let source = SqliteProfileSource::new(pool);
    let record = source
        .find_artist(LookupKey::Slug, "ana-lua")
        .await
        .unwrap()
        .expect("imported artist by slug");

    assert_eq!(record.member_id.as_deref(), Some("m-1"));
    assert_eq!(record.city.as_deref(), Some("Recife, PE"));
    assert_eq!(record.full_name.as_deref(), Some("Ana Maria"));
    assert_eq!(record.photos[2].path.as_deref(), Some("photos/m-1/3.jpg"));
    assert_eq!(record.photos[2].caption.as_deref(), Some("Palco, noite"));
    assert_eq!(record.videos[1].link.as_deref(), Some("https://youtu.be/x1"));
    assert!(record.perfil_completo);
    assert!(!record.accepted_terms1);
    assert_eq!(record.id.len(), 36);
}

#[tokio::test]
async fn test_existing_member_skipped() {
    let (pool, importer) = setup().await;
    let csv = "\
member_id,artistic_name
m-1,Ana Lua
m-2,Bia
m-1,Ana Lua again
";

    let report = importer.import_str(csv).await.unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 1);

    let report = importer.import_str(csv).await.unwrap();
    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(artist_count(&pool).await, 2);
}

#[tokio::test]
async fn test_row_without_member_id_counts_as_error() {
    let (pool, importer) = setup().await;
    let csv = "\
member_id,full_name
,Sem Membro
\"\",Vazio
m-3,Carla
";

    let report = importer.import_str(csv).await.unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.errored, 2);
    assert_eq!(report.summary(), "Imported 1, skipped 0, errors 2.");
    assert_eq!(artist_count(&pool).await, 1);
}

#[tokio::test]
async fn test_missing_columns_fail_before_writing() {
    let (pool, importer) = setup().await;
    let csv = "name,city\nAna,Recife\n";

    let err = importer.import_str(csv).await.unwrap_err();
    assert!(matches!(err, ImportError::MissingColumns(ref cols) if cols.len() == 2));
    assert_eq!(artist_count(&pool).await, 0);
}

#[tokio::test]
async fn test_empty_file() {
    let (_pool, importer) = setup().await;
    let err = importer.import_str("\n  \n").await.unwrap_err();
    assert!(matches!(err, ImportError::EmptyFile));
}

#[tokio::test]
async fn test_banner_normalization_counted() {
    let (pool, importer) = setup().await;
    let csv = "\
member_id,artistic_name,video_banner_landscape,video_banner_portrait
m-1,Ana,/m-1/wide.mp4,videos/m-1/tall.mp4
m-2,Bia,photos/m-2/wide.mp4,m-2/tall.mp4
";

    let report = importer.import_str(csv).await.unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.banners_normalized, 2);
    assert_eq!(report.banners_discarded, 1);
    assert_eq!(
        report.summary(),
        "Imported 2, skipped 0, errors 0. Video banners: 2 normalized, 1 discarded."
    );

    let source = SqliteProfileSource::new(pool);
    let ana = source.find_artist(LookupKey::MemberId, "m-1").await.unwrap().unwrap();
    assert_eq!(ana.video_banner_landscape.as_deref(), Some("videos/m-1/wide.mp4"));
    assert_eq!(ana.video_banner_portrait.as_deref(), Some("videos/m-1/tall.mp4"));

    let bia = source.find_artist(LookupKey::MemberId, "m-2").await.unwrap().unwrap();
    assert_eq!(bia.video_banner_landscape, None);
    assert_eq!(bia.video_banner_portrait.as_deref(), Some("videos/m-2/tall.mp4"));
}

#[tokio::test]
async fn test_duplicate_stage_name_gets_member_suffix() {
    let (pool, importer) = setup().await;
    let csv = "\
member_id,artistic_name
m-1,Ana Lua
M 2,Ana Lua
";

    importer.import_str(csv).await.unwrap();

    let source = SqliteProfileSource::new(pool);
    let second = source.find_artist(LookupKey::MemberId, "M 2").await.unwrap().unwrap();
    assert_eq!(second.slug.as_deref(), Some("ana-lua-m-2"));
}

#[tokio::test]
async fn test_import_file() {
    let (pool, importer) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.csv");
    std::fs::write(&path, "member_id,full_name\r\nm-9,Zé Ninguém\r\n").unwrap();

    let report = importer.import_file(&path).await.unwrap();
    assert_eq!(report.imported, 1);

    let slug: String = sqlx::query_scalar("SELECT slug FROM artists WHERE member_id = 'm-9'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(slug, "ze-ninguem");
}

//! smartx-import - Import artists from a CSV member export

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use smartx_common::config::TomlConfig;
use smartx_common::db::init_database;
use smartx_common::logging::init_tracing;
use smartx_import::Importer;
use tracing::info;

/// Command-line arguments for smartx-import
#[derive(Parser, Debug)]
#[command(name = "smartx-import")]
#[command(about = "Import SMARTx artists from a CSV export")]
#[command(version)]
struct Args {
    /// CSV file with a header row
    file: PathBuf,

    /// SQLite data platform file
    #[arg(short, long, env = "SMARTX_DATABASE")]
    database: Option<PathBuf>,

    /// Config file (overrides SMARTX_CONFIG and the per-user default)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging);

    info!("Starting smartx-import v{}", env!("CARGO_PKG_VERSION"));

    let db_path = args.database.unwrap_or_else(|| config.database_path.clone());
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let importer = Importer::new(pool, config.storage.buckets());
    let report = importer
        .import_file(&args.file)
        .await
        .with_context(|| format!("Import of {} failed", args.file.display()))?;

    println!("{}", report.summary());
    Ok(())
}

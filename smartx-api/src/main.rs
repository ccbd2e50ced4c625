//! smartx-api - Public profile aggregation endpoint
//!
//! Serves `GET /api/public/artist/{slug}` from the SQLite data platform,
//! signing private media references on the way out.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use smartx_common::config::TomlConfig;
use smartx_common::db::{init_database, SqliteProfileSource};
use smartx_common::logging::init_tracing;
use smartx_common::storage::StorageResolver;
use smartx_common::ProfileAggregator;
use smartx_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for smartx-api
#[derive(Parser, Debug)]
#[command(name = "smartx-api")]
#[command(about = "Public artist profile endpoint for SMARTx")]
#[command(version)]
struct Args {
    /// Config file (overrides SMARTX_CONFIG and the per-user default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "SMARTX_API_PORT")]
    port: Option<u16>,

    /// SQLite data platform file
    #[arg(short, long, env = "SMARTX_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging);

    info!(
        "Starting SMARTx public profile API (smartx-api) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_path = args.database.unwrap_or_else(|| config.database_path.clone());
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let resolver = StorageResolver::from_config(&config.storage).context("Failed to build URL signer")?;
    if config.storage.uses_remote_signer() {
        info!("Signing media URLs through the storage service");
    } else {
        info!("Signing media URLs locally under {}", config.storage.public_base_url);
    }

    let aggregator = ProfileAggregator::new(Arc::new(SqliteProfileSource::new(pool)), resolver);
    let app = build_router(AppState::new(aggregator));

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", config.bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("smartx-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

//! smartx-api library - Public profile aggregation endpoint
//!
//! Serves the resolved public profile of an artist to the UI. The
//! aggregation itself lives in `smartx_common::aggregate`; this crate only
//! maps it onto HTTP.

use axum::Router;
use smartx_common::ProfileAggregator;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<ProfileAggregator>,
}

impl AppState {
    pub fn new(aggregator: ProfileAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/api/public/artist/:slug", get(api::get_public_profile))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

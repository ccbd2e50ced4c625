//! Public artist profile endpoint

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tracing::{debug, error};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/public/artist/:slug
///
/// Accepts a slug, artist id or member id. Responses are never cached so
/// dashboard edits show up on the next view.
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<impl IntoResponse> {
    debug!(identifier = %identifier, "Public profile requested");

    let profile = state.aggregator.aggregate(&identifier).await.map_err(|e| {
        if !e.is_not_found() {
            error!(identifier = %identifier, error = %e, "Profile aggregation failed");
        }
        ApiError::from(e)
    })?;

    Ok(([(header::CACHE_CONTROL, "no-store")], Json(profile)))
}

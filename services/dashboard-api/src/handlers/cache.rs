//! Overlay cache management handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, instrument};

use flood_common::DashboardError;

use crate::handlers::common::error_response;
use crate::state::AppState;

/// GET /api/cache/stats - overlay cache counters
#[instrument(skip(state))]
pub async fn cache_stats_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let stats = state.overlays.stats();

    Json(serde_json::json!({
        "overlay_cache": stats,
    }))
}

/// POST /api/cache/invalidate/:id - drop one layer's cached render so the
/// next request re-reads the raster from disk
#[instrument(skip(state))]
pub async fn cache_invalidate_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let layer = match state.config.overlay(&id) {
        Some(layer) => layer,
        None => return error_response(&DashboardError::LayerNotFound(id)),
    };

    let path = layer.resolve_path(&state.config.data_dir);
    let removed = state.overlays.invalidate(&path);
    info!(layer = %id, removed, "Cache invalidation");

    Json(serde_json::json!({
        "layer": id,
        "removed": removed,
    }))
    .into_response()
}

/// POST /api/cache/clear - drop every cached render
#[instrument(skip(state))]
pub async fn cache_clear_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    info!("Clearing overlay cache");

    state.overlays.clear();

    (StatusCode::OK, "Overlay cache cleared")
}

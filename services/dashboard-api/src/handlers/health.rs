//! Health check handler.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub incidents: usize,
    pub stations: usize,
}

/// GET /health - liveness plus a small catalog snapshot
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "dashboard-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        incidents: state.catalog.incidents().len(),
        stations: state.catalog.stations().len(),
    })
}

//! Vector layer handlers: the river channel and the styled half-basins.

use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use flood_common::DashboardError;
use flood_data::config::DEFAULT_BASIN_OPACITY;
use flood_data::vectors;

use crate::handlers::common::error_response;
use crate::state::AppState;

/// GET /api/vectors/river - the channel GeoJSON, served verbatim
pub async fn river_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match vectors::load_vector_layer(&state.config.river_channel_path()) {
        Ok(doc) => Json(doc).into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct BasinQueryParams {
    /// Fill opacity applied to every styled feature, in [0, 1].
    pub opacity: Option<String>,
}

/// GET /api/vectors/basins - half-basin GeoJSON with the requested fill
/// opacity written into each feature's embedded style
pub async fn basins_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<BasinQueryParams>,
) -> Response {
    let opacity = match parse_opacity(params.opacity.as_deref()) {
        Ok(value) => value,
        Err(e) => return error_response(&e),
    };
    match vectors::load_vector_layer(&state.config.basin_stats_path()) {
        Ok(mut doc) => {
            vectors::apply_basin_opacity(&mut doc, opacity);
            Json(doc).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/basins/stats - discharge statistics per half-basin
pub async fn basin_stats_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match vectors::load_vector_layer(&state.config.basin_stats_path()) {
        Ok(doc) => Json(vectors::extract_basin_stats(&doc)).into_response(),
        Err(e) => error_response(&e),
    }
}

fn parse_opacity(raw: Option<&str>) -> Result<f64, DashboardError> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(DEFAULT_BASIN_OPACITY),
    };
    let invalid = || DashboardError::InvalidParameter {
        param: "opacity".to_string(),
        message: format!("'{}' is not an opacity in [0, 1]", raw),
    };
    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid());
    }
    Ok(value)
}

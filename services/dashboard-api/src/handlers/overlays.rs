//! Raster overlay handlers: the layer registry, per-layer metadata and
//! rendered PNG images.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use flood_common::{DashboardError, LatLonBounds};
use flood_data::legends::ClimatePhase;
use flood_data::{DashboardConfig, OverlayLayerConfig};

use crate::handlers::common::{error_response, png_response};
use crate::state::AppState;

/// GET /api/overlays - the configured overlay registry, in display order
pub async fn list_overlays_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<OverlayLayerConfig>> {
    Json(state.config.overlays.clone())
}

/// Metadata for one rendered overlay.
#[derive(Debug, Serialize)]
pub struct OverlayMetadata {
    pub id: String,
    pub title: String,
    pub group: String,
    pub default_opacity: f64,
    pub lulc_date: Option<NaiveDate>,
    pub width: u32,
    pub height: u32,
    pub bounds: LatLonBounds,
    pub png_bytes: usize,
}

/// GET /api/overlays/:id - layer metadata with pixel size and geographic
/// bounds; renders and caches the raster on first access
pub async fn overlay_metadata_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let layer = match lookup_layer(&state.config, &id) {
        Ok(layer) => layer,
        Err(e) => return error_response(&e),
    };
    let path = layer.resolve_path(&state.config.data_dir);
    match state.overlays.get_or_render(&path) {
        Ok(cached) => Json(OverlayMetadata {
            id: layer.id,
            title: layer.title,
            group: layer.group,
            default_opacity: layer.default_opacity,
            lulc_date: layer.lulc_date,
            width: cached.overlay.width,
            height: cached.overlay.height,
            bounds: cached.overlay.bounds,
            png_bytes: cached.png.len(),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/overlays/:id/image - the rendered overlay as PNG
pub async fn overlay_image_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let layer = match lookup_layer(&state.config, &id) {
        Ok(layer) => layer,
        Err(e) => return error_response(&e),
    };
    let path = layer.resolve_path(&state.config.data_dir);
    match state.overlays.get_or_render(&path) {
        Ok(cached) => png_response(cached.png),
        Err(e) => error_response(&e),
    }
}

/// One selectable land-use year.
#[derive(Debug, Serialize)]
pub struct LulcYear {
    pub year: i32,
    pub date: NaiveDate,
    pub layer_id: String,
    pub phase: ClimatePhase,
}

/// GET /api/lulc-years - the land-use year selector, with the climate
/// phase each acquisition date falls in
pub async fn lulc_years_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<LulcYear>> {
    let years = state
        .config
        .lulc_layers()
        .filter_map(|layer| {
            layer.lulc_date.map(|date| LulcYear {
                year: date.year(),
                date,
                layer_id: layer.id.clone(),
                phase: ClimatePhase::for_lulc_date(date),
            })
        })
        .collect();
    Json(years)
}

fn lookup_layer(config: &DashboardConfig, id: &str) -> Result<OverlayLayerConfig, DashboardError> {
    config
        .overlay(id)
        .cloned()
        .ok_or_else(|| DashboardError::LayerNotFound(id.to_string()))
}

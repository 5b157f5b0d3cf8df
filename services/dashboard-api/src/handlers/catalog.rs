//! Catalog handlers: summary counts, flood dates, the incident map view
//! and per-station rainfall series.

use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use flood_common::DashboardError;
use flood_data::catalog::{CatalogSummary, StationSeries};
use flood_data::MapSelection;

use crate::handlers::common::error_response;
use crate::state::AppState;

/// The station selector's "no selection" option, accepted for parity with
/// frontends that send the visible option value.
const ALL_STATIONS: &str = "All Stations";

/// GET /api/summary - catalog counts and overall date range
pub async fn summary_handler(Extension(state): Extension<Arc<AppState>>) -> Json<CatalogSummary> {
    Json(state.catalog.summary())
}

/// GET /api/flood-dates - distinct incident dates, ascending
pub async fn flood_dates_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let range = state.catalog.date_range();
    Json(serde_json::json!({
        "dates": state.catalog.flood_dates(),
        "first": range.map(|(first, _)| first),
        "last": range.map(|(_, last)| last),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MapQueryParams {
    /// Flood date to plot (YYYY-MM-DD); absent plots every incident.
    pub date: Option<String>,
    /// Station to highlight; overrides the date filter.
    pub station: Option<String>,
    /// Plot every incident regardless of the selected date.
    pub all: Option<String>,
}

/// GET /api/map - station markers and incidents for the selection
pub async fn map_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<MapQueryParams>,
) -> Response {
    let selection = match parse_map_selection(&params) {
        Ok(selection) => selection,
        Err(e) => return error_response(&e),
    };
    Json(state.catalog.map_view(&selection)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RainfallQueryParams {
    /// Restrict the series to one station.
    pub station: Option<String>,
}

/// GET /api/rainfall - rainfall series grouped by station
pub async fn rainfall_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<RainfallQueryParams>,
) -> Json<Vec<StationSeries>> {
    let station = params
        .station
        .as_deref()
        .filter(|s| !s.trim().is_empty() && *s != ALL_STATIONS);
    Json(state.catalog.rainfall_series(station))
}

fn parse_map_selection(params: &MapQueryParams) -> Result<MapSelection, DashboardError> {
    let date = match params.date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_query_date(raw)?),
        _ => None,
    };
    let station = params
        .station
        .as_deref()
        .filter(|s| !s.trim().is_empty() && *s != ALL_STATIONS)
        .map(str::to_string);
    let show_all = match params.all.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_bool_param("all", raw)?,
        _ => false,
    };
    Ok(MapSelection {
        date,
        station,
        show_all,
    })
}

fn parse_query_date(raw: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        DashboardError::InvalidParameter {
            param: "date".to_string(),
            message: format!("'{}' is not a YYYY-MM-DD date", raw),
        }
    })
}

fn parse_bool_param(param: &str, raw: &str) -> Result<bool, DashboardError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(DashboardError::InvalidParameter {
            param: param.to_string(),
            message: format!("'{}' is not a boolean", raw),
        }),
    }
}

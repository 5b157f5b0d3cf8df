//! Legend table handlers.
//!
//! All legend content is static; only the land-use legend varies, picking
//! the Normal or El Niño class table from the requested acquisition date.

use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use flood_common::DashboardError;
use flood_data::legends::{self, ClimatePhase};

use crate::handlers::common::error_response;

#[derive(Debug, Deserialize)]
pub struct LegendQueryParams {
    /// Acquisition date (YYYY-MM-DD) selecting the land-use climate phase.
    pub date: Option<String>,
}

/// GET /api/legends/:kind - legend table for slope, lulc, rainfall, q or rpi
pub async fn legend_handler(
    Path(kind): Path<String>,
    Query(params): Query<LegendQueryParams>,
) -> Response {
    match kind.as_str() {
        "slope" => Json(serde_json::json!({
            "classes": legends::slope_classes(),
        }))
        .into_response(),
        "lulc" => lulc_legend(params.date.as_deref()),
        "rainfall" => Json(serde_json::json!({
            "gradient": legends::rainfall_gradient(),
        }))
        .into_response(),
        "q" => Json(serde_json::json!({
            "classes": legends::discharge_classes(),
        }))
        .into_response(),
        "rpi" => Json(serde_json::json!({
            "classes": legends::rpi_classes(),
            "source": legends::RPI_SOURCE,
        }))
        .into_response(),
        _ => error_response(&DashboardError::LayerNotFound(format!("legend '{}'", kind))),
    }
}

fn lulc_legend(raw_date: Option<&str>) -> Response {
    let phase = match raw_date {
        Some(raw) if !raw.trim().is_empty() => {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => ClimatePhase::for_lulc_date(date),
                Err(_) => {
                    return error_response(&DashboardError::InvalidParameter {
                        param: "date".to_string(),
                        message: format!("'{}' is not a YYYY-MM-DD date", raw),
                    })
                }
            }
        }
        _ => ClimatePhase::Normal,
    };
    Json(serde_json::json!({
        "phase": phase.label(),
        "classes": legends::lulc_classes(phase),
    }))
    .into_response()
}

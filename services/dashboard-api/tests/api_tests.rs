//! Handler-level tests for the dashboard API.
//!
//! Each test builds real application state from fixture tables in a temp
//! directory and calls the handlers directly with the extractors the
//! router would pass them.

use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Extension, Path, Query};
use axum::http::{header, StatusCode};
use axum::response::Response;
use tempfile::TempDir;

use dashboard_api::handlers::catalog::{self, MapQueryParams, RainfallQueryParams};
use dashboard_api::handlers::vectors::{self, BasinQueryParams};
use dashboard_api::handlers::{cache, health, overlays};
use dashboard_api::server::build_router;
use dashboard_api::state::AppState;
use flood_data::DashboardConfig;
use test_utils::{create_index_grid, write_sample_tables, TiffBuilder};

/// State over the sample tables plus a 4x3 grayscale slope raster.
fn sample_state() -> (TempDir, Arc<AppState>) {
    let dir = tempfile::tempdir().unwrap();
    write_sample_tables(dir.path()).unwrap();

    let slope = TiffBuilder::new(4, 3)
        .samples(create_index_grid(4, 3))
        .build();
    std::fs::write(dir.path().join("slope_map.tif"), slope).unwrap();

    let config = DashboardConfig {
        data_dir: dir.path().to_path_buf(),
        ..DashboardConfig::default()
    };
    let state = AppState::with_config(config).unwrap();
    (dir, Arc::new(state))
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn map_params(date: Option<&str>, station: Option<&str>, all: Option<&str>) -> MapQueryParams {
    MapQueryParams {
        date: date.map(str::to_string),
        station: station.map(str::to_string),
        all: all.map(str::to_string),
    }
}

#[tokio::test]
async fn test_router_builds() {
    let (_dir, state) = sample_state();
    let _router = build_router(state);
}

#[tokio::test]
async fn test_health_reports_catalog_counts() {
    let (_dir, state) = sample_state();
    let response = health::health_handler(Extension(state)).await;
    assert_eq!(response.0.status, "ok");
    assert_eq!(response.0.service, "dashboard-api");
    assert_eq!(response.0.incidents, 3);
    assert_eq!(response.0.stations, 3);
}

#[tokio::test]
async fn test_summary_counts_and_range() {
    let (_dir, state) = sample_state();
    let summary = catalog::summary_handler(Extension(state)).await.0;
    assert_eq!(summary.incident_count, 3);
    assert_eq!(summary.station_count, 3);
    assert_eq!(
        summary.first_flood_date.map(|d| d.to_string()),
        Some("2024-01-15".to_string())
    );
    assert_eq!(
        summary.last_flood_date.map(|d| d.to_string()),
        Some("2024-02-02".to_string())
    );
}

#[tokio::test]
async fn test_flood_dates_ascending() {
    let (_dir, state) = sample_state();
    let json = catalog::flood_dates_handler(Extension(state)).await.0;
    assert_eq!(json["dates"], serde_json::json!(["2024-01-15", "2024-02-02"]));
    assert_eq!(json["first"], "2024-01-15");
    assert_eq!(json["last"], "2024-02-02");
}

#[tokio::test]
async fn test_map_date_filter_and_hover() {
    let (_dir, state) = sample_state();
    let response = catalog::map_handler(
        Extension(state),
        Query(map_params(Some("2024-02-02"), None, None)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let view = body_json(response).await;
    let incidents = view["incidents"].as_array().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0]["area_name"], "Rowosari");
    assert_eq!(
        incidents[0]["hover_text"].as_str().unwrap(),
        "2024-02-02 | Rowosari | Nearest Station: Gunungpati"
    );
    // every station is always on the map
    assert_eq!(view["stations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_map_station_selection_marks_marker() {
    let (_dir, state) = sample_state();
    let response = catalog::map_handler(
        Extension(state),
        Query(map_params(Some("2024-02-02"), Some("Gunungpati"), Some("true"))),
    )
    .await;
    let view = body_json(response).await;

    // a selected station overrides "all", so the date filter still applies
    assert_eq!(view["incidents"].as_array().unwrap().len(), 1);

    let stations = view["stations"].as_array().unwrap();
    for station in stations {
        let selected = station["selected"].as_bool().unwrap();
        assert_eq!(selected, station["name"] == "Gunungpati");
    }
}

#[tokio::test]
async fn test_map_show_all_ignores_date() {
    let (_dir, state) = sample_state();
    let response = catalog::map_handler(
        Extension(state),
        Query(map_params(Some("2024-02-02"), None, Some("true"))),
    )
    .await;
    let view = body_json(response).await;
    assert_eq!(view["incidents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_map_bad_date_is_400() {
    let (_dir, state) = sample_state();
    let response = catalog::map_handler(
        Extension(state),
        Query(map_params(Some("02/02/2024"), None, None)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let err = body_json(response).await;
    assert_eq!(err["error"], "InvalidParameter");
    assert!(err["message"].as_str().unwrap().contains("02/02/2024"));
}

#[tokio::test]
async fn test_rainfall_series_for_one_station() {
    let (_dir, state) = sample_state();
    let series = catalog::rainfall_handler(
        Extension(state),
        Query(RainfallQueryParams {
            station: Some("Gunungpati".to_string()),
        }),
    )
    .await
    .0;
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].station, "Gunungpati");
    assert_eq!(series[0].points.len(), 2);
    assert_eq!(series[0].points[0].rainfall_mm, 12.5);
}

#[tokio::test]
async fn test_rainfall_series_all_stations() {
    let (_dir, state) = sample_state();
    let series = catalog::rainfall_handler(
        Extension(state),
        Query(RainfallQueryParams { station: None }),
    )
    .await
    .0;
    // Plamongan only has an empty rainfall cell, so no series for it
    let names: Vec<&str> = series.iter().map(|s| s.station.as_str()).collect();
    assert_eq!(names, ["Gunungpati", "Simongan"]);
}

#[tokio::test]
async fn test_overlay_registry_listing() {
    let (_dir, state) = sample_state();
    let layers = overlays::list_overlays_handler(Extension(state)).await.0;
    assert_eq!(layers.len(), 9);
    assert_eq!(layers[0].id, "slope");
    assert!(layers.iter().any(|l| l.id == "lulc-2023"));
}

#[tokio::test]
async fn test_overlay_metadata_reports_bounds() {
    let (_dir, state) = sample_state();
    let response =
        overlays::overlay_metadata_handler(Extension(state), Path("slope".to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let meta = body_json(response).await;
    assert_eq!(meta["width"], 4);
    assert_eq!(meta["height"], 3);
    assert_eq!(meta["default_opacity"], 0.6);
    // 0.001 degree pixels from the builder's default origin
    let bounds = &meta["bounds"];
    assert!((bounds["west"].as_f64().unwrap() - 110.3).abs() < 1e-9);
    assert!((bounds["north"].as_f64().unwrap() + 6.9).abs() < 1e-9);
    assert!((bounds["east"].as_f64().unwrap() - 110.304).abs() < 1e-9);
    assert!((bounds["south"].as_f64().unwrap() + 6.903).abs() < 1e-9);
    assert!(meta["png_bytes"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_overlay_image_is_png() {
    let (_dir, state) = sample_state();
    let response =
        overlays::overlay_image_handler(Extension(state), Path("slope".to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_overlay_unknown_id_is_404() {
    let (_dir, state) = sample_state();
    let response =
        overlays::overlay_image_handler(Extension(state), Path("dem".to_string())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let err = body_json(response).await;
    assert_eq!(err["error"], "LayerNotFound");
}

#[tokio::test]
async fn test_overlay_missing_raster_is_404() {
    let (_dir, state) = sample_state();
    // "q" is configured but Q_map.tif was never written
    let response = overlays::overlay_metadata_handler(Extension(state), Path("q".to_string())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let err = body_json(response).await;
    assert_eq!(err["error"], "MissingFile");
}

#[tokio::test]
async fn test_lulc_years_phases() {
    let (_dir, state) = sample_state();
    let years = overlays::lulc_years_handler(Extension(state)).await.0;
    assert_eq!(years.len(), 5);
    assert_eq!(years[0].year, 2020);

    let json = serde_json::to_value(&years).unwrap();
    let by_year = |y: i64| {
        json.as_array()
            .unwrap()
            .iter()
            .find(|e| e["year"] == y)
            .unwrap()
            .clone()
    };
    assert_eq!(by_year(2023)["phase"], "El Niño");
    assert_eq!(by_year(2020)["phase"], "Normal");
    assert_eq!(by_year(2023)["layer_id"], "lulc-2023");
}

#[tokio::test]
async fn test_river_layer_passthrough() {
    let (_dir, state) = sample_state();
    let response = vectors::river_handler(Extension(state)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert_eq!(doc["type"], "FeatureCollection");
    assert_eq!(doc["features"][0]["properties"]["name"], "Kali Babon");
}

#[tokio::test]
async fn test_basins_opacity_applied() {
    let (_dir, state) = sample_state();
    let response = vectors::basins_handler(
        Extension(state),
        Query(BasinQueryParams {
            opacity: Some("0.25".to_string()),
        }),
    )
    .await;
    let doc = body_json(response).await;
    for feature in doc["features"].as_array().unwrap() {
        assert_eq!(
            feature["properties"]["style"]["fillOpacity"].as_f64().unwrap(),
            0.25
        );
    }
}

#[tokio::test]
async fn test_basins_default_opacity() {
    let (_dir, state) = sample_state();
    let response =
        vectors::basins_handler(Extension(state), Query(BasinQueryParams { opacity: None })).await;
    let doc = body_json(response).await;
    assert_eq!(
        doc["features"][0]["properties"]["style"]["fillOpacity"]
            .as_f64()
            .unwrap(),
        0.7
    );
}

#[tokio::test]
async fn test_basins_bad_opacity_is_400() {
    let (_dir, state) = sample_state();
    let response = vectors::basins_handler(
        Extension(state),
        Query(BasinQueryParams {
            opacity: Some("1.5".to_string()),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_basin_stats_extraction() {
    let (_dir, state) = sample_state();
    let response = vectors::basin_stats_handler(Extension(state)).await;
    let stats = body_json(response).await;
    let stats = stats.as_array().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["name"], "Basin A");
    assert_eq!(stats[0]["mean_Q"].as_f64().unwrap(), 12.4);
    assert_eq!(stats[1]["name"], "Basin B");
}

#[tokio::test]
async fn test_cache_stats_and_invalidation_flow() {
    let (_dir, state) = sample_state();

    let stats = cache::cache_stats_handler(Extension(state.clone())).await.0;
    assert_eq!(stats["overlay_cache"]["entries"], 0);

    // first render misses, second hits
    overlays::overlay_image_handler(Extension(state.clone()), Path("slope".to_string())).await;
    overlays::overlay_image_handler(Extension(state.clone()), Path("slope".to_string())).await;

    let stats = cache::cache_stats_handler(Extension(state.clone())).await.0;
    assert_eq!(stats["overlay_cache"]["entries"], 1);
    assert_eq!(stats["overlay_cache"]["misses"], 1);
    assert_eq!(stats["overlay_cache"]["hits"], 1);

    let response =
        cache::cache_invalidate_handler(Extension(state.clone()), Path("slope".to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["removed"], true);

    let stats = cache::cache_stats_handler(Extension(state)).await.0;
    assert_eq!(stats["overlay_cache"]["entries"], 0);
}

#[tokio::test]
async fn test_cache_invalidate_unknown_layer_is_404() {
    let (_dir, state) = sample_state();
    let response =
        cache::cache_invalidate_handler(Extension(state), Path("dem".to_string())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

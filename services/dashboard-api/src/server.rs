//! HTTP server assembly for the dashboard API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::handlers;
use crate::state::AppState;

/// Build the router with all dashboard routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_handler))
        // Catalog endpoints
        .route("/api/summary", get(handlers::catalog::summary_handler))
        .route("/api/flood-dates", get(handlers::catalog::flood_dates_handler))
        .route("/api/map", get(handlers::catalog::map_handler))
        .route("/api/rainfall", get(handlers::catalog::rainfall_handler))
        // Raster overlay endpoints
        .route("/api/overlays", get(handlers::overlays::list_overlays_handler))
        .route("/api/overlays/:id", get(handlers::overlays::overlay_metadata_handler))
        .route(
            "/api/overlays/:id/image",
            get(handlers::overlays::overlay_image_handler),
        )
        .route("/api/lulc-years", get(handlers::overlays::lulc_years_handler))
        // Vector layer endpoints
        .route("/api/vectors/river", get(handlers::vectors::river_handler))
        .route("/api/vectors/basins", get(handlers::vectors::basins_handler))
        .route("/api/basins/stats", get(handlers::vectors::basin_stats_handler))
        // Legend tables
        .route("/api/legends/:kind", get(handlers::legends::legend_handler))
        // Cache management
        .route("/api/cache/stats", get(handlers::cache::cache_stats_handler))
        .route(
            "/api/cache/invalidate/:id",
            post(handlers::cache::cache_invalidate_handler),
        )
        .route("/api/cache/clear", post(handlers::cache::cache_clear_handler))
        // Layer extensions
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

/// Bind the listen address and serve until shutdown.
pub async fn start_server(state: Arc<AppState>, listen: &str) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr: SocketAddr = listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

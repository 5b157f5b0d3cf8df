//! Application state for the dashboard API.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use flood_data::{DashboardConfig, DataCatalog};
use overlay_renderer::OverlayCache;

/// Shared application state.
pub struct AppState {
    /// Layer manifest and input file locations.
    pub config: DashboardConfig,
    /// Incident and station data, precomputed at startup.
    pub catalog: DataCatalog,
    /// Rendered raster overlays, keyed by source path.
    pub overlays: OverlayCache,
}

impl AppState {
    /// Create the state from a config file path.
    ///
    /// The CSV tables named by the config must load or this fails; raster
    /// and vector layers are only opened on first request.
    pub fn new(config_path: &Path) -> Result<Self> {
        let config = DashboardConfig::load_or_default(config_path);
        Self::with_config(config)
    }

    /// Create the state over an already-built config.
    pub fn with_config(config: DashboardConfig) -> Result<Self> {
        let catalog = DataCatalog::load(&config)?;
        info!(
            incidents = catalog.incidents().len(),
            stations = catalog.stations().len(),
            overlays = config.overlays.len(),
            "Application state ready"
        );
        Ok(Self {
            config,
            catalog,
            overlays: OverlayCache::new(),
        })
    }
}

//! Dashboard data manifest.
//!
//! A single YAML file names the input tables, the vector layers, and the
//! pre-computed raster overlays the dashboard serves. Every field has a
//! built-in default mirroring the analysis team's `data/` directory, so a
//! deployment without a config file still comes up against the standard
//! layout.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Default opacity for the half-basin vector layer (the slider's initial
/// position in the reference dashboard).
pub const DEFAULT_BASIN_OPACITY: f64 = 0.7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// One raster overlay the dashboard can render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayLayerConfig {
    /// Stable identifier used in request paths (e.g. "slope", "lulc-2023").
    pub id: String,
    /// Human-readable layer name, shown in the frontend's layer control.
    pub title: String,
    /// Layer group: "terrain", "lulc" or "runoff".
    pub group: String,
    /// File name of the GeoTIFF, relative to `data_dir`.
    pub file: String,
    /// Opacity the frontend should apply by default.
    pub default_opacity: f64,
    /// Acquisition date for land-use/land-cover products; `None` for the
    /// terrain and runoff layers.
    #[serde(default)]
    pub lulc_date: Option<NaiveDate>,
}

impl OverlayLayerConfig {
    fn new(id: &str, title: &str, group: &str, file: &str, default_opacity: f64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            group: group.to_string(),
            file: file.to_string(),
            default_opacity,
            lulc_date: None,
        }
    }

    fn lulc(id: &str, file: &str, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            title: format!("LULC {}", date.format("%Y-%m-%d")),
            group: "lulc".to_string(),
            file: file.to_string(),
            default_opacity: 0.6,
            lulc_date: Some(date),
        }
    }

    /// Absolute path of the raster file under the configured data dir.
    pub fn resolve_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.file)
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory all file names below are resolved against.
    pub data_dir: PathBuf,
    /// Flood incident table (CSV).
    pub flood_table: String,
    /// Rainfall observation table (CSV).
    pub rainfall_table: String,
    /// River channel vector layer (GeoJSON), served verbatim.
    pub river_channel: String,
    /// Styled half-basin vector layer (GeoJSON) with discharge statistics.
    pub basin_stats: String,
    /// Raster overlays, in display order.
    pub overlays: Vec<OverlayLayerConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        // Unwraps are on literal dates and cannot fail.
        let lulc_dates = [
            ("lulc-2020", "lulc_2020_styled.tif", (2020, 9, 15)),
            ("lulc-2021", "lulc_2021_styled.tif", (2021, 9, 30)),
            ("lulc-2022", "lulc_2022_styled.tif", (2022, 9, 15)),
            ("lulc-2023", "lulc_2023_styled.tif", (2023, 9, 20)),
            ("lulc-2025", "lulc_2025_styled.tif", (2025, 8, 15)),
        ];

        let mut overlays = vec![OverlayLayerConfig::new(
            "slope",
            "Slope Map",
            "terrain",
            "slope_map.tif",
            0.6,
        )];
        for (id, file, (y, m, d)) in lulc_dates {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            overlays.push(OverlayLayerConfig::lulc(id, file, date));
        }
        overlays.push(OverlayLayerConfig::new(
            "rpi",
            "RPI (Rendered)",
            "runoff",
            "RPI_2025.tif",
            1.0,
        ));
        overlays.push(OverlayLayerConfig::new(
            "rainfall",
            "Rainfall (Interpolated)",
            "runoff",
            "rainfall_babon.tif",
            0.95,
        ));
        overlays.push(OverlayLayerConfig::new(
            "q",
            "Q (Runoff)",
            "runoff",
            "Q_map.tif",
            0.95,
        ));

        Self {
            data_dir: PathBuf::from("data"),
            flood_table: "flood_jateng.csv".to_string(),
            rainfall_table: "rainfall_jateng2.csv".to_string(),
            river_channel: "babon_channel.geojson".to_string(),
            basin_stats: "Runoff_statistic_styled.geojson".to_string(),
            overlays,
        }
    }
}

impl DashboardConfig {
    /// Load the manifest from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    /// Load the manifest, falling back to built-in defaults when the file
    /// is absent or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!(path = ?path, overlays = config.overlays.len(), "Loaded dashboard config");
                config
            }
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!(path = ?path, "No config file, using built-in defaults");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "Config unusable, using built-in defaults");
                Self::default()
            }
        }
    }

    pub fn flood_table_path(&self) -> PathBuf {
        self.data_dir.join(&self.flood_table)
    }

    pub fn rainfall_table_path(&self) -> PathBuf {
        self.data_dir.join(&self.rainfall_table)
    }

    pub fn river_channel_path(&self) -> PathBuf {
        self.data_dir.join(&self.river_channel)
    }

    pub fn basin_stats_path(&self) -> PathBuf {
        self.data_dir.join(&self.basin_stats)
    }

    /// Find an overlay layer by its identifier.
    pub fn overlay(&self, id: &str) -> Option<&OverlayLayerConfig> {
        self.overlays.iter().find(|l| l.id == id)
    }

    /// LULC layers in configured order.
    pub fn lulc_layers(&self) -> impl Iterator<Item = &OverlayLayerConfig> {
        self.overlays.iter().filter(|l| l.lulc_date.is_some())
    }

    /// The LULC layer whose acquisition date falls in `year`, mirroring the
    /// reference dashboard's year selector.
    pub fn lulc_for_year(&self, year: i32) -> Option<&OverlayLayerConfig> {
        use chrono::Datelike;
        self.lulc_layers()
            .find(|l| l.lulc_date.map(|d| d.year()) == Some(year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let config = DashboardConfig::default();
        assert_eq!(config.overlays.len(), 9);
        assert_eq!(config.overlay("slope").unwrap().file, "slope_map.tif");
        assert_eq!(config.overlay("q").unwrap().default_opacity, 0.95);
        assert_eq!(config.overlay("rpi").unwrap().default_opacity, 1.0);
        assert!(config.overlay("dem").is_none());
        assert_eq!(config.lulc_layers().count(), 5);
    }

    #[test]
    fn test_lulc_year_lookup() {
        let config = DashboardConfig::default();
        let layer = config.lulc_for_year(2023).unwrap();
        assert_eq!(layer.id, "lulc-2023");
        assert_eq!(
            layer.lulc_date,
            Some(NaiveDate::from_ymd_opt(2023, 9, 20).unwrap())
        );
        assert!(config.lulc_for_year(2024).is_none());
    }

    #[test]
    fn test_resolve_paths() {
        let config = DashboardConfig::default();
        assert_eq!(
            config.flood_table_path(),
            PathBuf::from("data/flood_jateng.csv")
        );
        let slope = config.overlay("slope").unwrap();
        assert_eq!(
            slope.resolve_path(&config.data_dir),
            PathBuf::from("data/slope_map.tif")
        );
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "data_dir: /srv/flood\nflood_table: incidents.csv\n";
        let config: DashboardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/flood"));
        assert_eq!(config.flood_table, "incidents.csv");
        // untouched fields keep their defaults
        assert_eq!(config.rainfall_table, "rainfall_jateng2.csv");
        assert_eq!(config.overlays.len(), 9);
    }

    #[test]
    fn test_overlay_yaml_overrides_registry() {
        let yaml = r#"
overlays:
  - id: slope
    title: Slope
    group: terrain
    file: slope_v2.tif
    default_opacity: 0.5
"#;
        let config: DashboardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.overlays.len(), 1);
        assert_eq!(config.overlay("slope").unwrap().file, "slope_v2.tif");
        assert!(config.overlay("slope").unwrap().lulc_date.is_none());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = DashboardConfig::load_or_default(Path::new("/nonexistent/dashboard.yaml"));
        assert_eq!(config.overlays.len(), 9);
    }
}

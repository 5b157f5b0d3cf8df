//! Data layer for the flood-monitor dashboard.
//!
//! This crate owns everything between the on-disk inputs and the HTTP
//! response models: CSV table loading with row-level validation, the
//! rain-station set and nearest-station matcher, GeoJSON vector layers,
//! the static legend tables, the YAML layer manifest, and the
//! [`catalog::DataCatalog`] that precomputes the per-incident view data
//! once at startup.

pub mod catalog;
pub mod config;
pub mod legends;
pub mod stations;
pub mod tables;
pub mod vectors;

pub use catalog::{DataCatalog, MapSelection, MapView};
pub use config::{ConfigError, DashboardConfig, OverlayLayerConfig};
pub use stations::{dedup_stations, nearest_station};
pub use tables::{load_flood_incidents, load_rainfall_observations, TableLoad};

//! Common types and utilities shared across all flood-monitor services.

pub mod error;
pub mod geo;
pub mod geodesy;
pub mod records;
pub mod time;

pub use error::{DashboardError, DashboardResult};
pub use geo::{GeoPoint, LatLonBounds};
pub use geodesy::{geodesic_distance_m, haversine_distance_m, vincenty_distance_m};
pub use records::{FloodIncident, NearestStation, RainStation, RainfallObservation};
pub use time::parse_table_date;

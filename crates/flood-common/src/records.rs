//! Record types for the flood incident and rainfall tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A single flood incident row from the incident table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodIncident {
    pub date: NaiveDate,
    pub location: GeoPoint,
    pub area_name: String,
}

/// A single rainfall observation row from the rainfall table.
///
/// `rainfall_mm` is optional: a row with an unreadable rainfall value still
/// contributes its station coordinates to the station set, it is only
/// excluded from chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallObservation {
    pub date: NaiveDate,
    pub location: GeoPoint,
    pub station_name: String,
    pub rainfall_mm: Option<f64>,
}

/// A rain gauge station, deduplicated from rainfall observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainStation {
    pub location: GeoPoint,
    pub name: String,
}

/// The station nearest to a flood incident, with the geodesic distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestStation {
    pub name: String,
    pub location: GeoPoint,
    pub distance_m: f64,
}

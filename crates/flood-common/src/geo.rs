//! Geographic point and bounds types.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both coordinates are finite numbers.
    ///
    /// Table loaders use this to reject rows whose coordinate cells parsed
    /// to NaN or infinity.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A geographic rectangle in degrees, used to anchor raster overlays.
///
/// Named edges instead of min/max corners because overlay clients consume
/// the bounds as (south, west) / (north, east) corner pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLonBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Width of the bounds in degrees of longitude.
    pub fn width_deg(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the bounds in degrees of latitude.
    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }

    /// Geometric center of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Check if a point is contained within these bounds.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_finiteness() {
        assert!(GeoPoint::new(-7.0, 110.4).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 110.4).is_finite());
        assert!(!GeoPoint::new(-7.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_bounds_dimensions() {
        let bounds = LatLonBounds::new(-7.2, 110.3, -6.9, 110.5);
        assert!((bounds.width_deg() - 0.2).abs() < 1e-12);
        assert!((bounds.height_deg() - 0.3).abs() < 1e-12);

        let center = bounds.center();
        assert!((center.lat - -7.05).abs() < 1e-12);
        assert!((center.lon - 110.4).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = LatLonBounds::new(-7.2, 110.3, -6.9, 110.5);
        assert!(bounds.contains(&GeoPoint::new(-7.0, 110.4)));
        assert!(bounds.contains(&GeoPoint::new(-7.2, 110.3)));
        assert!(!bounds.contains(&GeoPoint::new(-7.3, 110.4)));
        assert!(!bounds.contains(&GeoPoint::new(-7.0, 110.6)));
    }
}

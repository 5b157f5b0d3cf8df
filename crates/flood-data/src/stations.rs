//! Rain-station set and nearest-station matching.

use std::collections::HashSet;

use flood_common::{
    geodesic_distance_m, DashboardError, DashboardResult, GeoPoint, NearestStation, RainStation,
    RainfallObservation,
};

/// Collapse rainfall observations into the unique station set.
///
/// Stations are identified by the exact (lat, lon, name) triple and kept in
/// first-seen order. Order matters: the matcher breaks distance ties in
/// favor of the earlier station, so reordering here would change results.
pub fn dedup_stations(observations: &[RainfallObservation]) -> Vec<RainStation> {
    let mut seen: HashSet<(u64, u64, &str)> = HashSet::new();
    let mut stations = Vec::new();
    for obs in observations {
        let key = (
            obs.location.lat.to_bits(),
            obs.location.lon.to_bits(),
            obs.station_name.as_str(),
        );
        if seen.insert(key) {
            stations.push(RainStation {
                location: obs.location,
                name: obs.station_name.clone(),
            });
        }
    }
    stations
}

/// Find the station closest to `query` by ellipsoidal distance.
///
/// Plain linear scan with a running minimum. The strict `<` comparison
/// keeps the first-encountered station when two candidates are exactly
/// equidistant. Coordinates are assumed valid; the table loaders have
/// already dropped rows that are not.
pub fn nearest_station(
    query: GeoPoint,
    candidates: &[RainStation],
) -> DashboardResult<NearestStation> {
    let mut best: Option<NearestStation> = None;
    for station in candidates {
        let distance_m = geodesic_distance_m(query, station.location);
        let closer = match &best {
            Some(current) => distance_m < current.distance_m,
            None => true,
        };
        if closer {
            best = Some(NearestStation {
                name: station.name.clone(),
                location: station.location,
                distance_m,
            });
        }
    }
    best.ok_or(DashboardError::NoCandidates)
}

//! The in-memory dashboard catalog.
//!
//! Loaded once at startup from the two CSV tables, then shared read-only
//! for the process lifetime. Everything derived per incident (nearest
//! station, hover text) is precomputed here so request handlers only
//! filter and serialize.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use flood_common::{
    DashboardResult, FloodIncident, GeoPoint, NearestStation, RainStation, RainfallObservation,
};

use crate::config::DashboardConfig;
use crate::stations::{dedup_stations, nearest_station};
use crate::tables::{load_flood_incidents, load_rainfall_observations};

/// Watershed overview center, used only when there are no plotted
/// incidents and no stations to derive a center from.
const FALLBACK_MAP_CENTER: GeoPoint = GeoPoint {
    lat: -7.1,
    lon: 110.45,
};

/// One flood incident with its precomputed nearest station and the marker
/// hover text.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentRecord {
    pub date: NaiveDate,
    pub location: GeoPoint,
    pub area_name: String,
    pub nearest_station: Option<NearestStation>,
    pub hover_text: String,
}

/// A station marker on the incident map. `selected` mirrors the station
/// picker so the frontend can highlight the chosen station.
#[derive(Debug, Clone, Serialize)]
pub struct StationMarker {
    pub name: String,
    pub location: GeoPoint,
    pub selected: bool,
}

/// The complete view model for the incident map.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub stations: Vec<StationMarker>,
    pub incidents: Vec<IncidentRecord>,
}

/// Map request: an optional exact date, an optional station, and the
/// "show all flood data" flag.
#[derive(Debug, Clone, Default)]
pub struct MapSelection {
    pub date: Option<NaiveDate>,
    pub station: Option<String>,
    pub show_all: bool,
}

/// One point in a station's rainfall chart.
#[derive(Debug, Clone, Serialize)]
pub struct RainfallPoint {
    pub date: NaiveDate,
    pub rainfall_mm: f64,
}

/// Rainfall chart series for one station, in table order.
#[derive(Debug, Clone, Serialize)]
pub struct StationSeries {
    pub station: String,
    pub points: Vec<RainfallPoint>,
}

/// Header counts for the dashboard sidebar.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub incident_count: usize,
    pub station_count: usize,
    pub first_flood_date: Option<NaiveDate>,
    pub last_flood_date: Option<NaiveDate>,
}

/// All loaded table data plus the per-incident derivations.
#[derive(Debug)]
pub struct DataCatalog {
    incidents: Vec<IncidentRecord>,
    stations: Vec<RainStation>,
    observations: Vec<RainfallObservation>,
    flood_dates: Vec<NaiveDate>,
}

impl DataCatalog {
    /// Load both tables named by the config. A missing table is fatal;
    /// malformed rows have already been dropped by the loaders.
    pub fn load(config: &DashboardConfig) -> DashboardResult<Self> {
        let flood = load_flood_incidents(&config.flood_table_path())?;
        let rain = load_rainfall_observations(&config.rainfall_table_path())?;
        Ok(Self::from_tables(flood.rows, rain.rows))
    }

    /// Build the catalog from already-loaded rows.
    pub fn from_tables(
        incidents: Vec<FloodIncident>,
        observations: Vec<RainfallObservation>,
    ) -> Self {
        let stations = dedup_stations(&observations);

        let incidents: Vec<IncidentRecord> = incidents
            .into_iter()
            .map(|incident| {
                // the only matcher error is an empty station set
                let nearest = nearest_station(incident.location, &stations).ok();
                let hover_text = hover_text(incident.date, &incident.area_name, nearest.as_ref());
                IncidentRecord {
                    date: incident.date,
                    location: incident.location,
                    area_name: incident.area_name,
                    nearest_station: nearest,
                    hover_text,
                }
            })
            .collect();

        let mut flood_dates: Vec<NaiveDate> = incidents.iter().map(|i| i.date).collect();
        flood_dates.sort_unstable();
        flood_dates.dedup();

        info!(
            incidents = incidents.len(),
            stations = stations.len(),
            flood_dates = flood_dates.len(),
            "Catalog ready"
        );

        Self {
            incidents,
            stations,
            observations,
            flood_dates,
        }
    }

    pub fn incidents(&self) -> &[IncidentRecord] {
        &self.incidents
    }

    pub fn stations(&self) -> &[RainStation] {
        &self.stations
    }

    /// Unique flood dates, ascending.
    pub fn flood_dates(&self) -> &[NaiveDate] {
        &self.flood_dates
    }

    /// First and last flood date, bounds for the frontend's date slider.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.flood_dates.first(), self.flood_dates.last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        }
    }

    pub fn summary(&self) -> CatalogSummary {
        let range = self.date_range();
        CatalogSummary {
            incident_count: self.incidents.len(),
            station_count: self.stations.len(),
            first_flood_date: range.map(|r| r.0),
            last_flood_date: range.map(|r| r.1),
        }
    }

    /// Build the map view for a selection.
    ///
    /// Every station is always a marker; only the incident set varies.
    pub fn map_view(&self, selection: &MapSelection) -> MapView {
        let plotted = self.plotted_incidents(selection);
        let center = self.map_center(&plotted);

        let stations = self
            .stations
            .iter()
            .map(|s| StationMarker {
                name: s.name.clone(),
                location: s.location,
                selected: selection.station.as_deref() == Some(s.name.as_str()),
            })
            .collect();

        MapView {
            center,
            stations,
            incidents: plotted.into_iter().cloned().collect(),
        }
    }

    /// Rainfall chart series, optionally restricted to one station. Rows
    /// without a rainfall value never reach the chart. An unknown station
    /// yields an empty result, the same as filtering the table would.
    pub fn rainfall_series(&self, station: Option<&str>) -> Vec<StationSeries> {
        let mut series: Vec<StationSeries> = Vec::new();
        for obs in &self.observations {
            if let Some(wanted) = station {
                if obs.station_name != wanted {
                    continue;
                }
            }
            let rainfall_mm = match obs.rainfall_mm {
                Some(value) => value,
                None => continue,
            };
            let point = RainfallPoint {
                date: obs.date,
                rainfall_mm,
            };
            match series.iter_mut().find(|s| s.station == obs.station_name) {
                Some(entry) => entry.points.push(point),
                None => series.push(StationSeries {
                    station: obs.station_name.clone(),
                    points: vec![point],
                }),
            }
        }
        series
    }

    /// The incident set a selection plots.
    ///
    /// The "show all" flag only applies when no specific station is
    /// selected; with a station picked the view is always date-filtered.
    /// Omitting the date plots everything.
    fn plotted_incidents(&self, selection: &MapSelection) -> Vec<&IncidentRecord> {
        let show_all = selection.show_all && selection.station.is_none();
        if show_all {
            return self.incidents.iter().collect();
        }
        match selection.date {
            Some(date) => self.incidents.iter().filter(|i| i.date == date).collect(),
            None => self.incidents.iter().collect(),
        }
    }

    /// Center rule: with plotted incidents, the midpoint between the mean
    /// incident coordinate and the first plotted incident's nearest
    /// station (or just the mean when there is no nearest station). With
    /// nothing plotted, the mean station coordinate.
    fn map_center(&self, plotted: &[&IncidentRecord]) -> GeoPoint {
        if let Some(first) = plotted.first() {
            let flood_mean = mean_point(plotted.iter().map(|i| i.location));
            match &first.nearest_station {
                Some(nearest) => GeoPoint::new(
                    (flood_mean.lat + nearest.location.lat) / 2.0,
                    (flood_mean.lon + nearest.location.lon) / 2.0,
                ),
                None => flood_mean,
            }
        } else if !self.stations.is_empty() {
            mean_point(self.stations.iter().map(|s| s.location))
        } else {
            FALLBACK_MAP_CENTER
        }
    }
}

fn hover_text(date: NaiveDate, area_name: &str, nearest: Option<&NearestStation>) -> String {
    match nearest {
        Some(station) => format!(
            "{} | {} | Nearest Station: {}",
            date.format("%Y-%m-%d"),
            area_name,
            station.name
        ),
        None => format!(
            "{} | {} | No nearest station",
            date.format("%Y-%m-%d"),
            area_name
        ),
    }
}

/// Arithmetic mean of a non-empty point sequence.
fn mean_point(points: impl Iterator<Item = GeoPoint>) -> GeoPoint {
    let mut count = 0usize;
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    for point in points {
        lat_sum += point.lat;
        lon_sum += point.lon;
        count += 1;
    }
    GeoPoint::new(lat_sum / count as f64, lon_sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn incident(y: i32, m: u32, d: u32, lat: f64, lon: f64, area: &str) -> FloodIncident {
        FloodIncident {
            date: date(y, m, d),
            location: GeoPoint::new(lat, lon),
            area_name: area.to_string(),
        }
    }

    fn observation(
        y: i32,
        m: u32,
        d: u32,
        lat: f64,
        lon: f64,
        name: &str,
        rainfall: Option<f64>,
    ) -> RainfallObservation {
        RainfallObservation {
            date: date(y, m, d),
            location: GeoPoint::new(lat, lon),
            station_name: name.to_string(),
            rainfall_mm: rainfall,
        }
    }

    fn sample_catalog() -> DataCatalog {
        DataCatalog::from_tables(
            vec![
                incident(2024, 1, 15, -7.0383, 110.4366, "Dinar Indah"),
                incident(2024, 1, 15, -7.0420, 110.4310, "Meteseh"),
                incident(2024, 2, 2, -7.0455, 110.4405, "Rowosari"),
            ],
            vec![
                observation(2024, 1, 15, -7.05, 110.44, "Gunungpati", Some(12.5)),
                observation(2024, 1, 15, -7.01, 110.40, "Simongan", Some(8.0)),
                observation(2024, 2, 2, -7.05, 110.44, "Gunungpati", Some(30.2)),
                observation(2024, 2, 2, -7.01, 110.40, "Simongan", Some(22.1)),
                observation(2024, 3, 1, -7.02, 110.45, "Plamongan", None),
            ],
        )
    }

    #[test]
    fn test_precomputed_nearest_and_hover() {
        let catalog = sample_catalog();
        let first = &catalog.incidents()[0];

        let nearest = first.nearest_station.as_ref().unwrap();
        assert_eq!(nearest.name, "Gunungpati");
        assert!((nearest.distance_m - 1347.34).abs() < 0.5);
        assert_eq!(
            first.hover_text,
            "2024-01-15 | Dinar Indah | Nearest Station: Gunungpati"
        );
    }

    #[test]
    fn test_hover_degrades_without_stations() {
        let catalog = DataCatalog::from_tables(
            vec![incident(2024, 1, 15, -7.0383, 110.4366, "Dinar Indah")],
            vec![],
        );
        let first = &catalog.incidents()[0];
        assert!(first.nearest_station.is_none());
        assert_eq!(first.hover_text, "2024-01-15 | Dinar Indah | No nearest station");
    }

    #[test]
    fn test_flood_dates_unique_sorted() {
        let catalog = sample_catalog();
        assert_eq!(catalog.flood_dates(), &[date(2024, 1, 15), date(2024, 2, 2)]);
        assert_eq!(
            catalog.date_range(),
            Some((date(2024, 1, 15), date(2024, 2, 2)))
        );
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample_catalog().summary();
        assert_eq!(summary.incident_count, 3);
        assert_eq!(summary.station_count, 3);
        assert_eq!(summary.first_flood_date, Some(date(2024, 1, 15)));
        assert_eq!(summary.last_flood_date, Some(date(2024, 2, 2)));
    }

    #[test]
    fn test_map_view_date_filter() {
        let catalog = sample_catalog();
        let view = catalog.map_view(&MapSelection {
            date: Some(date(2024, 1, 15)),
            ..Default::default()
        });
        assert_eq!(view.incidents.len(), 2);
        assert_eq!(view.stations.len(), 3);
        assert!(view.stations.iter().all(|s| !s.selected));
    }

    #[test]
    fn test_show_all_overrides_date() {
        let catalog = sample_catalog();
        let view = catalog.map_view(&MapSelection {
            date: Some(date(2024, 1, 15)),
            show_all: true,
            ..Default::default()
        });
        assert_eq!(view.incidents.len(), 3);
    }

    #[test]
    fn test_station_selection_disables_show_all() {
        let catalog = sample_catalog();
        let view = catalog.map_view(&MapSelection {
            date: Some(date(2024, 1, 15)),
            station: Some("Gunungpati".to_string()),
            show_all: true,
        });
        // still date-filtered despite the flag
        assert_eq!(view.incidents.len(), 2);

        let selected: Vec<&str> = view
            .stations
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(selected, vec!["Gunungpati"]);
    }

    #[test]
    fn test_center_midpoint_rule() {
        let catalog = sample_catalog();
        let view = catalog.map_view(&MapSelection {
            date: Some(date(2024, 1, 15)),
            ..Default::default()
        });

        // mean of the two plotted incidents, then midpoint with the first
        // incident's nearest station (Gunungpati at -7.05, 110.44)
        let flood_mean_lat = (-7.0383 + -7.0420) / 2.0;
        let flood_mean_lon = (110.4366 + 110.4310) / 2.0;
        let expected_lat = (flood_mean_lat + -7.05) / 2.0;
        let expected_lon = (flood_mean_lon + 110.44) / 2.0;

        assert!((view.center.lat - expected_lat).abs() < 1e-9);
        assert!((view.center.lon - expected_lon).abs() < 1e-9);
    }

    #[test]
    fn test_center_station_mean_when_nothing_plotted() {
        let catalog = sample_catalog();
        let view = catalog.map_view(&MapSelection {
            date: Some(date(2025, 12, 31)),
            ..Default::default()
        });
        assert!(view.incidents.is_empty());

        let expected_lat = (-7.05 + -7.01 + -7.02) / 3.0;
        let expected_lon = (110.44 + 110.40 + 110.45) / 3.0;
        assert!((view.center.lat - expected_lat).abs() < 1e-9);
        assert!((view.center.lon - expected_lon).abs() < 1e-9);
    }

    #[test]
    fn test_center_flood_mean_without_stations() {
        let catalog = DataCatalog::from_tables(
            vec![
                incident(2024, 1, 15, -7.0, 110.4, "A"),
                incident(2024, 1, 15, -7.1, 110.5, "B"),
            ],
            vec![],
        );
        let view = catalog.map_view(&MapSelection {
            date: Some(date(2024, 1, 15)),
            ..Default::default()
        });
        assert!((view.center.lat - -7.05).abs() < 1e-9);
        assert!((view.center.lon - 110.45).abs() < 1e-9);
    }

    #[test]
    fn test_center_fallback_with_no_data_at_all() {
        let catalog = DataCatalog::from_tables(vec![], vec![]);
        let view = catalog.map_view(&MapSelection::default());
        assert!((view.center.lat - -7.1).abs() < 1e-9);
        assert!((view.center.lon - 110.45).abs() < 1e-9);
    }

    #[test]
    fn test_rainfall_series_grouping() {
        let catalog = sample_catalog();
        let series = catalog.rainfall_series(None);

        // Plamongan only has a missing-value row and never forms a series
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].station, "Gunungpati");
        assert_eq!(series[0].points.len(), 2);
        assert_eq!(series[0].points[1].rainfall_mm, 30.2);
        assert_eq!(series[1].station, "Simongan");
    }

    #[test]
    fn test_rainfall_series_station_filter() {
        let catalog = sample_catalog();

        let series = catalog.rainfall_series(Some("Simongan"));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].station, "Simongan");
        assert_eq!(series[0].points.len(), 2);

        assert!(catalog.rainfall_series(Some("Unknown")).is_empty());
    }
}

//! CSV table loaders for the flood incident and rainfall inputs.
//!
//! Both tables are hand-maintained exports, so the loaders are strict per
//! row but forgiving per file: a row with an unparseable date, coordinate
//! or shape is dropped and counted, never repaired, and the rest of the
//! file still loads. A missing file is fatal because every dashboard
//! section depends on these tables.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::{info, warn};

use flood_common::{
    parse_table_date, DashboardError, DashboardResult, FloodIncident, GeoPoint,
    RainfallObservation,
};

/// Result of loading one table: the surviving rows in file order plus the
/// number of rows dropped by validation.
#[derive(Debug, Clone)]
pub struct TableLoad<T> {
    pub rows: Vec<T>,
    pub dropped: usize,
}

/// Raw incident row as it appears in the CSV.
#[derive(Debug, Deserialize)]
struct FloodRow {
    date: String,
    lat: f64,
    lon: f64,
    #[serde(rename = "Name_of_area")]
    area_name: String,
}

/// Raw rainfall row. The rainfall cell is read as text because an
/// unparseable value demotes to `None` instead of dropping the row.
#[derive(Debug, Deserialize)]
struct RainfallRow {
    date: String,
    #[serde(rename = "Lat_DD")]
    lat: f64,
    #[serde(rename = "Lon_DD")]
    lon: f64,
    #[serde(rename = "location_name")]
    station_name: String,
    #[serde(rename = "rainfall(mm)")]
    rainfall: String,
}

/// Load the flood incident table.
pub fn load_flood_incidents(path: &Path) -> DashboardResult<TableLoad<FloodIncident>> {
    let load = load_table(path, parse_flood_row)?;
    info!(
        path = ?path,
        loaded = load.rows.len(),
        dropped = load.dropped,
        "Loaded flood incident table"
    );
    Ok(load)
}

/// Load the rainfall observation table.
pub fn load_rainfall_observations(path: &Path) -> DashboardResult<TableLoad<RainfallObservation>> {
    let load = load_table(path, parse_rainfall_row)?;
    info!(
        path = ?path,
        loaded = load.rows.len(),
        dropped = load.dropped,
        "Loaded rainfall observation table"
    );
    Ok(load)
}

/// Shared reader loop: open the file, walk the records, keep what parses.
fn load_table<T>(
    path: &Path,
    parse: fn(&StringRecord, &StringRecord, usize) -> DashboardResult<T>,
) -> DashboardResult<TableLoad<T>> {
    if !path.exists() {
        return Err(DashboardError::MissingFile(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                warn!(line, error = %e, "Dropping unreadable row");
                dropped += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        match parse(&record, &headers, line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(line, error = %e, "Dropping invalid row");
                dropped += 1;
            }
        }
    }

    Ok(TableLoad { rows, dropped })
}

fn parse_flood_row(
    record: &StringRecord,
    headers: &StringRecord,
    line: usize,
) -> DashboardResult<FloodIncident> {
    let raw: FloodRow = record
        .deserialize(Some(headers))
        .map_err(|e| invalid(line, format!("row shape: {}", e)))?;
    let date = parse_table_date(&raw.date).map_err(|e| invalid(line, e.to_string()))?;
    let location = GeoPoint::new(raw.lat, raw.lon);
    if !location.is_finite() {
        return Err(invalid(line, "non-finite coordinates"));
    }
    Ok(FloodIncident {
        date,
        location,
        area_name: raw.area_name,
    })
}

fn parse_rainfall_row(
    record: &StringRecord,
    headers: &StringRecord,
    line: usize,
) -> DashboardResult<RainfallObservation> {
    let raw: RainfallRow = record
        .deserialize(Some(headers))
        .map_err(|e| invalid(line, format!("row shape: {}", e)))?;
    let date = parse_table_date(&raw.date).map_err(|e| invalid(line, e.to_string()))?;
    let location = GeoPoint::new(raw.lat, raw.lon);
    if !location.is_finite() {
        return Err(invalid(line, "non-finite coordinates"));
    }
    Ok(RainfallObservation {
        date,
        location,
        station_name: raw.station_name,
        rainfall_mm: parse_rainfall_cell(&raw.rainfall),
    })
}

/// Parse a rainfall cell. Empty, non-numeric and non-finite values all
/// demote to `None`: the row still contributes its station, it is only
/// excluded from chart series.
fn parse_rainfall_cell(cell: &str) -> Option<f64> {
    let value: f64 = cell.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

fn invalid(line: usize, reason: impl Into<String>) -> DashboardError {
    DashboardError::InvalidRecord {
        line,
        reason: reason.into(),
    }
}

fn csv_error(e: csv::Error) -> DashboardError {
    DashboardError::InternalError(format!("CSV error: {}", e))
}

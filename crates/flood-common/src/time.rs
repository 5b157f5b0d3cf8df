//! Date parsing for the input tables.

use chrono::NaiveDate;

/// Date format used by both input tables: month/day/two-digit-year.
pub const TABLE_DATE_FORMAT: &str = "%m/%d/%y";

#[derive(Debug, thiserror::Error)]
pub enum DateParseError {
    #[error("Invalid date '{0}': expected MM/DD/YY")]
    InvalidFormat(String),
}

/// Parse a table date cell.
///
/// Two-digit years pivot the way strptime does: 00-68 land in the 2000s,
/// 69-99 in the 1900s. Rows that fail this parse are dropped by the
/// loaders, never repaired.
pub fn parse_table_date(s: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(s.trim(), TABLE_DATE_FORMAT)
        .map_err(|_| DateParseError::InvalidFormat(s.to_string()))
}

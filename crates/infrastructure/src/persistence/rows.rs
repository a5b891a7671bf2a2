//! Column encoding shared by the SQLite stores
//!
//! Ids are stored as hyphenated UUID text. Timestamps are RFC 3339 UTC with
//! fixed nanosecond precision so that text order equals time order.

use std::str::FromStr;

use application::error::ApplicationError;
use chrono::{DateTime, SecondsFormat, Utc};

use super::error::corrupt;

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, ApplicationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupt(column, value))
}

/// Parse a stored column into its domain type
pub fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, ApplicationError> {
    value.parse().map_err(|_| corrupt(column, value))
}

pub fn parse_optional<T: FromStr>(
    column: &str,
    value: Option<&str>,
) -> Result<Option<T>, ApplicationError> {
    value.map(|v| parse_column(column, v)).transpose()
}

//! Calendar dates without a time of day.
//!
//! Dates travel as `YYYY-MM-DD` text. They are never routed through an
//! RFC 3339 / datetime parser, which would attach an offset and could move
//! the value onto a neighbouring calendar day.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("expected a date in YYYY-MM-DD form, got {0:?}")]
    Malformed(String),
    #[error("{0:?} is not a valid calendar date")]
    OutOfCalendar(String),
}

/// Parse a strict `YYYY-MM-DD` string.
///
/// Anything with a time component, an offset, missing zero padding or
/// surrounding whitespace is rejected.
pub fn parse_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let bytes = raw.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(DateParseError::Malformed(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| DateParseError::OutOfCalendar(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_date(*date))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

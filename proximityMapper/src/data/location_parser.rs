use std::fmt;

use serde_json::Value;
use tracing::warn;

use crate::config::constants::DEFAULT_LOCATION_COLUMN;
use crate::models::coordinate::Coordinate;

/// A location cell before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLocation<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
    Other(&'static str),
}

impl<'a> RawLocation<'a> {
    /// Classifies a CSV cell: empty is missing, a lone float is a number,
    /// anything else is text to be split.
    pub fn from_cell(cell: &'a str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            RawLocation::Missing
        } else if let Ok(value) = trimmed.parse::<f64>() {
            RawLocation::Number(value)
        } else {
            RawLocation::Text(cell)
        }
    }
}

impl<'a> From<&'a Value> for RawLocation<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(s) => RawLocation::Text(s),
            Value::Number(n) => n.as_f64().map(RawLocation::Number).unwrap_or(RawLocation::Other("number")),
            Value::Null => RawLocation::Missing,
            Value::Bool(_) => RawLocation::Other("bool"),
            Value::Array(_) => RawLocation::Other("array"),
            Value::Object(_) => RawLocation::Other("object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    Malformed { value: String, reason: String },
    UnexpectedValue(f64),
    UnexpectedType(&'static str),
    Missing,
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::Malformed { value, reason } => {
                write!(f, "invalid location '{}': {}", value, reason)
            }
            LocationError::UnexpectedValue(v) => write!(f, "unexpected value {}", v),
            LocationError::UnexpectedType(t) => write!(f, "unexpected type {}", t),
            LocationError::Missing => write!(f, "missing value"),
        }
    }
}

impl std::error::Error for LocationError {}

/// Turns raw `"lat,lng"` cells into coordinates. Failures are reported as
/// diagnostics and the record is skipped; parsing never aborts a batch.
#[derive(Debug, Clone)]
pub struct LocationParser {
    column: String,
}

impl Default for LocationParser {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION_COLUMN)
    }
}

impl LocationParser {
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into() }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn parse(&self, raw: &RawLocation<'_>) -> Option<Coordinate> {
        match self.try_parse(raw) {
            Ok(coordinate) => Some(coordinate),
            Err(e) => {
                warn!(column = %self.column, "{}; skipping row", e);
                None
            }
        }
    }

    pub fn try_parse(&self, raw: &RawLocation<'_>) -> Result<Coordinate, LocationError> {
        match raw {
            RawLocation::Text(text) => parse_pair(text),
            RawLocation::Number(value) => Err(LocationError::UnexpectedValue(*value)),
            RawLocation::Missing => Err(LocationError::Missing),
            RawLocation::Other(type_name) => Err(LocationError::UnexpectedType(type_name)),
        }
    }
}

fn parse_pair(text: &str) -> Result<Coordinate, LocationError> {
    let malformed = |reason: String| LocationError::Malformed {
        value: text.to_string(),
        reason,
    };

    let tokens: Vec<&str> = text.split(',').collect();
    if tokens.len() != 2 {
        return Err(malformed(format!("expected 2 comma-separated values, found {}", tokens.len())));
    }

    let lat: f64 = tokens[0]
        .trim()
        .parse()
        .map_err(|_| malformed(format!("latitude '{}' is not a number", tokens[0].trim())))?;
    let lng: f64 = tokens[1]
        .trim()
        .parse()
        .map_err(|_| malformed(format!("longitude '{}' is not a number", tokens[1].trim())))?;

    Coordinate::new(lat, lng).map_err(|e| malformed(e.to_string()))
}

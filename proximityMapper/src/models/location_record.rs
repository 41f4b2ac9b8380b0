use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// Column name -> cell value for one input row, kept for tooltips and exports.
pub type RowAttributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRole {
    Aggressor,
    Victim,
}

impl EntityRole {
    pub fn label(&self) -> &'static str {
        match self {
            EntityRole::Aggressor => "Aggressor",
            EntityRole::Victim => "Victim",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            EntityRole::Aggressor => "red",
            EntityRole::Victim => "green",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            EntityRole::Aggressor => "male",
            EntityRole::Victim => "female",
        }
    }
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One typed input observation.
///
/// `coordinate` is `Some` exactly when the raw location parsed; records
/// without one stay in the set (they keep their index) but never take part in
/// matching or routes.
#[derive(Debug, Clone)]
pub struct LocationRecord {
    raw_location: Option<String>,
    coordinate: Option<Coordinate>,
    precision: Option<f64>,
    timestamp: Option<String>,
    attributes: Arc<RowAttributes>,
}

impl LocationRecord {
    pub fn new(
        raw_location: Option<String>,
        coordinate: Option<Coordinate>,
        precision: Option<f64>,
        timestamp: Option<String>,
        attributes: RowAttributes,
    ) -> Self {
        Self {
            raw_location,
            coordinate,
            precision,
            timestamp,
            attributes: Arc::new(attributes),
        }
    }

    /// Record with a known coordinate and no extra columns.
    pub fn located(coordinate: Coordinate) -> Self {
        Self::new(Some(coordinate.to_string()), Some(coordinate), None, None, RowAttributes::new())
    }

    /// Record whose location could not be parsed.
    pub fn unlocated(raw_location: Option<String>) -> Self {
        Self::new(raw_location, None, None, None, RowAttributes::new())
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn raw_location(&self) -> Option<&str> {
        self.raw_location.as_deref()
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn precision(&self) -> Option<f64> {
        self.precision
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn attributes(&self) -> &RowAttributes {
        &self.attributes
    }

    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes.get(column).map(String::as_str)
    }
}

/// Ordered records for one role. Input order is preserved and defines both
/// record indices and 1-based positions.
#[derive(Debug, Clone)]
pub struct EntitySet {
    role: EntityRole,
    records: Vec<LocationRecord>,
}

impl EntitySet {
    pub fn new(role: EntityRole, records: Vec<LocationRecord>) -> Self {
        Self { role, records }
    }

    pub fn empty(role: EntityRole) -> Self {
        Self::new(role, Vec::new())
    }

    /// Shorthand for sets built from known coordinates.
    pub fn from_coordinates(role: EntityRole, coordinates: impl IntoIterator<Item = Coordinate>) -> Self {
        Self::new(role, coordinates.into_iter().map(LocationRecord::located).collect())
    }

    pub fn role(&self) -> EntityRole {
        self.role
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(index, record, coordinate)` for every record that has a coordinate,
    /// in input order. Enumerating this iterator gives the 0-based position.
    pub fn located(&self) -> impl Iterator<Item = (usize, &LocationRecord, Coordinate)> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| record.coordinate().map(|c| (index, record, c)))
    }

    pub fn located_count(&self) -> usize {
        self.located().count()
    }

    pub fn first_coordinate(&self) -> Option<Coordinate> {
        self.located().next().map(|(_, _, c)| c)
    }
}

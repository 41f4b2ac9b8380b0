use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::config::constants::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};

/// A WGS84 latitude/longitude pair in degrees.
///
/// Fields are private so a `Coordinate` is always finite and inside the
/// valid ranges. It serializes as `[lat, lng]`, the same shape secured
/// zones use in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateError {
    NotFinite { lat: f64, lng: f64 },
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateError::NotFinite { lat, lng } => {
                write!(f, "coordinate is not finite: {}, {}", lat, lng)
            }
            CoordinateError::LatitudeOutOfRange(lat) => {
                write!(f, "latitude {} outside [{}, {}]", lat, MIN_LATITUDE, MAX_LATITUDE)
            }
            CoordinateError::LongitudeOutOfRange(lng) => {
                write!(f, "longitude {} outside [{}, {}]", lng, MIN_LONGITUDE, MAX_LONGITUDE)
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

/// Bit-exact identity of a coordinate, used for memoization.
pub type CoordinateKey = (u64, u64);

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { lat: 0.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NotFinite { lat, lng });
        }
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        // Adding 0.0 folds -0.0 into 0.0 so equal coordinates share a key.
        Ok(Self { lat: lat + 0.0, lng: lng + 0.0 })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// `geo` points are (x, y) = (lng, lat).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }

    pub fn key(&self) -> CoordinateKey {
        (self.lat.to_bits(), self.lng.to_bits())
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = CoordinateError;

    fn try_from(pair: [f64; 2]) -> Result<Self, Self::Error> {
        Coordinate::new(pair[0], pair[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coordinate: Coordinate) -> Self {
        [coordinate.lat, coordinate.lng]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

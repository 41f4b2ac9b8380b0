// Seams between the matcher and whatever supplies distances

use std::sync::Arc;

use crate::models::coordinate::Coordinate;

/// Distance in meters between two coordinates.
pub trait DistanceSource {
    fn distance(&self, a: &Coordinate, b: &Coordinate) -> f64;
}

impl<T: DistanceSource + ?Sized> DistanceSource for &T {
    fn distance(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        (**self).distance(a, b)
    }
}

impl<T: DistanceSource + ?Sized> DistanceSource for Arc<T> {
    fn distance(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        (**self).distance(a, b)
    }
}

use serde::Serialize;

use crate::models::coordinate::Coordinate;
use crate::models::secured_zone::SecuredZone;

/// A secured zone resolved to the circle that gets drawn around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneFootprint<'a> {
    pub zone: &'a SecuredZone,
    pub coordinate: Coordinate,
    pub radius_m: f64,
}

/// Maps each zone to its footprint. Inactive zones pass through too;
/// choosing which zones matter is up to the caller.
pub fn expand(zones: &[SecuredZone], radius: f64) -> Vec<ZoneFootprint<'_>> {
    zones
        .iter()
        .map(|zone| ZoneFootprint {
            zone,
            coordinate: zone.coordinate,
            radius_m: zone.radius.unwrap_or(radius),
        })
        .collect()
}

pub fn first_active(zones: &[SecuredZone]) -> Option<&SecuredZone> {
    zones.iter().find(|zone| zone.active)
}

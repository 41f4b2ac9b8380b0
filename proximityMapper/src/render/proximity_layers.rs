use tracing::warn;

use super::map_document::MapDocument;
use super::tooltip::build_tooltip;
use crate::config::constants::{ALERT_COLOR, ALERT_FILL_OPACITY, INVALID_RECORD_COLOR, VALID_COLUMN, ZONE_COLOR};
use crate::core::proximity::MatchOutcome;
use crate::core::zones::{self, ZoneFootprint};
use crate::models::coordinate::Coordinate;
use crate::models::location_record::{EntityRole, EntitySet, LocationRecord};
use crate::models::secured_zone::SecuredZone;
use crate::utils::logging::{self, OperationCategory};

/// First active zone, else the first located aggressor, else the first
/// located victim, else the origin.
pub fn map_center(zones: &[SecuredZone], aggressors: &EntitySet, victims: &EntitySet) -> Coordinate {
    zones::first_active(zones)
        .map(|zone| zone.coordinate)
        .or_else(|| aggressors.first_coordinate())
        .or_else(|| victims.first_coordinate())
        .unwrap_or_else(|| {
            warn!("no active zone or located record to center the map on, using 0,0");
            Coordinate::ORIGIN
        })
}

pub fn draw_zones(map: &mut MapDocument, footprints: &[ZoneFootprint<'_>]) {
    for footprint in footprints {
        let tooltip = build_tooltip(&footprint.zone.name, None, Some(footprint.coordinate), None);
        map.add_marker(footprint.coordinate, tooltip.clone(), ZONE_COLOR, &footprint.zone.kind);
        map.add_proximity_circle(footprint.coordinate, footprint.radius_m, ZONE_COLOR, tooltip, None);
    }
}

/// Records flagged with a non-zero `valid` column are drawn in gray.
fn marker_color(role: EntityRole, record: &LocationRecord) -> &'static str {
    match record.attribute(VALID_COLUMN).map(str::trim) {
        None | Some("") | Some("0") => role.color(),
        Some(_) => INVALID_RECORD_COLOR,
    }
}

pub fn draw_aggressors(map: &mut MapDocument, aggressors: &EntitySet) {
    let role = aggressors.role();
    for (ordinal, (_, record, coordinate)) in aggressors.located().enumerate() {
        let tooltip = build_tooltip(role.label(), Some(ordinal + 1), Some(coordinate), Some(record));
        map.add_marker(coordinate, tooltip, role.color(), role.icon());
    }
}

/// Near victims only: one alert circle per triggering aggressor plus the
/// victim marker.
pub fn draw_victims(map: &mut MapDocument, victims: &EntitySet, outcome: &MatchOutcome) {
    let role = victims.role();
    for result in outcome.near_results() {
        for trigger in &result.triggers {
            map.add_proximity_circle(
                result.coordinate,
                outcome.threshold_m,
                ALERT_COLOR,
                format!("Proximity Alert: {:.2}m", trigger.distance_m),
                Some(ALERT_FILL_OPACITY),
            );
        }

        let record = victims.records().get(result.victim_index);
        let color = record.map(|r| marker_color(role, r)).unwrap_or(role.color());
        let tooltip = build_tooltip(role.label(), Some(result.position), Some(result.coordinate), record);
        map.add_marker(result.coordinate, tooltip, color, role.icon());
    }
}

pub fn draw_routes(map: &mut MapDocument, outcome: &MatchOutcome) {
    map.add_route(&outcome.aggressor_route.points, outcome.aggressor_route.role.color());
    map.add_route(&outcome.victim_route.points, outcome.victim_route.role.color());
}

/// Builds the complete map for one matching session.
pub fn compose_map(
    footprints: &[ZoneFootprint<'_>],
    zones: &[SecuredZone],
    victims: &EntitySet,
    aggressors: &EntitySet,
    outcome: &MatchOutcome,
) -> MapDocument {
    let _timing = logging::start_timing("compose_map", OperationCategory::Rendering);

    let mut map = MapDocument::new(map_center(zones, aggressors, victims));
    draw_zones(&mut map, footprints);
    draw_victims(&mut map, victims, outcome);
    draw_aggressors(&mut map, aggressors);
    draw_routes(&mut map, outcome);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::DistanceOracle;
    use crate::core::proximity::ProximityMatcher;
    use crate::models::location_record::RowAttributes;
    use crate::render::map_document::Layer;

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn victim_with_valid(coordinate: Coordinate, valid: &str) -> LocationRecord {
        let mut attributes = RowAttributes::new();
        attributes.insert("valid".to_string(), valid.to_string());
        LocationRecord::new(Some(coordinate.to_string()), Some(coordinate), Some(5.0), None, attributes)
    }

    #[test]
    fn center_prefers_active_zone_then_aggressor() {
        let victims = EntitySet::from_coordinates(EntityRole::Victim, [c(3.0, 3.0)]);
        let aggressors = EntitySet::from_coordinates(EntityRole::Aggressor, [c(2.0, 2.0)]);
        let zones = vec![
            SecuredZone::new("off", c(0.5, 0.5), "home", false),
            SecuredZone::new("on", c(1.0, 1.0), "home", true),
        ];
        assert_eq!(map_center(&zones, &aggressors, &victims), c(1.0, 1.0));
        assert_eq!(map_center(&zones[..1], &aggressors, &victims), c(2.0, 2.0));
        assert_eq!(map_center(&[], &EntitySet::empty(EntityRole::Aggressor), &victims), c(3.0, 3.0));
    }

    #[test]
    fn composes_expected_layers() {
        let victims = EntitySet::new(
            EntityRole::Victim,
            vec![
                victim_with_valid(c(10.0, 10.0), "0"),
                victim_with_valid(c(10.0, 10.00005), "1"),
                victim_with_valid(c(30.0, 30.0), "0"),
            ],
        );
        let aggressors = EntitySet::from_coordinates(EntityRole::Aggressor, [c(10.0, 10.0001), c(50.0, 50.0)]);
        let secured = vec![SecuredZone::new("Home", c(10.0, 10.0), "home", true)];
        let oracle = DistanceOracle::new();
        let outcome = ProximityMatcher::new(&oracle).run(&victims, &aggressors, 50.0).unwrap();
        let footprints = zones::expand(&secured, 50.0);

        let map = compose_map(&footprints, &secured, &victims, &aggressors, &outcome);

        let markers: Vec<(&str, &str)> = map
            .layers()
            .iter()
            .filter_map(|l| match l {
                Layer::Marker { color, icon, .. } => Some((color.as_str(), icon.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            markers,
            vec![("blue", "home"), ("green", "female"), ("gray", "female"), ("red", "male"), ("red", "male")]
        );

        let alerts = map
            .layers()
            .iter()
            .filter(|l| matches!(l, Layer::Circle { color, .. } if color == "orange"))
            .count();
        assert_eq!(alerts, 2);

        let polylines = map.layers().iter().filter(|l| matches!(l, Layer::Polyline { .. })).count();
        assert_eq!(polylines, 2);
    }
}

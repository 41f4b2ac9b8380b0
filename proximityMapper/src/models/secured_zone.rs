use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

fn default_active() -> bool {
    true
}

/// A named protected location, e.g. a home or a workplace.
///
/// Matches the configuration shape
/// `{"name": "...", "coordinates": [lat, lng], "type": "home", "active": true}`.
/// `radius` is optional and overrides the shared proximity distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuredZone {
    pub name: String,
    #[serde(rename = "coordinates")]
    pub coordinate: Coordinate,
    #[serde(rename = "type", default = "SecuredZone::default_kind")]
    pub kind: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl SecuredZone {
    pub fn new(name: impl Into<String>, coordinate: Coordinate, kind: impl Into<String>, active: bool) -> Self {
        Self {
            name: name.into(),
            coordinate,
            kind: kind.into(),
            active,
            radius: None,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    fn default_kind() -> String {
        "home".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_configuration_shape() {
        let json = r#"[
            {"name": "Home", "coordinates": [40.4168, -3.7038], "type": "home", "active": true},
            {"name": "Work", "coordinates": [40.42, -3.70], "type": "building", "active": false, "radius": 250}
        ]"#;
        let zones: Vec<SecuredZone> = serde_json::from_str(json).unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].kind, "home");
        assert_eq!(zones[0].radius, None);
        assert!(!zones[1].active);
        assert_eq!(zones[1].radius, Some(250.0));
    }

    #[test]
    fn active_and_type_have_defaults() {
        let zone: SecuredZone = serde_json::from_str(r#"{"name": "Z", "coordinates": [1.0, 2.0]}"#).unwrap();
        assert!(zone.active);
        assert_eq!(zone.kind, "home");
    }

    #[test]
    fn rejects_invalid_coordinates() {
        let result = serde_json::from_str::<SecuredZone>(r#"{"name": "Z", "coordinates": [100.0, 2.0]}"#);
        assert!(result.is_err());
    }
}

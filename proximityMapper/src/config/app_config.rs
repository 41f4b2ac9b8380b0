use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::constants::{
    DEFAULT_LOCATION_COLUMN, ENV_LOCATION_COLUMN, ENV_PROXIMITY_DISTANCE, ENV_SECURED_AREAS, ENV_VALID_PRECISION,
};
use crate::core::zones;
use crate::models::secured_zone::SecuredZone;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Missing { key: String },
    Invalid { key: String, value: String, reason: String },
    EnvFile { path: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing { key } => write!(f, "configuration key {} is not set", key),
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "configuration key {} has invalid value '{}': {}", key, value, reason)
            }
            ConfigError::EnvFile { path, reason } => write!(f, "could not load env file {}: {}", path, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Run settings read from the environment (optionally seeded from a `.env`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Proximity threshold in meters; also the default secured-zone radius.
    pub proximity_distance: f64,
    pub secured_areas: Vec<SecuredZone>,
    /// Rows with a larger `precision` value are discarded at load time.
    pub valid_precision: f64,
    pub location_column: String,
}

impl AppConfig {
    /// Loads `.env` from the working directory when present, then reads the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("loaded environment from {}", path.display()),
            Err(e) if e.not_found() => debug!("no .env file found, using process environment"),
            Err(e) => {
                return Err(ConfigError::EnvFile {
                    path: ".env".to_string(),
                    reason: e.to_string(),
                })
            }
        }
        Self::from_env()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; every key is validated
    /// before anything is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let proximity_raw = required(&lookup, ENV_PROXIMITY_DISTANCE)?;
        let proximity_distance = parse_distance(ENV_PROXIMITY_DISTANCE, &proximity_raw)?;

        let areas_raw = required(&lookup, ENV_SECURED_AREAS)?;
        let secured_areas: Vec<SecuredZone> =
            serde_json::from_str(&areas_raw).map_err(|e| invalid(ENV_SECURED_AREAS, &areas_raw, e.to_string()))?;
        for zone in &secured_areas {
            if let Some(radius) = zone.radius {
                if !radius.is_finite() || radius < 0.0 {
                    return Err(invalid(ENV_SECURED_AREAS, &areas_raw,
                        format!("zone '{}' has invalid radius {}", zone.name, radius)));
                }
            }
        }

        let precision_raw = required(&lookup, ENV_VALID_PRECISION)?;
        let valid_precision: f64 = serde_json::from_str(&precision_raw)
            .map_err(|e| invalid(ENV_VALID_PRECISION, &precision_raw, e.to_string()))?;

        let location_column = lookup(ENV_LOCATION_COLUMN)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_LOCATION_COLUMN.to_string());

        info!(
            proximity_distance,
            secured_areas = secured_areas.len(),
            valid_precision,
            "configuration loaded"
        );

        Ok(Self {
            proximity_distance,
            secured_areas,
            valid_precision,
            location_column,
        })
    }

    /// Replaces the configured threshold, validating it the same way.
    pub fn with_proximity_distance(mut self, meters: f64) -> Result<Self, ConfigError> {
        self.proximity_distance = parse_distance(ENV_PROXIMITY_DISTANCE, &meters.to_string())?;
        Ok(self)
    }

    pub fn first_active_zone(&self) -> Option<&SecuredZone> {
        zones::first_active(&self.secured_areas)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing { key: key.to_string() }),
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_distance(key: &str, raw: &str) -> Result<f64, ConfigError> {
    let meters: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(key, raw, "expected a number of meters"))?;
    if !meters.is_finite() || meters < 0.0 {
        return Err(invalid(key, raw, "must be a finite, non-negative number of meters"));
    }
    Ok(meters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const ZONES: &str = r#"[{"name": "Home", "coordinates": [40.0, -3.0], "type": "home", "active": false},
                            {"name": "Work", "coordinates": [40.1, -3.1], "type": "building", "active": true}]"#;

    #[test]
    fn loads_all_keys() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PROXIMITY_DISTANCE", "500"),
            ("SECURED_AREAS", ZONES),
            ("VALID_PRECISION", "20"),
        ]))
        .unwrap();
        assert_eq!(config.proximity_distance, 500.0);
        assert_eq!(config.secured_areas.len(), 2);
        assert_eq!(config.valid_precision, 20.0);
        assert_eq!(config.location_column, "location");
        assert_eq!(config.first_active_zone().map(|z| z.name.as_str()), Some("Work"));
    }

    #[test]
    fn missing_keys_are_named() {
        let err = AppConfig::from_lookup(lookup(&[("SECURED_AREAS", "[]"), ("VALID_PRECISION", "20")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: "PROXIMITY_DISTANCE".into() });
        assert!(err.to_string().contains("PROXIMITY_DISTANCE"));

        let err = AppConfig::from_lookup(lookup(&[("PROXIMITY_DISTANCE", "500"), ("SECURED_AREAS", "[]")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: "VALID_PRECISION".into() });
    }

    #[test]
    fn malformed_values_are_rejected() {
        for (key, value) in [
            ("PROXIMITY_DISTANCE", "far"),
            ("PROXIMITY_DISTANCE", "-5"),
            ("SECURED_AREAS", "{not json"),
            ("VALID_PRECISION", "\"high\""),
        ] {
            let mut pairs = vec![("PROXIMITY_DISTANCE", "500"), ("SECURED_AREAS", "[]"), ("VALID_PRECISION", "20")];
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));
            match AppConfig::from_lookup(lookup(&pairs)) {
                Err(ConfigError::Invalid { key: k, .. }) => assert_eq!(k, key),
                other => panic!("{key}={value} gave {other:?}"),
            }
        }
    }

    #[test]
    fn custom_location_column_and_override() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PROXIMITY_DISTANCE", "500"),
            ("SECURED_AREAS", "[]"),
            ("VALID_PRECISION", "20"),
            ("LOCATION_COLUMN", "coords"),
        ]))
        .unwrap();
        assert_eq!(config.location_column, "coords");
        let config = config.with_proximity_distance(75.0).unwrap();
        assert_eq!(config.proximity_distance, 75.0);
        assert!(config.with_proximity_distance(f64::NAN).is_err());
    }
}

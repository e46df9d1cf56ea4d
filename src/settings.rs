//! Runtime settings
//!
//! Board orientation and bus configuration, loaded from an optional JSON
//! file. Calibration bias is deliberately not part of this: it lives in
//! memory only and is redone every session.

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_COUNT;

/// How the sensor is mounted relative to the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Orientation {
    /// Exchange X and Y before anything else
    pub swap_axes: bool,
    pub invert_x: bool,
    pub invert_y: bool,
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sensor mounting correction
    pub orientation: Orientation,
    /// I2C character device the magnetometer hangs off
    pub i2c_bus: String,
    /// Levels offered on the level-select grid
    pub level_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            i2c_bus: "/dev/i2c-2".to_string(),
            level_count: LEVEL_COUNT,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a file, falling back to defaults if it is missing or malformed
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{ "orientation": { "invert_y": true } }"#).unwrap();
        assert!(s.orientation.invert_y);
        assert!(!s.orientation.swap_axes);
        assert_eq!(s.i2c_bus, "/dev/i2c-2");
        assert_eq!(s.level_count, LEVEL_COUNT);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ orientation: ").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let s = Settings::load(std::path::Path::new("/nonexistent/tilt-golf.json"));
        assert_eq!(s, Settings::default());
    }
}

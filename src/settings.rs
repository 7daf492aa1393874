//! Duel settings
//!
//! Loaded from JSON when the host application provides a file, otherwise the
//! stock duel is used.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::FPS;
use crate::error::ConfigError;
use crate::sim::body::MapBounds;
use crate::sim::ship::{Archetype, ShipProfile};

/// Where and how a player's ship enters the duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipPlacement {
    pub archetype: Archetype,
    pub pos: DVec2,
    /// Degrees clockwise from straight up
    pub heading: f64,
    /// Replaces the archetype's stock stat table
    #[serde(default)]
    pub profile: Option<ShipProfile>,
}

impl ShipPlacement {
    pub fn new(archetype: Archetype, pos: DVec2, heading: f64) -> Self {
        Self {
            archetype,
            pos,
            heading,
            profile: None,
        }
    }

    /// Stat table to build the ship from
    pub fn resolved_profile(&self) -> ShipProfile {
        self.profile
            .clone()
            .unwrap_or_else(|| self.archetype.profile())
    }
}

/// Duel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSettings {
    /// Playable map size
    #[serde(default)]
    pub map: MapBounds,
    /// Frames per second the host drives `tick` at
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Follow the ships with zoom; off keeps the whole map in view
    #[serde(default = "default_true")]
    pub dynamic_camera: bool,
    pub player_one: ShipPlacement,
    pub player_two: ShipPlacement,
}

fn default_fps() -> f64 {
    FPS
}

fn default_true() -> bool {
    true
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            map: MapBounds::default(),
            fps: FPS,
            dynamic_camera: true,
            player_one: ShipPlacement::new(Archetype::BlueWing, DVec2::new(300.0, 100.0), 135.0),
            player_two: ShipPlacement::new(Archetype::Triple, DVec2::new(450.0, 200.0), -45.0),
        }
    }
}

impl CombatSettings {
    /// Milliseconds per frame at the configured rate
    pub fn frame_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_duel() {
        let settings = CombatSettings::default();
        assert_eq!(settings.map.width, 800.0);
        assert_eq!(settings.player_one.archetype, Archetype::BlueWing);
        assert_eq!(settings.player_two.pos, DVec2::new(450.0, 200.0));
        assert!((settings.frame_ms() - 15.625).abs() < 1e-9);
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let json = r#"{
            "player_one": { "archetype": "Triple", "pos": [100.0, 100.0], "heading": 0.0 },
            "player_two": { "archetype": "BlueWing", "pos": [700.0, 500.0], "heading": 180.0 }
        }"#;
        let settings = CombatSettings::from_json(json).unwrap();
        assert!(settings.dynamic_camera);
        assert_eq!(settings.fps, FPS);
        assert_eq!(settings.map, MapBounds::default());
        assert_eq!(settings.player_one.resolved_profile().primary.cost, 5.0);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            CombatSettings::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_mismatched_hull_is_parse_error() {
        let mut settings = CombatSettings::default();
        settings.player_one.profile = Some(Archetype::BlueWing.profile());
        let json = settings.to_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["player_one"]["profile"]["hull"]["bits"] = serde_json::json!([]);

        let err = CombatSettings::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("invalid settings JSON"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CombatSettings::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

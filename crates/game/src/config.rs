//! Game configuration loading.
//!
//! Every section is optional in the JSON file; missing fields take their
//! defaults. Values are checked once at load time so the simulation itself
//! never has to fail.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_physics::{CollisionConfig, GrappleConfig, MovementConfig};

/// Errors raised while loading a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Fixed-timestep loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,

    /// Longest frame the loop will catch up on (seconds).
    pub max_frame_time: f32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_frame_time: 0.1,
        }
    }
}

impl LoopConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    #[serde(rename = "loop")]
    pub timestep: LoopConfig,

    /// Movement physics configuration.
    pub movement: MovementConfig,

    pub grapple: GrappleConfig,

    pub collision: CollisionConfig,

    /// Radians of view rotation per mouse count.
    pub mouse_sensitivity: f32,

    /// Falling below this height kills the player.
    pub kill_height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timestep: LoopConfig::default(),
            movement: MovementConfig::default(),
            grapple: GrappleConfig::default(),
            collision: CollisionConfig::default(),
            mouse_sensitivity: 0.002,
            kill_height: -512.0,
        }
    }
}

impl GameConfig {
    /// Defaults with the looser arcade movement.
    pub fn arcade() -> Self {
        Self {
            movement: MovementConfig::arcade(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check ranges the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timestep.tick_rate == 0 {
            return Err(ConfigError::invalid("loop.tick_rate", "must be positive"));
        }
        if !(self.timestep.max_frame_time >= self.timestep.delta_time()) {
            return Err(ConfigError::invalid(
                "loop.max_frame_time",
                format!("must be at least one tick ({}s)", self.timestep.delta_time()),
            ));
        }

        let overclip = self.collision.overclip;
        if !(overclip > 0.0 && overclip <= 1.0) {
            return Err(ConfigError::invalid("collision.overclip", format!("{overclip} not in (0, 1]")));
        }
        if !(self.collision.velocity_overbounce >= 1.0) {
            return Err(ConfigError::invalid("collision.velocity_overbounce", "must be at least 1"));
        }
        if !(self.movement.ground_overbounce >= 1.0) {
            return Err(ConfigError::invalid("movement.ground_overbounce", "must be at least 1"));
        }

        let positive = [
            ("movement.speed", self.movement.speed),
            ("movement.stop_speed", self.movement.stop_speed),
            ("movement.ground_probe", self.movement.ground_probe),
            ("movement.jump_threshold", self.movement.jump_threshold),
            ("grapple.tip_speed", self.grapple.tip_speed),
            ("grapple.pull_speed", self.grapple.pull_speed),
            ("grapple.resource_max", self.grapple.resource_max),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(field, format!("{value} must be positive")));
            }
        }

        let non_negative = [
            ("movement.gravity", self.movement.gravity),
            ("movement.friction", self.movement.friction),
            ("movement.ground_acceleration", self.movement.ground_acceleration),
            ("movement.air_acceleration", self.movement.air_acceleration),
            ("grapple.resource_drain", self.grapple.resource_drain),
            ("grapple.resource_regen", self.grapple.resource_regen),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(field, format!("{value} must not be negative")));
            }
        }

        if !self.mouse_sensitivity.is_finite() {
            return Err(ConfigError::invalid("mouse_sensitivity", "must be finite"));
        }
        if !self.kill_height.is_finite() {
            return Err(ConfigError::invalid("kill_height", "must be finite"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.timestep.delta_time() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_arcade_preset_is_valid() {
        let config = GameConfig::arcade();
        assert!(config.validate().is_ok());
        assert_eq!(config.movement, MovementConfig::arcade());
        assert_eq!(config.timestep, LoopConfig::default());
        assert_ne!(config.movement, GameConfig::default().movement);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(
            r#"{
                "loop": { "tick_rate": 120 },
                "movement": { "gravity": 400.0 },
                "kill_height": -1000.0
            }"#,
        )
        .unwrap();

        assert_eq!(config.timestep.tick_rate, 120);
        assert_eq!(config.timestep.max_frame_time, 0.1);
        assert_eq!(config.movement.gravity, 400.0);
        assert_eq!(config.movement.speed, 320.0);
        assert_eq!(config.grapple, GrappleConfig::default());
        assert_eq!(config.kill_height, -1000.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GameConfig::from_json_str(r#"{ "loop": { "tick_rate": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "loop.tick_rate", .. }), "{err}");

        let err = GameConfig::from_json_str(r#"{ "collision": { "overclip": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "collision.overclip", .. }), "{err}");

        let err = GameConfig::from_json_str(r#"{ "grapple": { "resource_max": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "grapple.resource_max", .. }), "{err}");

        let err = GameConfig::from_json_str(r#"{ "loop": { "max_frame_time": 0.001 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "loop.max_frame_time", .. }), "{err}");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = GameConfig::from_json_str("{ movement: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::load("/nonexistent/tether/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

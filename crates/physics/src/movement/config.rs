//! Movement configuration constants.
//!
//! All movement parameters are grouped here for easy tuning.
//! Quake 3 values in Quake units (1 unit ~ 1 inch), seconds for time.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Configuration for player movement physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Speeds
    // ========================================================================
    /// Wish speed at full input deflection (units/second).
    pub speed: f32,

    /// Vertical velocity set by a jump (units/second).
    pub jump_velocity: f32,

    // ========================================================================
    // Physics
    // ========================================================================
    /// Gravity acceleration while airborne (units/second²).
    pub gravity: f32,

    /// Ground friction coefficient.
    pub friction: f32,

    /// Speeds below this are treated as this for friction, so slow movement
    /// still stops quickly (units/second).
    pub stop_speed: f32,

    /// Ground acceleration factor.
    pub ground_acceleration: f32,

    /// Air acceleration factor. Kept low: air control is weak.
    pub air_acceleration: f32,

    // ========================================================================
    // Ground
    // ========================================================================
    /// Overbounce when clipping against the ground plane.
    pub ground_overbounce: f32,

    /// How far below the player's box the ground probe reaches (units).
    pub ground_probe: f32,

    /// Minimum `up` command value that counts as holding jump.
    pub jump_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 320.0,
            jump_velocity: 270.0,

            gravity: 800.0,
            friction: 6.0,
            stop_speed: 100.0,
            ground_acceleration: 10.0,
            air_acceleration: 1.0,

            ground_overbounce: 1.001,
            ground_probe: 0.25,
            jump_threshold: 10.0 / 127.0,
        }
    }
}

impl MovementConfig {
    /// Looser air control and a lower arc, for practice maps.
    pub fn arcade() -> Self {
        Self {
            gravity: 600.0,
            air_acceleration: 2.5,
            ..Default::default()
        }
    }
}

/// Configuration for the grapple tether.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrappleConfig {
    /// Speed of the flying tether tip (units/second).
    pub tip_speed: f32,

    /// Pull speed beyond the slow-down radius (units/second).
    pub pull_speed: f32,

    /// Inside this distance, pull speed is `pull_gain * distance`.
    pub slowdown_radius: f32,

    pub pull_gain: f32,

    /// The pull target sits this far back from the anchor along the view.
    pub anchor_backoff: f32,

    /// Tether start relative to the player, in view space.
    pub tip_offset: Vec3,

    // ========================================================================
    // Resource
    // ========================================================================
    pub resource_max: f32,

    /// Drain per second while the tether is out.
    pub resource_drain: f32,

    /// Regeneration per second while idle.
    pub resource_regen: f32,
}

impl Default for GrappleConfig {
    fn default() -> Self {
        Self {
            tip_speed: 1024.0,
            pull_speed: 800.0,
            slowdown_radius: 100.0,
            pull_gain: 10.0,
            anchor_backoff: 16.0,
            tip_offset: Vec3::new(8.0, -8.0, 0.0),

            resource_max: 100.0,
            resource_drain: 25.0,
            resource_regen: 40.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MovementConfig::default();
        assert!(config.speed > 0.0);
        assert!(config.gravity > 0.0);
        assert!(config.ground_acceleration > config.air_acceleration);
        assert!(config.ground_overbounce > 1.0);
    }

    #[test]
    fn test_arcade_keeps_ground_feel() {
        let arcade = MovementConfig::arcade();
        let default = MovementConfig::default();
        assert!(arcade.air_acceleration > default.air_acceleration);
        assert_eq!(arcade.friction, default.friction);
        assert_eq!(arcade.speed, default.speed);
    }

    #[test]
    fn test_grapple_resource_recovers_faster_than_it_drains() {
        let config = GrappleConfig::default();
        assert!(config.resource_regen > config.resource_drain);
        assert!(config.tip_speed > config.pull_speed);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GrappleConfig = serde_json::from_str(r#"{ "tip_speed": 2048.0 }"#).unwrap();
        assert_eq!(config.tip_speed, 2048.0);
        assert_eq!(config.pull_speed, 800.0);
    }
}

//! # Configuration
//!
//! World and actor dimensions plus movement tuning, loaded from JSON.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it changes:
//!
//! ```json
//! { "ground_width": 20.5, "walk_velocity": 6.0 }
//! ```

use std::path::{Path, PathBuf};

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// Tunable parameters of the sandbox.
///
/// The grid is a uniform cubic lattice of `unit_size` cells. The playable
/// ground spans `[-ground_width, ground_width]` on both horizontal axes and
/// lies at `z = 0`; a cube resting on the ground has its center at
/// `z = unit_size / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Edge length of one lattice cell.
    pub unit_size: f32,
    /// Half the side length of the playable ground square.
    pub ground_width: f32,
    /// Distance from the eye down to the feet. Should not exceed two units.
    pub body_height: f32,
    /// Horizontal half extent of the actor, also used as head room above the eye.
    pub body_clash: f32,
    /// Walking and flying speed in units per second.
    pub walk_velocity: f32,
    /// Degrees of rotation per unit of mouse delta.
    pub mouse_sensitivity: f32,
    /// Highest pitch in degrees.
    pub max_look_up: f32,
    /// Lowest pitch in degrees.
    pub max_look_down: f32,
    /// Seconds a jump keeps rising before the actor starts to fall.
    pub max_fly_time: f32,
    /// Maximum number of static cubes in a scene.
    pub max_cubes: usize,
    /// Maximum number of live cubes in a scene.
    pub max_live_cubes: usize,
    /// Directory holding the `data/` folder with scene files.
    pub resource_dir: PathBuf,
    /// Scene loaded at start up.
    pub scene_name: String,
    /// Live cube scene loaded at start up.
    pub live_scene_name: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            unit_size: 1.0,
            ground_width: 15.5,
            body_height: 1.5,
            body_clash: 0.1,
            walk_velocity: 4.0,
            mouse_sensitivity: 0.05,
            max_look_up: 30.0,
            max_look_down: -85.0,
            max_fly_time: 1.0,
            max_cubes: 10_000,
            max_live_cubes: 200,
            resource_dir: PathBuf::from("resources"),
            scene_name: "cubes0".to_string(),
            live_scene_name: "live".to_string(),
        }
    }
}

impl SandboxConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// Returns `ConfigRead` when the file cannot be read, `ConfigParse` when it
    /// is not valid JSON and `InvalidConfig` when the values are unusable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SandboxError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, SandboxError> {
        let config: SandboxConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the dimensions describe a usable world.
    pub fn validate(&self) -> Result<(), SandboxError> {
        let invalid = |reason: &str| {
            Err(SandboxError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if !(self.unit_size > 0.0) {
            return invalid("unit_size must be positive");
        }
        if !(self.ground_width > 0.0) {
            return invalid("ground_width must be positive");
        }
        if !(self.body_height > 0.0) {
            return invalid("body_height must be positive");
        }
        if !(self.body_clash > 0.0 && self.body_clash < self.half_unit()) {
            return invalid("body_clash must lie between zero and half a unit");
        }
        Ok(())
    }

    /// Half the edge length of a cell.
    pub fn half_unit(&self) -> f32 {
        self.unit_size / 2.0
    }

    /// World position of the center of cell `(0, 0, 0)`.
    pub fn origin_offset(&self) -> Vector3<f32> {
        Vector3::new(0.0, 0.0, self.half_unit())
    }

    /// Where the actor's eye starts: at the origin, standing on the ground.
    pub fn initial_eye(&self) -> Point3<f32> {
        Point3::new(0.0, 0.0, self.body_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SandboxConfig::from_json_str(r#"{ "walk_velocity": 6.0 }"#).unwrap();
        assert_eq!(config.walk_velocity, 6.0);
        assert_eq!(config.unit_size, 1.0);
        assert_eq!(config.scene_name, "cubes0");
    }

    #[test]
    fn rejects_oversized_clash_radius() {
        let err = SandboxConfig::from_json_str(r#"{ "body_clash": 0.5 }"#).unwrap_err();
        assert!(matches!(err, SandboxError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = SandboxConfig::from_json_str("{ unit_size: }").unwrap_err();
        assert!(matches!(err, SandboxError::ConfigParse(_)));
    }

    #[test]
    fn derived_values() {
        let config = SandboxConfig::default();
        assert_eq!(config.origin_offset(), Vector3::new(0.0, 0.0, 0.5));
        assert_eq!(config.initial_eye(), Point3::new(0.0, 0.0, 1.5));
    }
}

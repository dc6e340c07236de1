//! Scene configuration
//!
//! A scene is described by a JSON file: its gravity sources, the character
//! tuning and spawn, and the sandbox geometry. Every struct uses
//! `#[serde(default)]`, so a file only needs the values it changes.
//!
//! # Example
//!
//! ```json
//! {
//!   "fixed_step": 0.02,
//!   "gravity": [
//!     { "id": 1, "source": { "kind": "sphere", "outer_radius": 12.0, "outer_falloff_radius": 20.0 } }
//!   ],
//!   "locomotion": { "jump_height": 3.0, "max_air_jumps": 1 },
//!   "character": { "spawn": [0.0, 13.0, 0.0] }
//! }
//! ```

use std::fmt;
use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::bodies::FloatingConfig;
use crate::gravity::{GravitySource, SourceId, UniformGravity};
use crate::locomotion::LocomotionConfig;
use crate::physics::Layer;
use crate::sandbox::{Motion, SandboxBody};
use crate::zones::{AccelerationZone, ZoneVolume};

/// Default fixed step (50 Hz)
pub const DEFAULT_FIXED_STEP: f32 = 0.02;

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Errors that can occur while loading or saving a scene file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

// ============================================================================
// SCENE SECTIONS
// ============================================================================

/// A gravity source with the id the scene registers it under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub id: SourceId,
    pub source: GravitySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub spawn: Vec3,
    /// Collision sphere radius (m)
    pub radius: f32,
    /// Mass (kg), compared against platform masses
    pub mass: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(0.0, 0.5, 0.0),
            radius: 0.5,
            mass: 1.0,
        }
    }
}

/// Kinematic box driven back and forth by a slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub half_extents: Vec3,
    pub from: Vec3,
    pub to: Vec3,
    /// Seconds per leg
    pub duration: f32,
    /// Reverse at each end instead of stopping
    pub ping_pong: bool,
    pub layer: Layer,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(1.5, 0.25, 1.5),
            from: Vec3::ZERO,
            to: Vec3::new(0.0, 0.0, 4.0),
            duration: 4.0,
            ping_pong: true,
            layer: Layer::DEFAULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingBodyConfig {
    pub position: Vec3,
    pub radius: f32,
    pub mass: f32,
    pub floating: FloatingConfig,
}

impl Default for FloatingBodyConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: 0.5,
            mass: 0.5,
            floating: FloatingConfig::default(),
        }
    }
}

// ============================================================================
// SCENE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Fixed simulation step (seconds)
    pub fixed_step: f32,
    pub gravity: Vec<SourceEntry>,
    pub locomotion: LocomotionConfig,
    pub character: CharacterConfig,
    pub bodies: Vec<SandboxBody>,
    pub platforms: Vec<PlatformConfig>,
    pub acceleration_zones: Vec<AccelerationZone>,
    pub detection_zones: Vec<ZoneVolume>,
    pub floating_bodies: Vec<FloatingBodyConfig>,
}

impl Default for SceneConfig {
    /// Flat test course: ground, a ramp, a climbing wall, a pool with a
    /// floating ball, a moving platform and a launch pad.
    fn default() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            gravity: vec![SourceEntry {
                id: SourceId(0),
                source: UniformGravity::default().into(),
            }],
            locomotion: LocomotionConfig::default(),
            character: CharacterConfig::default(),
            bodies: vec![
                SandboxBody::cuboid(Vec3::new(0.0, -0.5, 0.0), Vec3::new(30.0, 0.5, 30.0)),
                SandboxBody::cuboid(Vec3::new(8.0, 0.5, 0.0), Vec3::new(3.0, 0.25, 2.0))
                    .with_rotation(Quat::from_rotation_z(20.0_f32.to_radians())),
                SandboxBody::cuboid(Vec3::new(-8.0, 3.0, 0.0), Vec3::new(0.5, 3.0, 3.0))
                    .with_layer(Layer::CLIMB),
                SandboxBody::water(Vec3::new(0.0, 1.0, -10.0), Vec3::new(4.0, 1.5, 4.0)),
            ],
            platforms: vec![PlatformConfig {
                from: Vec3::new(10.0, 0.25, 10.0),
                to: Vec3::new(10.0, 0.25, 16.0),
                ..Default::default()
            }],
            acceleration_zones: vec![AccelerationZone::new(
                ZoneVolume::new(Vec3::new(-4.0, 0.25, 8.0), Vec3::new(1.0, 0.25, 1.0)),
                0.0,
                12.0,
            )],
            detection_zones: vec![ZoneVolume::new(Vec3::new(0.0, 1.0, -10.0), Vec3::new(4.0, 1.5, 4.0))],
            floating_bodies: vec![FloatingBodyConfig {
                position: Vec3::new(2.0, 3.0, -10.0),
                ..Default::default()
            }],
        }
    }
}

impl SceneConfig {
    /// Parse a scene from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a scene file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            sources = config.gravity.len(),
            bodies = config.bodies.len(),
            "scene loaded"
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "scene saved");
        Ok(())
    }

    /// Clamp every section into its valid range.
    pub fn validated(mut self) -> Self {
        if self.fixed_step.is_nan() || self.fixed_step <= 0.0 {
            tracing::warn!(fixed_step = self.fixed_step, "invalid fixed step, using default");
            self.fixed_step = DEFAULT_FIXED_STEP;
        }
        for entry in &mut self.gravity {
            entry.source = entry.source.validated();
        }
        self.locomotion = self.locomotion.validated();
        self.character.radius = self.character.radius.max(0.05);
        self.character.mass = self.character.mass.max(1e-3);
        for body in &mut self.bodies {
            body.rotation = body.rotation.normalize();
            if let Motion::Dynamic { mass } = &mut body.motion {
                *mass = mass.max(1e-3);
            }
        }
        for zone in &mut self.acceleration_zones {
            *zone = zone.validated();
        }
        for floating in &mut self.floating_bodies {
            floating.radius = floating.radius.max(0.05);
            floating.mass = floating.mass.max(1e-3);
            floating.floating = std::mem::take(&mut floating.floating).validated();
        }
        self
    }
}

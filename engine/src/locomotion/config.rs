//! Locomotion tuning
//!
//! All values are in SI units; angles are in degrees and converted to
//! dot-product thresholds against the up axis once, when the controller is
//! built.

use serde::{Deserialize, Serialize};

use crate::physics::{Layer, LayerMask};

/// Tuning values of a [`LocomotionController`](super::LocomotionController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    // Speeds (m/s)
    pub max_speed: f32,
    pub max_climb_speed: f32,
    pub max_swim_speed: f32,

    // Accelerations (m/s^2)
    pub max_acceleration: f32,
    pub max_air_acceleration: f32,
    pub max_climb_acceleration: f32,
    pub max_swim_acceleration: f32,

    /// Jump apex height above the take-off point (m)
    pub jump_height: f32,
    /// Extra jumps allowed while airborne (0..=5)
    pub max_air_jumps: u32,

    /// Steepest walkable slope (degrees, 0..=90)
    pub max_ground_angle: f32,
    /// Steepest walkable slope on stairs layers (degrees, 0..=90)
    pub max_stairs_angle: f32,
    /// Steepest climbable surface, overhangs included (degrees, 90..=180)
    pub max_climb_angle: f32,

    /// Snapping is skipped above this speed (m/s)
    pub max_snap_speed: f32,
    /// Length of the snap probe along -up (m)
    pub probe_distance: f32,

    pub probe_mask: LayerMask,
    pub stairs_mask: LayerMask,
    pub climb_mask: LayerMask,
    pub water_mask: LayerMask,

    /// Height above the body center where the submergence probe starts (m)
    pub submergence_offset: f32,
    /// Probe depth that counts as fully submerged (m, >= 0.1)
    pub submergence_range: f32,
    /// 1.0 cancels gravity when fully submerged
    pub buoyancy: f32,
    /// Submergence at which the character starts swimming (0.01..=1)
    pub swim_threshold: f32,
    /// Velocity damping per second at full submergence (0..=10)
    pub water_drag: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            max_climb_speed: 4.0,
            max_swim_speed: 5.0,
            max_acceleration: 10.0,
            max_air_acceleration: 1.0,
            max_climb_acceleration: 40.0,
            max_swim_acceleration: 5.0,
            jump_height: 2.0,
            max_air_jumps: 0,
            max_ground_angle: 25.0,
            max_stairs_angle: 50.0,
            max_climb_angle: 140.0,
            max_snap_speed: 100.0,
            probe_distance: 1.0,
            probe_mask: LayerMask::from_layers(&[Layer::DEFAULT, Layer::STAIRS, Layer::CLIMB]),
            stairs_mask: Layer::STAIRS.mask(),
            climb_mask: Layer::CLIMB.mask(),
            water_mask: Layer::WATER.mask(),
            submergence_offset: 0.5,
            submergence_range: 1.0,
            buoyancy: 1.0,
            swim_threshold: 0.5,
            water_drag: 1.0,
        }
    }
}

impl LocomotionConfig {
    /// Copy with every value clamped into its valid range.
    pub fn validated(mut self) -> Self {
        self.max_speed = self.max_speed.max(0.0);
        self.max_climb_speed = self.max_climb_speed.max(0.0);
        self.max_swim_speed = self.max_swim_speed.max(0.0);
        self.max_acceleration = self.max_acceleration.max(0.0);
        self.max_air_acceleration = self.max_air_acceleration.max(0.0);
        self.max_climb_acceleration = self.max_climb_acceleration.max(0.0);
        self.max_swim_acceleration = self.max_swim_acceleration.max(0.0);
        self.jump_height = self.jump_height.max(0.0);
        self.max_air_jumps = self.max_air_jumps.min(5);
        self.max_ground_angle = self.max_ground_angle.clamp(0.0, 90.0);
        self.max_stairs_angle = self.max_stairs_angle.clamp(0.0, 90.0);
        self.max_climb_angle = self.max_climb_angle.clamp(90.0, 180.0);
        self.max_snap_speed = self.max_snap_speed.max(0.0);
        self.probe_distance = self.probe_distance.max(0.0);
        self.submergence_range = self.submergence_range.max(0.1);
        self.buoyancy = self.buoyancy.max(0.0);
        self.swim_threshold = self.swim_threshold.clamp(0.01, 1.0);
        self.water_drag = self.water_drag.clamp(0.0, 10.0);
        self
    }

    /// Dot-product thresholds derived from the configured angles.
    pub fn thresholds(&self) -> ContactThresholds {
        ContactThresholds {
            min_ground_dot: self.max_ground_angle.to_radians().cos(),
            min_stairs_dot: self.max_stairs_angle.to_radians().cos(),
            min_climb_dot: self.max_climb_angle.to_radians().cos(),
            stairs_mask: self.stairs_mask,
        }
    }
}

/// Minimum `up · normal` values for each contact category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactThresholds {
    pub min_ground_dot: f32,
    pub min_stairs_dot: f32,
    pub min_climb_dot: f32,
    pub stairs_mask: LayerMask,
}

impl ContactThresholds {
    /// Ground threshold for a surface on `layer`.
    #[inline]
    pub fn min_dot(&self, layer: Layer) -> f32 {
        if self.stairs_mask.contains(layer) {
            self.min_stairs_dot
        } else {
            self.min_ground_dot
        }
    }
}

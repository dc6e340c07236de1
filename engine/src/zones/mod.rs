//! Trigger zones and platform drivers
//!
//! - [`acceleration`] - Launch pads that ramp local-up velocity
//! - [`detection`] - First-enter / last-exit occupancy events
//! - [`slider`] - Timed 0..1 driver and position interpolation

pub mod acceleration;
pub mod detection;
pub mod slider;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::physics::OrientedBox;

pub use acceleration::AccelerationZone;
pub use detection::{DetectionZone, ZoneEvent};
pub use slider::{AutomaticSlider, PositionInterpolator};

/// Oriented box trigger volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneVolume {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl Default for ZoneVolume {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            half_extents: Vec3::splat(0.5),
        }
    }
}

impl ZoneVolume {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
            ..Default::default()
        }
    }

    pub fn as_box(&self) -> OrientedBox {
        OrientedBox::new(self.center, self.rotation.normalize(), self.half_extents.abs())
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.as_box().contains(point)
    }

    /// Whether a sphere touches the volume.
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.as_box().sphere_contact(center, radius, 0.0).is_some()
    }
}

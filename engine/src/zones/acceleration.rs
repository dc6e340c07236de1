//! Acceleration Zones
//!
//! Push bodies along the zone's local up axis until they reach `speed`.
//! With `acceleration` set to zero the speed is applied instantly (a launch
//! pad); otherwise velocity ramps toward it by `acceleration * dt` per step.
//! Bodies already moving faster along the axis are left alone.
//!
//! A character launched by a zone has its next ground snap suppressed, so
//! the controller does not pull it straight back down.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ZoneVolume;
use crate::bodies::DynamicBody;
use crate::locomotion::LocomotionController;
use crate::physics::CharacterBody;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationZone {
    pub volume: ZoneVolume,
    /// m/s^2, 0 for an instant launch
    pub acceleration: f32,
    /// Target speed along the zone's up axis (m/s)
    pub speed: f32,
}

impl Default for AccelerationZone {
    fn default() -> Self {
        Self {
            volume: ZoneVolume::default(),
            acceleration: 10.0,
            speed: 10.0,
        }
    }
}

impl AccelerationZone {
    pub fn new(volume: ZoneVolume, acceleration: f32, speed: f32) -> Self {
        Self {
            volume,
            acceleration,
            speed,
        }
        .validated()
    }

    pub fn validated(mut self) -> Self {
        self.acceleration = self.acceleration.max(0.0);
        self.speed = self.speed.max(0.0);
        self
    }

    /// New velocity after one step in the zone, `None` if already fast enough.
    pub fn accelerate(&self, velocity: Vec3, dt: f32) -> Option<Vec3> {
        let rotation = self.volume.rotation.normalize();
        let mut local = rotation.inverse() * velocity;
        if local.y >= self.speed {
            return None;
        }
        local.y = if self.acceleration > 0.0 {
            move_towards(local.y, self.speed, self.acceleration * dt)
        } else {
            self.speed
        };
        Some(rotation * local)
    }

    /// Accelerate the character and suppress its next snap.
    pub fn apply_to_character(
        &self,
        dt: f32,
        body: &mut CharacterBody,
        controller: &mut LocomotionController,
    ) -> bool {
        let Some(velocity) = self.accelerate(body.velocity, dt) else {
            return false;
        };
        body.velocity = velocity;
        controller.prevent_snap_to_ground();
        tracing::trace!(speed = velocity.length(), "acceleration zone pushed character");
        true
    }

    pub fn apply_to_body(&self, dt: f32, body: &mut DynamicBody) -> bool {
        match self.accelerate(body.linear_velocity, dt) {
            Some(velocity) => {
                body.linear_velocity = velocity;
                true
            }
            None => false,
        }
    }
}

#[inline]
fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

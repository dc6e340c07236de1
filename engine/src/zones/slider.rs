//! Platform drivers
//!
//! An [`AutomaticSlider`] advances a value from 0 to 1 over `duration`
//! seconds of fixed steps and then stops. A [`PositionInterpolator`] maps
//! that value to a kinematic body position.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Shortest allowed slider duration (seconds)
pub const MIN_DURATION: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomaticSlider {
    duration: f32,
    value: f32,
    enabled: bool,
}

impl Default for AutomaticSlider {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AutomaticSlider {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(MIN_DURATION),
            value: 0.0,
            enabled: true,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start over from 0.
    pub fn restart(&mut self) {
        self.value = 0.0;
        self.enabled = true;
    }

    /// Advance one step. Returns the new value, or `None` once finished.
    pub fn step(&mut self, dt: f32) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        self.value += dt / self.duration;
        if self.value >= 1.0 {
            self.value = 1.0;
            self.enabled = false;
            tracing::debug!(duration = self.duration, "slider finished");
        }
        Some(self.value)
    }
}

/// Unclamped linear interpolation between two positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionInterpolator {
    pub from: Vec3,
    pub to: Vec3,
}

impl PositionInterpolator {
    pub fn new(from: Vec3, to: Vec3) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn interpolate(&self, t: f32) -> Vec3 {
        self.from + (self.to - self.from) * t
    }
}

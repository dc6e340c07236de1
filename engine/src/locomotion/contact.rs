//! Per-step contact accumulation
//!
//! Contacts are classified against the current up axis:
//!
//! - **ground**: `up · n >= min_dot(layer)`
//! - **steep**: not ground, but not facing down (`up · n > -0.01`)
//! - **climb**: not ground, climb requested, layer climbable and
//!   `up · n >= min_climb_dot`
//!
//! A steep contact can also count as a climb contact. Normals are summed
//! per category; sums with more than one contributor are renormalized by the
//! controller before use.

use glam::Vec3;

use super::config::ContactThresholds;
use crate::physics::{BodyId, Contact, LayerMask};

/// `up · n` above which a non-ground contact still counts as steep
const STEEP_MIN_DOT: f32 = -0.01;

/// Contact counts and summed normals for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactAccumulator {
    pub ground_count: u32,
    pub ground_normal: Vec3,
    pub steep_count: u32,
    pub steep_normal: Vec3,
    pub climb_count: u32,
    pub climb_normal: Vec3,
    /// Most recent single climb normal, kept across steps
    pub last_climb_normal: Vec3,
    /// Body the character is resting on or holding; `None` for static geometry
    pub connected_body: Option<BodyId>,
}

impl Default for ContactAccumulator {
    fn default() -> Self {
        Self {
            ground_count: 0,
            ground_normal: Vec3::ZERO,
            steep_count: 0,
            steep_normal: Vec3::ZERO,
            climb_count: 0,
            climb_normal: Vec3::ZERO,
            last_climb_normal: Vec3::ZERO,
            connected_body: None,
        }
    }
}

impl ContactAccumulator {
    /// Classify one contact and add it to the matching categories.
    pub fn accumulate(
        &mut self,
        contact: &Contact,
        up_axis: Vec3,
        thresholds: &ContactThresholds,
        climb_mask: LayerMask,
        desires_climbing: bool,
    ) {
        let normal = contact.normal;
        let up_dot = up_axis.dot(normal);

        if up_dot >= thresholds.min_dot(contact.layer) {
            self.ground_count += 1;
            self.ground_normal += normal;
            self.connected_body = contact.body;
            return;
        }

        if up_dot > STEEP_MIN_DOT {
            self.steep_count += 1;
            self.steep_normal += normal;
            if self.ground_count == 0 {
                self.connected_body = contact.body;
            }
        }
        if desires_climbing && up_dot >= thresholds.min_climb_dot && climb_mask.contains(contact.layer) {
            self.climb_count += 1;
            self.climb_normal += normal;
            self.last_climb_normal = normal;
            self.connected_body = contact.body;
        }
    }

    #[inline]
    pub fn on_ground(&self) -> bool {
        self.ground_count > 0
    }

    #[inline]
    pub fn on_steep(&self) -> bool {
        self.steep_count > 0
    }

    /// Zero the per-step accumulators. `last_climb_normal` survives.
    pub fn clear(&mut self) {
        *self = Self {
            last_climb_normal: self.last_climb_normal,
            ..Self::default()
        };
    }
}

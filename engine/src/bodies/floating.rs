//! Floating Bodies
//!
//! Passive rigid bodies that take their gravity from the [`GravityField`]
//! instead of a global constant, and float in water.
//!
//! Buoyancy is sampled at one or more offsets in body space. Each offset
//! carries an equal share of the drag and buoyancy, and its buoyant
//! acceleration is applied at the offset's world point, so a body with
//! several offsets rights itself.
//!
//! # Physics Model
//!
//! Per fixed step, for every submerged offset `i` out of `n`:
//!
//! - velocity damping: `max(0, 1 - water_drag * dt / n * submergence[i])`
//! - buoyancy: `gravity * (-buoyancy / n * submergence[i])` at the offset point
//!
//! followed by the full gravity acceleration at the center of mass.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::gravity::GravityField;
use crate::physics::{Layer, LayerMask, PhysicsWorld};

/// Velocity below which (squared) a body counts as resting
const REST_SPEED_SQUARED: f32 = 0.0001;

/// Seconds of rest before a floating body stops simulating itself
const FLOAT_DELAY: f32 = 1.0;

/// Probe radius for the safe-floating overlap check
const SAFE_FLOATING_RADIUS: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingConfig {
    /// Stop applying forces after a second at rest
    pub float_to_sleep: bool,
    pub submergence_offset: f32,
    /// Probe depth that counts as fully submerged (>= 0.1)
    pub submergence_range: f32,
    pub buoyancy: f32,
    /// Body-space sample points; their count divides drag and buoyancy
    pub buoyancy_offsets: Vec<Vec3>,
    /// Velocity damping per second at full submergence (0..=10)
    pub water_drag: f32,
    pub water_mask: LayerMask,
    /// Only treat a probe miss as submerged if the probe point overlaps water
    pub safe_floating: bool,
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            float_to_sleep: false,
            submergence_offset: 0.5,
            submergence_range: 1.0,
            buoyancy: 1.0,
            buoyancy_offsets: vec![Vec3::ZERO],
            water_drag: 1.0,
            water_mask: Layer::WATER.mask(),
            safe_floating: false,
        }
    }
}

impl FloatingConfig {
    pub fn validated(mut self) -> Self {
        self.submergence_range = self.submergence_range.max(0.1);
        self.buoyancy = self.buoyancy.max(0.0);
        self.water_drag = self.water_drag.clamp(0.0, 10.0);
        if self.buoyancy_offsets.is_empty() {
            self.buoyancy_offsets.push(Vec3::ZERO);
        }
        self
    }
}

/// Rigid body state integrated by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Set by the solver when the body went to sleep
    pub sleeping: bool,
}

impl DynamicBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            sleeping: false,
        }
    }

    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Acceleration applied at a world point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointAcceleration {
    pub point: Vec3,
    pub acceleration: Vec3,
}

/// Accelerations a floating body requested for one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatingStep {
    /// Applied at the center of mass
    pub gravity: Vec3,
    pub buoyancy: Vec<PointAcceleration>,
}

impl FloatingStep {
    /// Sum of every acceleration.
    pub fn linear_acceleration(&self) -> Vec3 {
        self.buoyancy
            .iter()
            .fold(self.gravity, |sum, force| sum + force.acceleration)
    }

    /// Angular acceleration about `center`, treating inertia as unit.
    pub fn angular_acceleration(&self, center: Vec3) -> Vec3 {
        self.buoyancy
            .iter()
            .fold(Vec3::ZERO, |sum, force| {
                sum + (force.point - center).cross(force.acceleration)
            })
    }
}

/// A gravity-field consumer that floats.
#[derive(Debug, Clone)]
pub struct FloatingBody {
    config: FloatingConfig,
    submergence: Vec<f32>,
    float_delay: f32,
    gravity: Vec3,
}

impl FloatingBody {
    pub fn new(config: FloatingConfig) -> Self {
        let config = config.validated();
        Self {
            submergence: vec![0.0; config.buoyancy_offsets.len()],
            config,
            float_delay: 0.0,
            gravity: Vec3::ZERO,
        }
    }

    pub fn config(&self) -> &FloatingConfig {
        &self.config
    }

    /// Gravity sampled on the last simulated step.
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn submergence(&self) -> &[f32] {
        &self.submergence
    }

    /// Run one fixed step: damp `body` and return the accelerations to apply.
    ///
    /// Returns `None` while the body is asleep or floating at rest.
    pub fn step(&mut self, dt: f32, field: &GravityField, body: &mut DynamicBody) -> Option<FloatingStep> {
        if self.config.float_to_sleep {
            if body.sleeping {
                self.float_delay = 0.0;
                return None;
            }
            if body.linear_velocity.length_squared() < REST_SPEED_SQUARED {
                self.float_delay += dt;
                if self.float_delay >= FLOAT_DELAY {
                    return None;
                }
            } else {
                self.float_delay = 0.0;
            }
        }

        self.gravity = field.gravity(body.position);

        let count = self.config.buoyancy_offsets.len() as f32;
        let drag_factor = self.config.water_drag * dt / count;
        let buoyancy_factor = -self.config.buoyancy / count;

        let mut step = FloatingStep {
            gravity: self.gravity,
            buoyancy: Vec::new(),
        };
        for (offset, submergence) in self
            .config
            .buoyancy_offsets
            .iter()
            .zip(self.submergence.iter_mut())
        {
            if *submergence <= 0.0 {
                continue;
            }
            let drag = (1.0 - drag_factor * *submergence).max(0.0);
            body.linear_velocity *= drag;
            body.angular_velocity *= drag;
            step.buoyancy.push(PointAcceleration {
                point: body.transform_point(*offset),
                acceleration: self.gravity * (buoyancy_factor * *submergence),
            });
            *submergence = 0.0;
        }
        Some(step)
    }

    /// Probe every buoyancy offset against water. Call while the body overlaps water.
    pub fn evaluate_submergence<W>(&mut self, world: &W, body: &DynamicBody)
    where
        W: PhysicsWorld + ?Sized,
    {
        if body.sleeping {
            return;
        }
        let down = self.gravity.normalize_or_zero();
        if down == Vec3::ZERO {
            return;
        }
        let lift = down * -self.config.submergence_offset;
        let range = self.config.submergence_range;

        for (offset, submergence) in self
            .config
            .buoyancy_offsets
            .iter()
            .zip(self.submergence.iter_mut())
        {
            let probe = lift + body.transform_point(*offset);
            match world.raycast(probe, down, range + 1.0, self.config.water_mask) {
                Some(hit) => *submergence = (1.0 - hit.distance / range).max(0.0),
                None => {
                    if !self.config.safe_floating
                        || world.check_sphere(probe, SAFE_FLOATING_RADIUS, self.config.water_mask)
                    {
                        *submergence = 1.0;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{SourceId, UniformGravity};
    use crate::physics::EmptyWorld;

    const DT: f32 = 0.02;

    fn earth() -> GravityField {
        let mut field = GravityField::new();
        field
            .register(SourceId(0), UniformGravity::default().into())
            .unwrap();
        field
    }

    #[test]
    fn test_dry_body_gets_full_gravity() {
        let mut floating = FloatingBody::new(FloatingConfig::default());
        let mut body = DynamicBody::new(Vec3::ZERO);
        let step = floating.step(DT, &earth(), &mut body).unwrap();
        assert_eq!(step.linear_acceleration(), Vec3::new(0.0, -9.81, 0.0));
        assert!(step.buoyancy.is_empty());
    }

    #[test]
    fn test_submerged_body_is_lifted_and_damped() {
        let mut floating = FloatingBody::new(FloatingConfig::default());
        let mut body = DynamicBody::new(Vec3::ZERO);
        body.linear_velocity = Vec3::new(1.0, 0.0, 0.0);
        // Establish gravity first so the probe has a direction
        floating.step(DT, &earth(), &mut body);
        // Nothing to hit: the probe origin is inside the water
        floating.evaluate_submergence(&EmptyWorld, &body);
        assert_eq!(floating.submergence(), &[1.0]);

        let before = body.linear_velocity;
        let step = floating.step(DT, &earth(), &mut body).unwrap();
        // Neutral buoyancy cancels gravity at full submergence
        assert!(step.linear_acceleration().length() < 1e-5);
        assert!(body.linear_velocity.x < before.x);
        assert_eq!(floating.submergence(), &[0.0]);
    }

    #[test]
    fn test_safe_floating_requires_overlap() {
        let config = FloatingConfig {
            safe_floating: true,
            ..Default::default()
        };
        let mut floating = FloatingBody::new(config);
        let mut body = DynamicBody::new(Vec3::ZERO);
        floating.step(DT, &earth(), &mut body);
        floating.evaluate_submergence(&EmptyWorld, &body);
        assert_eq!(floating.submergence(), &[0.0]);
    }

    #[test]
    fn test_multiple_offsets_share_buoyancy() {
        let config = FloatingConfig {
            buoyancy_offsets: vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
            ..Default::default()
        };
        let mut floating = FloatingBody::new(config);
        let mut body = DynamicBody::new(Vec3::ZERO);
        floating.step(DT, &earth(), &mut body);
        floating.evaluate_submergence(&EmptyWorld, &body);

        let step = floating.step(DT, &earth(), &mut body).unwrap();
        assert_eq!(step.buoyancy.len(), 2);
        for force in &step.buoyancy {
            assert!((force.acceleration - Vec3::new(0.0, 9.81 * 0.5, 0.0)).length() < 1e-5);
        }
        // Symmetric offsets produce no net torque
        assert!(step.angular_acceleration(body.position).length() < 1e-5);
    }

    #[test]
    fn test_float_to_sleep_after_one_second_at_rest() {
        let config = FloatingConfig {
            float_to_sleep: true,
            ..Default::default()
        };
        let mut floating = FloatingBody::new(config);
        let mut body = DynamicBody::new(Vec3::ZERO);
        let field = earth();

        let mut simulated = 0;
        for _ in 0..60 {
            if floating.step(DT, &field, &mut body).is_some() {
                simulated += 1;
            }
        }
        // Rest accumulates 0.02 s per step and stops at 1 s
        assert!(simulated >= 49 && simulated <= 50, "simulated {simulated} steps");

        body.linear_velocity = Vec3::new(0.0, 1.0, 0.0);
        assert!(floating.step(DT, &field, &mut body).is_some());

        body.sleeping = true;
        assert!(floating.step(DT, &field, &mut body).is_none());
    }

    #[test]
    fn test_empty_offsets_fall_back_to_center() {
        let config = FloatingConfig {
            buoyancy_offsets: Vec::new(),
            ..Default::default()
        }
        .validated();
        assert_eq!(config.buoyancy_offsets, vec![Vec3::ZERO]);
    }
}

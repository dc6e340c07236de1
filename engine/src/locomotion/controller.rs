//! Locomotion Controller
//!
//! Fixed-step state machine that turns gravity, contacts and player intent
//! into the character's velocity.
//!
//! # Step Pipeline
//!
//! Each call to [`LocomotionController::step`] runs, in order:
//!
//! 1. sample gravity and the up axis at the body position
//! 2. advance step counters and rebuild the input axes
//! 3. probe submergence for every water overlap
//! 4. classify the contact batch (ground / steep / climb)
//! 5. resolve support: climbing, grounded, snapped, steep, airborne
//! 6. follow the connected body
//! 7. apply water drag
//! 8. move velocity toward the desired velocity
//! 9. jump, if one was requested
//! 10. add the residual force (gravity, grip or buoyancy)
//! 11. write the velocity back and clear the per-step state
//!
//! Swimming is orthogonal to support: it selects the swim acceleration
//! profile, scales jumps and switches gravity to its buoyant form, but never
//! changes how contacts are classified.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut controller = LocomotionController::new(LocomotionConfig::default());
//!
//! // Each frame:
//! controller.apply_intent(&intent);
//!
//! // Each fixed step, after the physics collaborator filled `batch`:
//! let report = controller.step(FIXED_DT, &field, &world, &batch, &mut body);
//! ```

use glam::Vec3;

use super::config::{ContactThresholds, LocomotionConfig};
use super::connection::{Connection, ConnectionState};
use super::contact::ContactAccumulator;
use super::intent::{InputSpace, PlayerIntent};
use super::view::LocomotionView;
use crate::gravity::{DEFAULT_UP_AXIS, GravityField};
use crate::physics::{BodyId, CharacterBody, ContactBatch, PhysicsWorld};

/// Shortest step time accepted by [`LocomotionController::step`]
pub const MIN_STEP_TIME: f32 = 1e-4;

/// Fraction of the climb acceleration used to press into a climbed surface
const CLIMB_GRIP_FACTOR: f32 = 0.9;

/// Squared speed below which a grounded character counts as standing still
const STANDING_SPEED_SQUARED: f32 = 0.01;

/// How the character was supported during the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Support {
    /// No usable contact
    #[default]
    Airborne,
    /// Touching ground-like surfaces
    Grounded,
    /// Ground contact synthesized by the snap probe
    Snapped,
    /// Wedged between steep surfaces whose combined normal is ground-like
    Steep,
    /// Holding on to climbable surfaces
    Climbing,
}

impl Support {
    /// Anything but airborne.
    #[inline]
    pub fn is_supported(self) -> bool {
        self != Support::Airborne
    }

    pub fn as_u32(self) -> u32 {
        match self {
            Support::Airborne => 0,
            Support::Grounded => 1,
            Support::Snapped => 2,
            Support::Steep => 3,
            Support::Climbing => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Support::Airborne => "airborne",
            Support::Grounded => "grounded",
            Support::Snapped => "snapped",
            Support::Steep => "steep",
            Support::Climbing => "climbing",
        }
    }
}

/// Outcome of one fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub support: Support,
    pub swimming: bool,
    pub in_water: bool,
    /// Gravity sampled at the start of the step
    pub gravity: Vec3,
    pub up_axis: Vec3,
    /// Speed added along the jump direction, if a jump happened
    pub jump_speed: Option<f32>,
    /// Velocity written to the body
    pub velocity: Vec3,
}

/// Gravity-aware character locomotion.
#[derive(Debug, Clone)]
pub struct LocomotionController {
    config: LocomotionConfig,
    thresholds: ContactThresholds,

    velocity: Vec3,
    gravity: Vec3,
    up_axis: Vec3,
    right_axis: Vec3,
    forward_axis: Vec3,
    contact_normal: Vec3,
    support: Support,

    contacts: ContactAccumulator,
    connection: ConnectionState,

    // Intent
    movement: Vec3,
    desired_jump: bool,
    climb_requested: bool,
    desires_climbing: bool,
    input_space: Option<InputSpace>,

    jump_phase: u32,
    steps_since_grounded: i32,
    steps_since_jump: i32,

    submergence: f32,
    swimming: bool,
    in_water: bool,
}

impl Default for LocomotionController {
    fn default() -> Self {
        Self::new(LocomotionConfig::default())
    }
}

impl LocomotionController {
    pub fn new(config: LocomotionConfig) -> Self {
        let config = config.validated();
        Self {
            thresholds: config.thresholds(),
            config,
            velocity: Vec3::ZERO,
            gravity: Vec3::ZERO,
            up_axis: DEFAULT_UP_AXIS,
            right_axis: Vec3::X,
            forward_axis: Vec3::Z,
            contact_normal: DEFAULT_UP_AXIS,
            support: Support::Airborne,
            contacts: ContactAccumulator::default(),
            connection: ConnectionState::default(),
            movement: Vec3::ZERO,
            desired_jump: false,
            climb_requested: false,
            desires_climbing: false,
            input_space: None,
            jump_phase: 0,
            steps_since_grounded: 0,
            steps_since_jump: 0,
            submergence: 0.0,
            swimming: false,
            in_water: false,
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Replace the tuning. Takes effect on the next step.
    pub fn set_config(&mut self, config: LocomotionConfig) {
        self.config = config.validated();
        self.thresholds = self.config.thresholds();
    }

    /// Take this frame's intent. A jump request stays pending until a step consumes it.
    pub fn apply_intent(&mut self, intent: &PlayerIntent) {
        self.movement = intent.clamped_movement();
        self.desired_jump |= intent.jump;
        self.climb_requested = intent.climb;
        self.input_space = intent.input_space;
    }

    /// Keep the next snap probe from undoing an external launch.
    pub fn prevent_snap_to_ground(&mut self) {
        self.steps_since_jump = -1;
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    pub fn support(&self) -> Support {
        self.support
    }

    pub fn is_grounded(&self) -> bool {
        self.support.is_supported()
    }

    pub fn is_climbing(&self) -> bool {
        self.support == Support::Climbing
    }

    pub fn is_swimming(&self) -> bool {
        self.swimming
    }

    pub fn in_water(&self) -> bool {
        self.in_water
    }

    /// Submergence evaluated during the last step (0..=1).
    pub fn submergence(&self) -> f32 {
        self.submergence
    }

    pub fn up_axis(&self) -> Vec3 {
        self.up_axis
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn contact_normal(&self) -> Vec3 {
        self.contact_normal
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn jump_phase(&self) -> u32 {
        self.jump_phase
    }

    pub fn steps_since_grounded(&self) -> i32 {
        self.steps_since_grounded
    }

    pub fn steps_since_jump(&self) -> i32 {
        self.steps_since_jump
    }

    /// Body the character was connected to during the last step.
    pub fn connected_body(&self) -> Option<BodyId> {
        self.connection.previous_body
    }

    pub fn connection_velocity(&self) -> Vec3 {
        self.connection.anchor.velocity
    }

    pub fn view(&self) -> LocomotionView {
        LocomotionView::from_controller(self)
    }

    // ------------------------------------------------------------------------
    // Step
    // ------------------------------------------------------------------------

    /// Run one fixed step and write the resulting velocity to `body`.
    pub fn step<W>(
        &mut self,
        dt: f32,
        field: &GravityField,
        world: &W,
        batch: &ContactBatch,
        body: &mut CharacterBody,
    ) -> StepReport
    where
        W: PhysicsWorld + ?Sized,
    {
        let dt = dt.max(MIN_STEP_TIME);

        let sample = field.sample(body.position, self.up_axis);
        self.gravity = sample.gravity;
        self.up_axis = sample.up_axis;

        self.steps_since_grounded = self.steps_since_grounded.saturating_add(1);
        self.steps_since_jump = self.steps_since_jump.saturating_add(1);
        self.velocity = body.velocity;
        self.update_input_axes();

        self.evaluate_submergence(world, body.position, batch);
        self.desires_climbing = self.climb_requested && !self.swimming;

        for contact in &batch.contacts {
            self.contacts.accumulate(
                contact,
                self.up_axis,
                &self.thresholds,
                self.config.climb_mask,
                self.desires_climbing,
            );
        }

        let previous_support = self.support;
        self.support = self.resolve_support(world, body.position);
        if self.support.is_supported() || self.swimming {
            self.steps_since_grounded = 0;
            if self.steps_since_jump > 1 {
                self.jump_phase = 0;
            }
        }
        if !self.support.is_supported() {
            self.contact_normal = self.up_axis;
        }
        if previous_support != self.support {
            tracing::debug!(
                from = previous_support.name(),
                to = self.support.name(),
                "locomotion support changed"
            );
        }

        self.update_connection(world, body, dt);

        if self.in_water {
            self.velocity *= (1.0 - self.config.water_drag * self.submergence * dt).max(0.0);
        }

        self.adjust_velocity(dt);

        let jump_speed = if std::mem::take(&mut self.desired_jump) {
            self.jump()
        } else {
            None
        };

        self.apply_residual_force(dt);

        body.velocity = self.velocity;
        let report = StepReport {
            support: self.support,
            swimming: self.swimming,
            in_water: self.in_water,
            gravity: self.gravity,
            up_axis: self.up_axis,
            jump_speed,
            velocity: self.velocity,
        };
        self.clear_state();
        report
    }

    fn update_input_axes(&mut self) {
        let (right, forward) = match self.input_space {
            Some(space) => (space.right(), space.forward()),
            None => (Vec3::X, Vec3::Z),
        };
        self.right_axis = project_direction_on_plane(right, self.up_axis);
        self.forward_axis = project_direction_on_plane(forward, self.up_axis);
    }

    fn evaluate_submergence<W>(&mut self, world: &W, position: Vec3, batch: &ContactBatch)
    where
        W: PhysicsWorld + ?Sized,
    {
        self.submergence = 0.0;
        for water in &batch.water {
            let origin = position + self.up_axis * self.config.submergence_offset;
            self.submergence = match world.raycast(
                origin,
                -self.up_axis,
                self.config.submergence_range + 1.0,
                self.config.water_mask,
            ) {
                Some(hit) => (1.0 - hit.distance / self.config.submergence_range).max(0.0),
                None => 1.0,
            };
            if self.submergence >= self.config.swim_threshold {
                self.contacts.connected_body = water.body;
            }
        }
        self.in_water = self.submergence > 0.0;
        self.swimming = self.submergence >= self.config.swim_threshold;
    }

    fn resolve_support<W>(&mut self, world: &W, position: Vec3) -> Support
    where
        W: PhysicsWorld + ?Sized,
    {
        if self.check_climbing() {
            Support::Climbing
        } else if self.contacts.on_ground() {
            if self.contacts.ground_count > 1 {
                self.contacts.ground_normal = self.contacts.ground_normal.normalize_or(self.up_axis);
            }
            self.contact_normal = self.contacts.ground_normal;
            Support::Grounded
        } else if self.snap_to_ground(world, position) {
            Support::Snapped
        } else if self.check_steep_contacts() {
            Support::Steep
        } else {
            Support::Airborne
        }
    }

    fn check_climbing(&mut self) -> bool {
        if self.contacts.climb_count == 0 || self.steps_since_jump <= 2 {
            return false;
        }
        if self.contacts.climb_count > 1 {
            self.contacts.climb_normal = self.contacts.climb_normal.normalize_or(self.up_axis);
            // A crevasse whose combined normal looks like ground: keep holding one wall
            if self.up_axis.dot(self.contacts.climb_normal) >= self.thresholds.min_ground_dot {
                self.contacts.climb_normal = self.contacts.last_climb_normal;
            }
        }
        self.contacts.ground_count = 1;
        self.contact_normal = self.contacts.climb_normal;
        true
    }

    fn snap_to_ground<W>(&mut self, world: &W, position: Vec3) -> bool
    where
        W: PhysicsWorld + ?Sized,
    {
        if self.steps_since_grounded > 1 || self.steps_since_jump <= 2 || self.in_water {
            return false;
        }
        let speed = self.velocity.length();
        if speed > self.config.max_snap_speed {
            return false;
        }
        let Some(hit) = world.raycast(
            position,
            -self.up_axis,
            self.config.probe_distance,
            self.config.probe_mask,
        ) else {
            return false;
        };
        if self.up_axis.dot(hit.normal) < self.thresholds.min_dot(hit.layer) {
            return false;
        }

        self.contacts.ground_count = 1;
        self.contacts.ground_normal = hit.normal;
        self.contact_normal = hit.normal;
        let away = self.velocity.dot(hit.normal);
        if away > 0.0 {
            self.velocity = (self.velocity - hit.normal * away).normalize_or_zero() * speed;
        }
        self.contacts.connected_body = hit.body;
        tracing::trace!(distance = hit.distance, "snapped to ground");
        true
    }

    fn check_steep_contacts(&mut self) -> bool {
        if self.contacts.steep_count <= 1 {
            return false;
        }
        let normal = self.contacts.steep_normal.normalize_or(self.up_axis);
        self.contacts.steep_normal = normal;
        if self.up_axis.dot(normal) < self.thresholds.min_ground_dot {
            return false;
        }
        self.contacts.steep_count = 0;
        self.contacts.ground_count = 1;
        self.contact_normal = normal;
        true
    }

    fn update_connection<W>(&mut self, world: &W, body: &CharacterBody, dt: f32)
    where
        W: PhysicsWorld + ?Sized,
    {
        self.connection.anchor.reset_velocity();
        let Some(id) = self.contacts.connected_body else {
            return;
        };
        let Some(info) = world.body(id) else {
            return;
        };
        if Connection::can_carry(&info, body.mass) {
            let same_body = self.connection.previous_body == Some(id);
            self.connection
                .anchor
                .update(&info, same_body, body.position, dt);
        }
    }

    fn adjust_velocity(&mut self, dt: f32) {
        let config = &self.config;
        let on_ground = self.support.is_supported();

        let (acceleration, speed, x_axis, z_axis) = if self.support == Support::Climbing {
            (
                config.max_climb_acceleration,
                config.max_climb_speed,
                self.contact_normal.cross(self.up_axis),
                self.up_axis,
            )
        } else if self.in_water {
            let swim_factor = (self.submergence / config.swim_threshold).min(1.0);
            let base_acceleration = if on_ground {
                config.max_acceleration
            } else {
                config.max_air_acceleration
            };
            (
                lerp(base_acceleration, config.max_swim_acceleration, swim_factor),
                lerp(config.max_speed, config.max_swim_speed, swim_factor),
                self.right_axis,
                self.forward_axis,
            )
        } else {
            let acceleration = if on_ground {
                config.max_acceleration
            } else {
                config.max_air_acceleration
            };
            let speed = if on_ground && self.desires_climbing {
                config.max_climb_speed
            } else {
                config.max_speed
            };
            (acceleration, speed, self.right_axis, self.forward_axis)
        };

        let x_axis = project_direction_on_plane(x_axis, self.contact_normal);
        let z_axis = project_direction_on_plane(z_axis, self.contact_normal);

        let relative_velocity = self.velocity - self.connection.anchor.velocity;
        let mut adjustment = Vec3::new(
            self.movement.x * speed - relative_velocity.dot(x_axis),
            0.0,
            self.movement.z * speed - relative_velocity.dot(z_axis),
        );
        if self.swimming {
            adjustment.y = self.movement.y * speed - relative_velocity.dot(self.up_axis);
        }
        let adjustment = adjustment.clamp_length_max(acceleration * dt);

        self.velocity += x_axis * adjustment.x + z_axis * adjustment.z;
        if self.swimming {
            self.velocity += self.up_axis * adjustment.y;
        }
    }

    fn jump(&mut self) -> Option<f32> {
        let direction = if self.support.is_supported() {
            self.contact_normal
        } else if self.contacts.on_steep() {
            self.jump_phase = 0;
            self.contacts.steep_normal.normalize_or(self.up_axis)
        } else if self.config.max_air_jumps > 0 && self.jump_phase <= self.config.max_air_jumps {
            if self.jump_phase == 0 {
                self.jump_phase = 1;
            }
            self.contact_normal
        } else {
            return None;
        };

        self.steps_since_jump = 0;
        self.jump_phase += 1;

        let mut jump_speed = (2.0 * self.gravity.length() * self.config.jump_height).sqrt();
        if self.in_water {
            jump_speed *= (1.0 - self.submergence / self.config.swim_threshold).max(0.0);
        }
        let direction = (direction + self.up_axis).normalize_or(self.up_axis);
        let aligned_speed = self.velocity.dot(direction);
        if aligned_speed > 0.0 {
            jump_speed = (jump_speed - aligned_speed).max(0.0);
        }
        self.velocity += direction * jump_speed;

        tracing::debug!(phase = self.jump_phase, speed = jump_speed, "jump");
        Some(jump_speed)
    }

    fn apply_residual_force(&mut self, dt: f32) {
        let on_ground = self.support.is_supported();
        if self.support == Support::Climbing {
            self.velocity -= self.contact_normal
                * (self.config.max_climb_acceleration * CLIMB_GRIP_FACTOR * dt);
        } else if self.in_water {
            self.velocity += self.gravity * ((1.0 - self.config.buoyancy * self.submergence) * dt);
        } else if on_ground && self.velocity.length_squared() < STANDING_SPEED_SQUARED {
            // Only press into the surface so a resting character does not slide
            self.velocity += self.contact_normal * (self.gravity.dot(self.contact_normal) * dt);
        } else if self.desires_climbing && on_ground {
            self.velocity += (self.gravity
                - self.contact_normal * (self.config.max_climb_acceleration * CLIMB_GRIP_FACTOR))
                * dt;
        } else {
            self.velocity += self.gravity * dt;
        }
    }

    fn clear_state(&mut self) {
        self.connection.previous_body = self.contacts.connected_body;
        self.contacts.clear();
    }
}

/// `direction` projected onto the plane with `normal`, normalized (zero if degenerate).
#[inline]
pub fn project_direction_on_plane(direction: Vec3, normal: Vec3) -> Vec3 {
    (direction - normal * direction.dot(normal)).normalize_or_zero()
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

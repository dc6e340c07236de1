//! Sandbox Scene
//!
//! Wires a [`GravityField`], a [`SandboxWorld`] and a character controller
//! into one fixed-step loop, together with the platforms, zones and
//! floating bodies of a [`SceneConfig`].
//!
//! # Tick Order
//!
//! 1. advance kinematic platforms
//! 2. gather the character's contact batch
//! 3. step the locomotion controller
//! 4. apply acceleration zones
//! 5. integrate and depenetrate the character
//! 6. step floating bodies
//! 7. update detection zones

use glam::{Quat, Vec3};

use super::world::{Motion, SandboxBody, SandboxWorld};
use crate::bodies::{DynamicBody, FloatingBody};
use crate::config::SceneConfig;
use crate::gravity::GravityField;
use crate::locomotion::{LocomotionController, PlayerIntent, StepReport};
use crate::physics::{BodyId, CharacterBody, ContactBatch};
use crate::zones::{
    AccelerationZone, AutomaticSlider, DetectionZone, PositionInterpolator, ZoneEvent, ZoneVolume,
};

/// Body id reserved for the character in zone events
pub const CHARACTER_ID: BodyId = BodyId(0);

/// Distance within which touching surfaces are reported as contacts
const CONTACT_SKIN: f32 = 0.01;

/// Kinematic box moved along a path by a slider.
#[derive(Debug, Clone)]
pub struct Platform {
    pub body: BodyId,
    pub slider: AutomaticSlider,
    pub path: PositionInterpolator,
    pub ping_pong: bool,
}

/// Floating ball simulated by the sandbox.
#[derive(Debug, Clone)]
pub struct Floater {
    pub body: BodyId,
    pub state: DynamicBody,
    pub floating: FloatingBody,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct Detector {
    pub volume: ZoneVolume,
    pub zone: DetectionZone,
}

/// Outcome of one sandbox tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub step: StepReport,
    /// Character position after integration
    pub position: Vec3,
    /// An acceleration zone pushed the character this tick
    pub launched: bool,
    /// `(detector index, event)` pairs
    pub events: Vec<(usize, ZoneEvent)>,
}

#[derive(Debug, Clone)]
pub struct Sandbox {
    fixed_step: f32,
    field: GravityField,
    world: SandboxWorld,
    controller: LocomotionController,
    character: CharacterBody,
    character_radius: f32,
    platforms: Vec<Platform>,
    acceleration_zones: Vec<AccelerationZone>,
    floaters: Vec<Floater>,
    detectors: Vec<Detector>,
    steps: u64,
}

impl Sandbox {
    /// Empty scene with a character at `spawn`.
    pub fn new(fixed_step: f32, field: GravityField, world: SandboxWorld, controller: LocomotionController, spawn: Vec3) -> Self {
        Self {
            fixed_step: fixed_step.max(crate::locomotion::MIN_STEP_TIME),
            field,
            world,
            controller,
            character: CharacterBody::new(spawn),
            character_radius: 0.5,
            platforms: Vec::new(),
            acceleration_zones: Vec::new(),
            floaters: Vec::new(),
            detectors: Vec::new(),
            steps: 0,
        }
    }

    /// Build every part of a scene. A gravity entry reusing an earlier id is
    /// logged and skipped.
    pub fn from_config(config: &SceneConfig) -> Self {
        let mut field = GravityField::new();
        for entry in &config.gravity {
            if let Err(err) = field.register(entry.id, entry.source) {
                tracing::warn!(%err, "skipping gravity source");
            }
        }

        let mut world = SandboxWorld::new();
        for body in &config.bodies {
            world.add(*body);
        }

        let mut sandbox = Self::new(
            config.fixed_step,
            field,
            world,
            LocomotionController::new(config.locomotion.clone()),
            config.character.spawn,
        );
        sandbox.character.mass = config.character.mass;
        sandbox.character_radius = config.character.radius;

        for platform in &config.platforms {
            let body = SandboxBody::cuboid(platform.from, platform.half_extents)
                .with_motion(Motion::Kinematic)
                .with_layer(platform.layer);
            sandbox.add_platform(
                body,
                PositionInterpolator::new(platform.from, platform.to),
                platform.duration,
                platform.ping_pong,
            );
        }
        for zone in &config.acceleration_zones {
            sandbox.add_acceleration_zone(*zone);
        }
        for volume in &config.detection_zones {
            sandbox.add_detection_zone(*volume);
        }
        for floating in &config.floating_bodies {
            sandbox.add_floater(
                floating.position,
                floating.radius,
                floating.mass,
                FloatingBody::new(floating.floating.clone()),
            );
        }

        tracing::info!(
            sources = sandbox.field.len(),
            bodies = sandbox.world.len(),
            platforms = sandbox.platforms.len(),
            floaters = sandbox.floaters.len(),
            "sandbox scene built"
        );
        sandbox
    }

    pub fn add_platform(
        &mut self,
        body: SandboxBody,
        path: PositionInterpolator,
        duration: f32,
        ping_pong: bool,
    ) -> BodyId {
        let body = self.world.add(body);
        self.platforms.push(Platform {
            body,
            slider: AutomaticSlider::new(duration),
            path,
            ping_pong,
        });
        body
    }

    pub fn add_acceleration_zone(&mut self, zone: AccelerationZone) {
        self.acceleration_zones.push(zone.validated());
    }

    /// Returns the detector index used in [`TickReport::events`].
    pub fn add_detection_zone(&mut self, volume: ZoneVolume) -> usize {
        self.detectors.push(Detector {
            volume,
            zone: DetectionZone::new(),
        });
        self.detectors.len() - 1
    }

    pub fn add_floater(&mut self, position: Vec3, radius: f32, mass: f32, floating: FloatingBody) -> BodyId {
        let body = self.world.add(
            SandboxBody::ball(position, radius).with_motion(Motion::Dynamic { mass }),
        );
        self.floaters.push(Floater {
            body,
            state: DynamicBody::new(position),
            floating,
            radius,
        });
        body
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn field(&self) -> &GravityField {
        &self.field
    }

    /// Mutate gravity sources between ticks.
    pub fn field_mut(&mut self) -> &mut GravityField {
        &mut self.field
    }

    pub fn world(&self) -> &SandboxWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SandboxWorld {
        &mut self.world
    }

    pub fn controller(&self) -> &LocomotionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LocomotionController {
        &mut self.controller
    }

    pub fn character(&self) -> &CharacterBody {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut CharacterBody {
        &mut self.character
    }

    pub fn floaters(&self) -> &[Floater] {
        &self.floaters
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Contacts and water overlaps of the character at its current position.
    pub fn contact_batch(&self) -> ContactBatch {
        let mut batch = ContactBatch::new();
        let position = self.character.position;
        for solid in self
            .world
            .solid_contacts(position, self.character_radius, CONTACT_SKIN, None)
        {
            batch.push(solid.contact);
        }
        let water_mask = self.controller.config().water_mask;
        for (id, body) in self
            .world
            .overlapping_triggers(position, self.character_radius, water_mask)
        {
            batch.push_water(body.attachment(id));
        }
        batch
    }

    /// Advance the whole scene by one fixed step.
    pub fn tick(&mut self, intent: &PlayerIntent) -> TickReport {
        let dt = self.fixed_step;

        self.drive_platforms(dt);

        let batch = self.contact_batch();
        self.controller.apply_intent(intent);
        let step = self
            .controller
            .step(dt, &self.field, &self.world, &batch, &mut self.character);

        let mut launched = false;
        for zone in &self.acceleration_zones {
            if zone
                .volume
                .overlaps_sphere(self.character.position, self.character_radius)
            {
                launched |= zone.apply_to_character(dt, &mut self.character, &mut self.controller);
            }
            for floater in &mut self.floaters {
                if zone.volume.overlaps_sphere(floater.state.position, floater.radius) {
                    zone.apply_to_body(dt, &mut floater.state);
                }
            }
        }

        self.character.position += self.character.velocity * dt;
        let (position, velocity) = self.depenetrate(
            self.character.position,
            self.character.velocity,
            self.character_radius,
            None,
        );
        self.character.position = position;
        self.character.velocity = velocity;

        self.step_floaters(dt);
        let events = self.update_detectors();

        self.steps += 1;
        tracing::trace!(
            step = self.steps,
            support = step.support.name(),
            position = ?self.character.position,
            "sandbox tick"
        );

        TickReport {
            step,
            position: self.character.position,
            launched,
            events,
        }
    }

    fn drive_platforms(&mut self, dt: f32) {
        for platform in &mut self.platforms {
            if let Some(t) = platform.slider.step(dt) {
                let rotation = self
                    .world
                    .get(platform.body)
                    .map_or(Quat::IDENTITY, |body| body.rotation);
                self.world
                    .set_pose(platform.body, platform.path.interpolate(t), rotation);
            }
            if !platform.slider.is_enabled() && platform.ping_pong {
                std::mem::swap(&mut platform.path.from, &mut platform.path.to);
                platform.slider.restart();
            }
        }
    }

    /// Push a sphere out of blocking bodies and drop velocity into them.
    fn depenetrate(&self, mut position: Vec3, mut velocity: Vec3, radius: f32, skip: Option<BodyId>) -> (Vec3, Vec3) {
        for solid in self.world.solid_contacts(position, radius, 0.0, skip) {
            let normal = solid.contact.normal;
            if solid.depth > 0.0 {
                position += normal * solid.depth;
            }
            let into = velocity.dot(normal);
            if into < 0.0 {
                velocity -= normal * into;
            }
        }
        (position, velocity)
    }

    fn step_floaters(&mut self, dt: f32) {
        let world = &self.world;
        self.floaters.retain(|floater| world.contains(floater.body));

        for index in 0..self.floaters.len() {
            let floater = &mut self.floaters[index];
            if let Some(forces) = floater.floating.step(dt, &self.field, &mut floater.state) {
                let state = &mut floater.state;
                state.linear_velocity += forces.linear_acceleration() * dt;
                state.angular_velocity += forces.angular_acceleration(state.position) * dt;
            }
            let state = &mut floater.state;
            state.position += state.linear_velocity * dt;
            if state.angular_velocity != Vec3::ZERO {
                state.rotation = (Quat::from_scaled_axis(state.angular_velocity * dt) * state.rotation).normalize();
            }

            let (body, radius, position, velocity) = (floater.body, floater.radius, state.position, state.linear_velocity);
            let (position, velocity) = self.depenetrate(position, velocity, radius, Some(body));

            let floater = &mut self.floaters[index];
            floater.state.position = position;
            floater.state.linear_velocity = velocity;
            self.world.set_pose(body, position, floater.state.rotation);

            let water_mask = floater.floating.config().water_mask;
            if !self
                .world
                .overlapping_triggers(position, radius, water_mask)
                .is_empty()
            {
                floater.floating.evaluate_submergence(&self.world, &floater.state);
            }
        }
    }

    fn update_detectors(&mut self) -> Vec<(usize, ZoneEvent)> {
        let mut events = Vec::new();
        for (index, detector) in self.detectors.iter_mut().enumerate() {
            let mut record = |event: Option<ZoneEvent>| {
                if let Some(event) = event {
                    tracing::debug!(zone = index, ?event, "detection zone event");
                    events.push((index, event));
                }
            };

            let inside = detector
                .volume
                .overlaps_sphere(self.character.position, self.character_radius);
            record(if inside {
                detector.zone.enter(CHARACTER_ID)
            } else {
                detector.zone.exit(CHARACTER_ID)
            });

            for floater in &self.floaters {
                let inside = detector
                    .volume
                    .overlaps_sphere(floater.state.position, floater.radius);
                record(if inside {
                    detector.zone.enter(floater.body)
                } else {
                    detector.zone.exit(floater.body)
                });
            }

            let world = &self.world;
            record(detector.zone.prune(|id| id == CHARACTER_ID || world.contains(id)));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{SourceId, UniformGravity};
    use crate::locomotion::Support;

    fn flat_sandbox(field: GravityField) -> Sandbox {
        let mut world = SandboxWorld::new();
        world.add(SandboxBody::cuboid(Vec3::new(0.0, -0.5, 0.0), Vec3::new(10.0, 0.5, 10.0)));
        Sandbox::new(
            0.02,
            field,
            world,
            LocomotionController::default(),
            Vec3::new(0.0, 0.5, 0.0),
        )
    }

    fn uniform_field() -> GravityField {
        let mut field = GravityField::new();
        field
            .register(SourceId(1), UniformGravity::new(Vec3::new(0.0, -9.81, 0.0)).into())
            .unwrap();
        field
    }

    #[test]
    fn test_default_scene_builds() {
        let sandbox = Sandbox::from_config(&SceneConfig::default());
        assert_eq!(sandbox.field().len(), 1);
        assert_eq!(sandbox.platforms().len(), 1);
        assert_eq!(sandbox.floaters().len(), 1);
        assert_eq!(sandbox.detectors().len(), 1);
    }

    #[test]
    fn test_duplicate_source_id_is_skipped() {
        let mut config = SceneConfig::default();
        let mut entry = config.gravity[0];
        entry.source = UniformGravity::new(Vec3::new(0.0, 20.0, 0.0)).into();
        config.gravity.push(entry);

        let sandbox = Sandbox::from_config(&config);
        assert_eq!(sandbox.field().len(), 1);
        // The first registration wins
        let gravity = sandbox.field().gravity(Vec3::ZERO);
        assert!(gravity.y < 0.0, "gravity = {gravity:?}");
    }

    #[test]
    fn test_launch_zone_pushes_floater() {
        let mut sandbox = flat_sandbox(uniform_field());
        let spot = Vec3::new(5.0, 3.0, 5.0);
        sandbox.add_acceleration_zone(AccelerationZone::new(ZoneVolume::new(spot, Vec3::ONE), 0.0, 12.0));
        sandbox.add_floater(spot, 0.25, 0.5, FloatingBody::new(Default::default()));

        sandbox.tick(&PlayerIntent::new());
        let velocity = sandbox.floaters()[0].state.linear_velocity;
        assert!(velocity.y > 11.0, "velocity = {velocity:?}");
    }

    #[test]
    fn test_character_rests_on_ground() {
        let mut sandbox = flat_sandbox(uniform_field());
        let mut report = sandbox.tick(&PlayerIntent::new());
        for _ in 0..10 {
            report = sandbox.tick(&PlayerIntent::new());
        }
        assert_eq!(report.step.support, Support::Grounded);
        assert!((report.position.y - 0.5).abs() < 0.01, "y = {}", report.position.y);
        assert_eq!(sandbox.steps(), 11);
    }

    #[test]
    fn test_ping_pong_platform_returns() {
        let mut sandbox = flat_sandbox(GravityField::new());
        let from = Vec3::new(5.0, 0.25, 5.0);
        let to = Vec3::new(5.0, 0.25, 7.0);
        let body = sandbox.add_platform(
            SandboxBody::cuboid(from, Vec3::splat(0.5)).with_motion(Motion::Kinematic),
            PositionInterpolator::new(from, to),
            0.04,
            true,
        );

        sandbox.tick(&PlayerIntent::new());
        sandbox.tick(&PlayerIntent::new());
        assert!(sandbox.world().get(body).unwrap().position.distance(to) < 1e-4);

        sandbox.tick(&PlayerIntent::new());
        sandbox.tick(&PlayerIntent::new());
        assert!(sandbox.world().get(body).unwrap().position.distance(from) < 1e-4);
    }

    #[test]
    fn test_detection_zone_tracks_character() {
        let mut sandbox = flat_sandbox(GravityField::new());
        let zone = sandbox.add_detection_zone(ZoneVolume::new(Vec3::new(0.0, 0.5, 0.0), Vec3::ONE));

        let report = sandbox.tick(&PlayerIntent::new());
        assert_eq!(report.events, vec![(zone, ZoneEvent::FirstEnter)]);
        assert!(sandbox.tick(&PlayerIntent::new()).events.is_empty());

        sandbox.character_mut().position = Vec3::new(8.0, 0.5, 8.0);
        let report = sandbox.tick(&PlayerIntent::new());
        assert_eq!(report.events, vec![(zone, ZoneEvent::LastExit)]);
    }

    #[test]
    fn test_removed_floater_is_pruned() {
        let mut sandbox = flat_sandbox(GravityField::new());
        let zone = sandbox.add_detection_zone(ZoneVolume::new(Vec3::new(0.0, 3.0, -6.0), Vec3::ONE));
        let body = sandbox.add_floater(
            Vec3::new(0.0, 3.0, -6.0),
            0.25,
            0.5,
            FloatingBody::new(Default::default()),
        );

        let report = sandbox.tick(&PlayerIntent::new());
        assert_eq!(report.events, vec![(zone, ZoneEvent::FirstEnter)]);

        sandbox.world_mut().remove(body);
        let report = sandbox.tick(&PlayerIntent::new());
        assert_eq!(report.events, vec![(zone, ZoneEvent::LastExit)]);
        assert!(sandbox.floaters().is_empty());
    }

    #[test]
    fn test_contact_batch_reports_water() {
        let mut sandbox = flat_sandbox(GravityField::new());
        sandbox
            .world_mut()
            .add(SandboxBody::water(Vec3::new(0.0, 1.0, 0.0), Vec3::ONE));
        let batch = sandbox.contact_batch();
        assert_eq!(batch.contacts.len(), 1);
        assert_eq!(batch.water.len(), 1);
        assert_eq!(batch.water[0].body, None);
    }
}

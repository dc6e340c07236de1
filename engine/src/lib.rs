//! Gravity Locomotion Engine
//!
//! Arbitrary-gravity character locomotion: a registry of gravity sources
//! whose pulls are summed at any point, and a fixed-step controller that
//! walks, climbs, swims and jumps relative to the local "up" of that field.
//!
//! # Modules
//!
//! - [`gravity`] - Gravity sources (uniform, sphere, box, plane) and the field registry
//! - [`locomotion`] - Character controller, intent and contact classification
//! - [`physics`] - Shared types, collision math and the [`physics::PhysicsWorld`] seam
//! - [`bodies`] - Buoyant rigid bodies that follow the field
//! - [`zones`] - Acceleration zones, detection zones, sliders and interpolators
//! - [`sandbox`] - A box/sphere world and a scene driver tying everything together
//! - [`config`] - JSON scene files
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Example
//!
//! ```ignore
//! use gravity_locomotion_engine::{
//!     CharacterBody, ContactBatch, Contact, GravityField, LocomotionController,
//!     PlayerIntent, SourceId, UniformGravity, EmptyWorld, Vec3,
//! };
//!
//! let mut field = GravityField::new();
//! field.register(SourceId(1), UniformGravity::new(Vec3::new(0.0, -9.81, 0.0)).into())?;
//!
//! let mut controller = LocomotionController::default();
//! let mut body = CharacterBody::new(Vec3::new(0.0, 0.5, 0.0));
//!
//! // The physics step reports what the sphere touched
//! let batch = ContactBatch::new().with_contact(Contact::on_static(Vec3::Y));
//!
//! controller.apply_intent(&PlayerIntent::new().with_axes(0.0, 1.0).with_jump());
//! let report = controller.step(0.02, &field, &EmptyWorld, &batch, &mut body);
//! assert!(report.jump_speed.is_some());
//! ```

pub mod bodies;
pub mod config;
pub mod gravity;
pub mod locomotion;
pub mod logging;
pub mod physics;
pub mod sandbox;
pub mod zones;

// Re-export the types most callers need at crate level
pub use bodies::{DynamicBody, FloatingBody, FloatingConfig};
pub use config::{ConfigError, SceneConfig};
pub use gravity::{
    BoxGravity, GravityField, GravityFieldError, GravitySample, GravitySource, PlaneGravity,
    SourceId, SphereGravity, UniformGravity,
};
pub use locomotion::{LocomotionConfig, LocomotionController, LocomotionView, PlayerIntent, StepReport, Support};
pub use physics::{
    BodyId, CharacterBody, Contact, ContactBatch, EmptyWorld, Layer, LayerMask, PhysicsWorld, Quat, Vec3,
};
pub use sandbox::{Sandbox, SandboxBody, SandboxWorld, TickReport};
pub use zones::{AccelerationZone, AutomaticSlider, DetectionZone, PositionInterpolator, ZoneEvent, ZoneVolume};

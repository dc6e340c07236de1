//! Sandbox
//!
//! A small rigid-body world of boxes and spheres that implements
//! [`PhysicsWorld`](crate::physics::PhysicsWorld), and a scene driver that
//! runs the controller, platforms, zones and floating bodies against it.
//! Only sphere-vs-shape contacts are resolved; there is no broad phase.

pub mod scene;
pub mod world;

pub use scene::{CHARACTER_ID, Detector, Floater, Platform, Sandbox, TickReport};
pub use world::{Motion, SandboxBody, SandboxWorld, Shape, SolidContact};

//! Gravity module
//!
//! Multi-source gravity: each [`GravitySource`] is a pure function of world
//! position, and a [`GravityField`] sums the active sources of a scene.
//!
//! # Unit System
//!
//! **1 unit = 1 meter**, gravity in m/s^2.
//!
//! # Submodules
//!
//! - [`source`] - Uniform, sphere, box and plane sources
//! - [`field`] - Source registry, superposition and up axis derivation

pub mod field;
pub mod source;

pub use field::{DEFAULT_UP_AXIS, GravityField, GravityFieldError, GravitySample, SourceId};
pub use source::{
    BoxGravity, GravitySource, PlaneGravity, STANDARD_GRAVITY, SphereGravity, UniformGravity,
};

//! Physics module
//!
//! The seam between the locomotion layer and the physics collaborator.
//! No rigid-body solver lives here: the collaborator integrates positions
//! and reports contacts; this module defines what it reports and which
//! queries it answers.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//! - Mass in kg
//!
//! # Submodules
//!
//! - [`types`] - Body handles, collision layers and glam re-exports
//! - [`world`] - The [`PhysicsWorld`] trait, contacts and ray hits
//! - [`collision`] - Ray and sphere queries against boxes and spheres

pub mod collision;
pub mod types;
pub mod world;

pub use collision::{OrientedBox, ShapeContact, ray_aabb_intersect, ray_sphere_intersect};
pub use types::{Affine3A, BodyId, LAYER_COUNT, Layer, LayerMask, LayerOutOfRange, Quat, Vec3};
pub use world::{
    BodyInfo, CharacterBody, Contact, ContactBatch, EmptyWorld, PhysicsWorld, RayHit, WaterOverlap,
};

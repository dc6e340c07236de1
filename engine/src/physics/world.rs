//! Physics collaborator interface
//!
//! The locomotion layer does not integrate positions or resolve collisions
//! itself. It consumes a [`PhysicsWorld`] for ray casts, overlap checks and
//! body metadata, and receives the touching contacts of each tick as one
//! [`ContactBatch`].

use glam::{Affine3A, Vec3};

use super::types::{BodyId, Layer, LayerMask};

/// Nearest hit of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at the hit point (normalized)
    pub normal: Vec3,
    /// Rigid body owning the hit collider, if any
    pub body: Option<BodyId>,
    pub layer: Layer,
}

/// Read-only description of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInfo {
    /// Kinematic bodies are moved by script, not by forces
    pub kinematic: bool,
    /// Mass in kg
    pub mass: f32,
    /// Local-to-world transform
    pub transform: Affine3A,
}

/// One touching contact delivered by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Surface normal pointing toward the character
    pub normal: Vec3,
    pub body: Option<BodyId>,
    pub layer: Layer,
}

impl Contact {
    pub fn new(normal: Vec3, body: Option<BodyId>, layer: Layer) -> Self {
        Self {
            normal,
            body,
            layer,
        }
    }

    /// Contact against static geometry on the default layer.
    pub fn on_static(normal: Vec3) -> Self {
        Self::new(normal, None, Layer::DEFAULT)
    }
}

/// A water trigger volume the character overlaps this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterOverlap {
    /// Body the water volume is attached to, if any
    pub body: Option<BodyId>,
}

/// Every contact and water overlap of one tick.
///
/// The collaborator fills the batch completely before the controller steps;
/// the controller never sees a partially delivered tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactBatch {
    pub contacts: Vec<Contact>,
    pub water: Vec<WaterOverlap>,
}

impl ContactBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    pub fn push_water(&mut self, body: Option<BodyId>) {
        self.water.push(WaterOverlap { body });
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.push(contact);
        self
    }

    pub fn with_water(mut self, body: Option<BodyId>) -> Self {
        self.push_water(body);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty() && self.water.is_empty()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.water.clear();
    }
}

/// The character's rigid body as seen by the controller.
///
/// The controller reads `velocity` at the start of a step and writes it
/// once at the end; the collaborator integrates `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterBody {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Mass in kg
    pub mass: f32,
}

impl CharacterBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            mass: 1.0,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

/// Queries the locomotion layer needs from the physics engine.
pub trait PhysicsWorld {
    /// Nearest hit along `direction` within `max_distance` on `mask`.
    ///
    /// Shapes containing `origin` are not reported.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Whether a sphere overlaps any collider on `mask`.
    fn check_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> bool;

    /// Metadata of a body, `None` if it no longer exists.
    fn body(&self, id: BodyId) -> Option<BodyInfo>;
}

/// A world with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorld;

impl PhysicsWorld for EmptyWorld {
    fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32, _mask: LayerMask) -> Option<RayHit> {
        None
    }

    fn check_sphere(&self, _center: Vec3, _radius: f32, _mask: LayerMask) -> bool {
        false
    }

    fn body(&self, _id: BodyId) -> Option<BodyInfo> {
        None
    }
}

//! Sandbox World
//!
//! A small [`PhysicsWorld`] made of boxes and spheres. Bodies are static,
//! kinematic (moved by script) or dynamic (moved by the sandbox step);
//! trigger bodies such as water volumes are only reported to queries whose
//! layer mask includes them.
//!
//! This is not a rigid-body solver. It answers the queries the locomotion
//! layer needs and produces sphere contacts for the sandbox step.

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::physics::collision::{self, OrientedBox, ShapeContact};
use crate::physics::{BodyId, BodyInfo, Contact, Layer, LayerMask, PhysicsWorld, RayHit};

/// Collision shape of a sandbox body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Box {
            half_extents: Vec3::splat(0.5),
        }
    }
}

/// How a body moves.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Motion {
    /// Level geometry; contacts carry no body
    #[default]
    Static,
    /// Moved by script, carries the character regardless of mass
    Kinematic,
    Dynamic { mass: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxBody {
    pub shape: Shape,
    pub position: Vec3,
    pub rotation: Quat,
    pub motion: Motion,
    pub layer: Layer,
    /// Triggers overlap but never block
    pub trigger: bool,
}

impl Default for SandboxBody {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            motion: Motion::Static,
            layer: Layer::DEFAULT,
            trigger: false,
        }
    }
}

impl SandboxBody {
    pub fn cuboid(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            shape: Shape::Box { half_extents },
            position,
            ..Default::default()
        }
    }

    pub fn ball(position: Vec3, radius: f32) -> Self {
        Self {
            shape: Shape::Sphere { radius },
            position,
            ..Default::default()
        }
    }

    /// Water trigger volume.
    pub fn water(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            layer: Layer::WATER,
            trigger: true,
            ..Self::cuboid(position, half_extents)
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation.normalize();
        self
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.position)
    }

    /// Body reference reported in contacts; static geometry has none.
    pub fn attachment(&self, id: BodyId) -> Option<BodyId> {
        match self.motion {
            Motion::Static => None,
            Motion::Kinematic | Motion::Dynamic { .. } => Some(id),
        }
    }

    fn oriented_box(&self, half_extents: Vec3) -> OrientedBox {
        OrientedBox::new(self.position, self.rotation, half_extents)
    }

    /// Entry distance and normal of a ray.
    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        match self.shape {
            Shape::Box { half_extents } => self.oriented_box(half_extents).raycast(origin, direction),
            Shape::Sphere { radius } => {
                let t = collision::ray_sphere_intersect(origin, direction, self.position, radius)?;
                let normal = (origin + direction * t - self.position).normalize_or(-direction);
                Some((t, normal))
            }
        }
    }

    /// Contact of a sphere with this body within `skin`.
    pub fn sphere_contact(&self, center: Vec3, radius: f32, skin: f32) -> Option<ShapeContact> {
        match self.shape {
            Shape::Box { half_extents } => self.oriented_box(half_extents).sphere_contact(center, radius, skin),
            Shape::Sphere { radius: own } => {
                collision::sphere_sphere_contact(center, radius, self.position, own, skin)
            }
        }
    }
}

/// Solid contact of a sphere, with the penetration needed to resolve it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidContact {
    pub id: BodyId,
    pub contact: Contact,
    pub depth: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    bodies: Vec<(BodyId, SandboxBody)>,
    next_id: u32,
}

impl SandboxWorld {
    /// Ids start at 1; 0 is left for the character.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, body: SandboxBody) -> BodyId {
        let id = BodyId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.bodies.push((id, body));
        id
    }

    pub fn remove(&mut self, id: BodyId) -> Option<SandboxBody> {
        let index = self.bodies.iter().position(|(bid, _)| *bid == id)?;
        Some(self.bodies.remove(index).1)
    }

    pub fn get(&self, id: BodyId) -> Option<&SandboxBody> {
        self.bodies.iter().find(|(bid, _)| *bid == id).map(|(_, body)| body)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut SandboxBody> {
        self.bodies
            .iter_mut()
            .find(|(bid, _)| *bid == id)
            .map(|(_, body)| body)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &SandboxBody)> {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Teleport a body (kinematic platforms, dynamic integration).
    pub fn set_pose(&mut self, id: BodyId, position: Vec3, rotation: Quat) -> bool {
        match self.get_mut(id) {
            Some(body) => {
                body.position = position;
                body.rotation = rotation;
                true
            }
            None => false,
        }
    }

    /// Every blocking body touching a sphere within `skin`, optionally skipping one body.
    pub fn solid_contacts(&self, center: Vec3, radius: f32, skin: f32, skip: Option<BodyId>) -> Vec<SolidContact> {
        self.bodies
            .iter()
            .filter(|(id, body)| !body.trigger && Some(*id) != skip)
            .filter_map(|(id, body)| {
                body.sphere_contact(center, radius, skin).map(|shape| SolidContact {
                    id: *id,
                    contact: Contact::new(shape.normal, body.attachment(*id), body.layer),
                    depth: shape.depth,
                })
            })
            .collect()
    }

    /// Trigger bodies on `mask` overlapping a sphere.
    pub fn overlapping_triggers(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<(BodyId, &SandboxBody)> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.trigger && mask.contains(body.layer))
            .filter(|(_, body)| body.sphere_contact(center, radius, 0.0).is_some())
            .map(|(id, body)| (*id, body))
            .collect()
    }
}

impl PhysicsWorld for SandboxWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let mut closest: Option<RayHit> = None;
        for (id, body) in &self.bodies {
            if !mask.contains(body.layer) {
                continue;
            }
            let Some((distance, normal)) = body.raycast(origin, direction) else {
                continue;
            };
            if distance > max_distance || closest.is_some_and(|hit| hit.distance <= distance) {
                continue;
            }
            closest = Some(RayHit {
                distance,
                point: origin + direction * distance,
                normal,
                body: body.attachment(*id),
                layer: body.layer,
            });
        }
        closest
    }

    fn check_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> bool {
        self.bodies
            .iter()
            .any(|(_, body)| mask.contains(body.layer) && body.sphere_contact(center, radius, 0.0).is_some())
    }

    fn body(&self, id: BodyId) -> Option<BodyInfo> {
        self.get(id).map(|body| BodyInfo {
            kinematic: matches!(body.motion, Motion::Kinematic),
            mass: match body.motion {
                Motion::Dynamic { mass } => mass,
                Motion::Static | Motion::Kinematic => f32::INFINITY,
            },
            transform: body.transform(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground_and_pool() -> (SandboxWorld, BodyId, BodyId) {
        let mut world = SandboxWorld::new();
        let ground = world.add(SandboxBody::cuboid(Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0)));
        let pool = world.add(SandboxBody::water(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 2.0)));
        (world, ground, pool)
    }

    #[test]
    fn test_ids_skip_character_slot() {
        let (_, ground, pool) = ground_and_pool();
        assert_eq!(ground, BodyId(1));
        assert_eq!(pool, BodyId(2));
    }

    #[test]
    fn test_raycast_respects_mask() {
        let (world, _, _) = ground_and_pool();
        let origin = Vec3::new(0.0, 5.0, 0.0);

        let solid = world
            .raycast(origin, Vec3::NEG_Y, 10.0, Layer::DEFAULT.mask())
            .expect("ground should be hit");
        assert!((solid.distance - 5.0).abs() < 1e-5);
        assert_eq!(solid.normal, Vec3::Y);
        assert_eq!(solid.body, None);

        let water = world
            .raycast(origin, Vec3::NEG_Y, 10.0, Layer::WATER.mask())
            .expect("water surface should be hit");
        assert!((water.distance - 3.0).abs() < 1e-5);
        assert_eq!(water.layer, Layer::WATER);
    }

    #[test]
    fn test_raycast_max_distance() {
        let (world, _, _) = ground_and_pool();
        assert!(world.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 4.0, Layer::DEFAULT.mask()).is_none());
    }

    #[test]
    fn test_raycast_from_inside_water_misses_it() {
        let (world, _, _) = ground_and_pool();
        let hit = world.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, 1.5, Layer::WATER.mask());
        assert!(hit.is_none());
    }

    #[test]
    fn test_solid_contacts_skip_triggers() {
        let (world, ground, _) = ground_and_pool();
        let contacts = world.solid_contacts(Vec3::new(0.0, 0.5, 0.0), 0.5, 0.01, None);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, ground);
        assert_eq!(contacts[0].contact.normal, Vec3::Y);

        let triggers = world.overlapping_triggers(Vec3::new(0.0, 0.5, 0.0), 0.5, Layer::WATER.mask());
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn test_body_info_by_motion() {
        let mut world = SandboxWorld::new();
        let platform = world.add(
            SandboxBody::cuboid(Vec3::ZERO, Vec3::ONE).with_motion(Motion::Kinematic),
        );
        let crate_body = world.add(
            SandboxBody::ball(Vec3::ZERO, 0.5).with_motion(Motion::Dynamic { mass: 2.0 }),
        );
        assert!(world.body(platform).unwrap().kinematic);
        assert_eq!(world.body(crate_body).unwrap().mass, 2.0);
        assert!(world.remove(crate_body).is_some());
        assert!(world.body(crate_body).is_none());
    }

    #[test]
    fn test_check_sphere() {
        let (world, _, _) = ground_and_pool();
        assert!(world.check_sphere(Vec3::new(0.0, 1.0, 0.0), 0.01, Layer::WATER.mask()));
        assert!(!world.check_sphere(Vec3::new(0.0, 3.5, 0.0), 0.01, Layer::WATER.mask()));
    }
}

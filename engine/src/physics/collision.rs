//! Collision detection module
//!
//! Geometric queries used by the sandbox world: ray casts against boxes and
//! spheres, sphere overlap tests and penetration contacts.
//!
//! # Ray Casts
//!
//! Box casts use the slab method, computing entry and exit times for each
//! axis. Casts only report where a ray *enters* a shape: a ray whose origin
//! already lies inside a shape does not hit it. Water probes rely on this to
//! detect a probe origin below the surface.
//!
//! # Example
//!
//! ```ignore
//! use gravity_locomotion_engine::physics::collision::ray_aabb_intersect;
//! use glam::Vec3;
//!
//! let origin = Vec3::new(0.0, 0.0, -5.0);
//! let direction = Vec3::new(0.0, 0.0, 1.0);
//! if let Some(t) = ray_aabb_intersect(origin, direction, Vec3::splat(-1.0), Vec3::ONE) {
//!     println!("Hit at distance {}", t);
//! }
//! ```

use glam::{Quat, Vec3};

/// Contact between a sphere and another shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeContact {
    /// Surface normal pointing from the shape toward the sphere center
    pub normal: Vec3,
    /// Overlap depth along `normal` (negative when within the skin only)
    pub depth: f32,
}

/// Performs ray-AABB intersection using the slab method.
///
/// # Arguments
///
/// * `ray_origin` - Starting point of the ray
/// * `ray_dir` - Direction of the ray (must be normalized)
/// * `aabb_min` - Minimum corner of the AABB
/// * `aabb_max` - Maximum corner of the AABB
///
/// # Returns
///
/// * `Some(t)` - Distance along the ray to the entry point (t >= 0)
/// * `None` - No intersection, intersection behind the origin, or origin inside the box
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray_origin[axis];
        let (lo, hi) = (aabb_min[axis], aabb_max[axis]);
        if ray_dir[axis].abs() < 1e-10 {
            // Parallel to this slab: must already lie between its planes
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / ray_dir[axis];
        let t1 = (lo - origin) * inv;
        let t2 = (hi - origin) * inv;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    if t_max >= t_min && t_min >= 0.0 {
        Some(t_min)
    } else {
        None
    }
}

/// Computes the outward normal of the AABB face nearest to `point`.
pub fn aabb_surface_normal(point: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Vec3 {
    let center = (aabb_min + aabb_max) * 0.5;
    let half_extents = ((aabb_max - aabb_min) * 0.5).max(Vec3::splat(1e-6));
    let normalized = (point - center) / half_extents;
    let abs_normalized = normalized.abs();

    if abs_normalized.x >= abs_normalized.y && abs_normalized.x >= abs_normalized.z {
        Vec3::new(normalized.x.signum(), 0.0, 0.0)
    } else if abs_normalized.y >= abs_normalized.z {
        Vec3::new(0.0, normalized.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, normalized.z.signum())
    }
}

/// Ray-sphere entry distance, `None` when missing or starting inside.
pub fn ray_sphere_intersect(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = ray_origin - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = offset.dot(ray_dir);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

/// Closest point inside an AABB to `point`.
#[inline]
pub fn closest_point_on_aabb(point: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Vec3 {
    point.clamp(aabb_min, aabb_max)
}

// =============================================================================
// OrientedBox
// =============================================================================

/// Box with a center, a rotation and half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl OrientedBox {
    pub fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            rotation,
            half_extents,
        }
    }

    #[inline]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.center)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.to_local(point);
        local.abs().cmple(self.half_extents).all()
    }

    /// Entry distance and world normal of a ray against this box.
    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        let inverse = self.rotation.inverse();
        let local_origin = inverse * (origin - self.center);
        let local_dir = inverse * direction;
        let t = ray_aabb_intersect(local_origin, local_dir, -self.half_extents, self.half_extents)?;
        let local_normal = aabb_surface_normal(
            local_origin + local_dir * t,
            -self.half_extents,
            self.half_extents,
        );
        Some((t, self.rotation * local_normal))
    }

    /// Contact of a sphere touching this box within `skin`.
    ///
    /// A sphere whose center lies inside the box is pushed out through the
    /// nearest face.
    pub fn sphere_contact(&self, center: Vec3, radius: f32, skin: f32) -> Option<ShapeContact> {
        let local = self.to_local(center);
        let closest = closest_point_on_aabb(local, -self.half_extents, self.half_extents);
        let offset = local - closest;
        let distance = offset.length();

        if distance > 1e-6 {
            if distance > radius + skin {
                return None;
            }
            return Some(ShapeContact {
                normal: self.rotation * (offset / distance),
                depth: radius - distance,
            });
        }

        // Center inside: leave through the face with the least penetration
        let to_face = self.half_extents - local.abs();
        let local_normal = aabb_surface_normal(local, -self.half_extents, self.half_extents);
        let axis_depth = to_face.min_element();
        Some(ShapeContact {
            normal: self.rotation * local_normal,
            depth: radius + axis_depth,
        })
    }
}

/// Contact of a sphere touching another sphere within `skin`.
pub fn sphere_sphere_contact(
    center: Vec3,
    radius: f32,
    other_center: Vec3,
    other_radius: f32,
    skin: f32,
) -> Option<ShapeContact> {
    let offset = center - other_center;
    let distance = offset.length();
    let reach = radius + other_radius;
    if distance > reach + skin {
        return None;
    }
    Some(ShapeContact {
        normal: offset.normalize_or(Vec3::Y),
        depth: reach - distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_aabb_from_front() {
        let t = ray_aabb_intersect(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::Z,
            Vec3::splat(-1.0),
            Vec3::ONE,
        )
        .expect("ray should hit");
        assert!((t - 4.0).abs() < 0.001, "Expected t=4.0, got t={}", t);
    }

    #[test]
    fn test_ray_misses_aabb() {
        let result = ray_aabb_intersect(
            Vec3::new(5.0, 0.0, -5.0),
            Vec3::Z,
            Vec3::splat(-1.0),
            Vec3::ONE,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_ray_starting_inside_aabb_does_not_hit() {
        let result = ray_aabb_intersect(Vec3::ZERO, Vec3::NEG_Y, Vec3::splat(-1.0), Vec3::ONE);
        assert!(result.is_none());
    }

    #[test]
    fn test_ray_aabb_behind_origin() {
        let result = ray_aabb_intersect(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::Z,
            Vec3::splat(-1.0),
            Vec3::ONE,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_surface_normal_faces() {
        let min = Vec3::splat(-1.0);
        let max = Vec3::ONE;
        assert_eq!(aabb_surface_normal(Vec3::new(1.0, 0.2, 0.0), min, max), Vec3::X);
        assert_eq!(aabb_surface_normal(Vec3::new(0.1, -1.0, 0.3), min, max), Vec3::NEG_Y);
    }

    #[test]
    fn test_ray_sphere_entry() {
        let t = ray_sphere_intersect(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, Vec3::ZERO, 1.0)
            .expect("ray should hit");
        assert!((t - 4.0).abs() < 1e-5);
        assert!(ray_sphere_intersect(Vec3::ZERO, Vec3::Y, Vec3::ZERO, 1.0).is_none());
        assert!(ray_sphere_intersect(Vec3::new(3.0, 5.0, 0.0), Vec3::NEG_Y, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_oriented_box_raycast_rotated() {
        let slab = OrientedBox::new(
            Vec3::ZERO,
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_4),
            Vec3::new(5.0, 0.5, 5.0),
        );
        let (t, normal) = slab
            .raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y)
            .expect("ray should hit");
        assert!(t > 4.0 && t < 5.0);
        let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4) * Vec3::Y;
        assert!((normal - expected).length() < 1e-5);
    }

    #[test]
    fn test_sphere_resting_on_box() {
        let ground = OrientedBox::new(Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, Vec3::new(10.0, 0.5, 10.0));
        let contact = ground
            .sphere_contact(Vec3::new(0.0, 0.49, 0.0), 0.5, 0.01)
            .expect("sphere should touch");
        assert!((contact.normal - Vec3::Y).length() < 1e-5);
        assert!((contact.depth - 0.01).abs() < 1e-5);

        assert!(ground.sphere_contact(Vec3::new(0.0, 2.0, 0.0), 0.5, 0.01).is_none());
    }

    #[test]
    fn test_sphere_center_inside_box_leaves_nearest_face() {
        let block = OrientedBox::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
        let contact = block.sphere_contact(Vec3::new(0.0, 0.0, 0.8), 0.5, 0.0).unwrap();
        assert_eq!(contact.normal, Vec3::Z);
        assert!((contact.depth - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_sphere_contact() {
        let contact = sphere_sphere_contact(Vec3::new(0.0, 1.4, 0.0), 0.5, Vec3::ZERO, 1.0, 0.01).unwrap();
        assert!((contact.normal - Vec3::Y).length() < 1e-6);
        assert!((contact.depth - 0.1).abs() < 1e-5);
        assert!(sphere_sphere_contact(Vec3::new(0.0, 3.0, 0.0), 0.5, Vec3::ZERO, 1.0, 0.01).is_none());
    }
}

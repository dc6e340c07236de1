//! Gravity Sources
//!
//! Pure functions mapping a world position to a gravity contribution.
//! Every source is a plain value: evaluating it never mutates anything, so
//! the same source can be sampled any number of times per step.
//!
//! # Source Kinds
//!
//! - **Uniform**: constant vector, used as the level-wide default
//! - **Sphere**: pulls toward a center, with outer falloff and an optional hollow core
//! - **Box**: pulls toward the nearest face from outside, away from it from inside
//! - **Plane**: pulls along the negative plane normal within a range
//!
//! # Example
//!
//! ```rust,ignore
//! use gravity_locomotion_engine::gravity::{GravitySource, SphereGravity};
//! use glam::Vec3;
//!
//! let planet = GravitySource::Sphere(SphereGravity {
//!     outer_radius: 10.0,
//!     outer_falloff_radius: 15.0,
//!     ..SphereGravity::default()
//! });
//! let g = planet.evaluate(Vec3::new(0.0, 12.0, 0.0));
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Standard gravity magnitude in meters per second squared
pub const STANDARD_GRAVITY: f32 = 9.81;

/// Distances below this are treated as "at the source center"
const DISTANCE_EPSILON: f32 = 1e-5;

/// Falloff bands narrower than this are treated as hard edges
const BAND_EPSILON: f32 = 1e-6;

/// Fraction of a linear falloff band covered by `offset`, clamped to `[0, 1]`.
///
/// A degenerate band yields 1.0 (fully attenuated).
#[inline]
fn falloff_fraction(offset: f32, band: f32) -> f32 {
    if band <= BAND_EPSILON {
        1.0
    } else {
        (offset / band).clamp(0.0, 1.0)
    }
}

// =============================================================================
// Uniform
// =============================================================================

/// Constant gravity everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformGravity {
    /// Gravity acceleration vector (m/s^2)
    pub gravity: Vec3,
}

impl Default for UniformGravity {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -STANDARD_GRAVITY, 0.0),
        }
    }
}

impl UniformGravity {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }

    #[inline]
    pub fn evaluate(&self, _position: Vec3) -> Vec3 {
        self.gravity
    }
}

// =============================================================================
// Sphere
// =============================================================================

/// Radial gravity pulling toward `center`.
///
/// Radii are ordered `inner_falloff <= inner <= outer <= outer_falloff`:
/// - zero below `inner_falloff_radius` (hollow core)
/// - ramps up to full strength at `inner_radius`
/// - full strength up to `outer_radius`
/// - ramps down to zero at `outer_falloff_radius`, zero beyond
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereGravity {
    /// World-space center of attraction
    pub center: Vec3,
    /// Full-strength gravity magnitude (m/s^2)
    pub gravity: f32,
    pub outer_radius: f32,
    pub outer_falloff_radius: f32,
    pub inner_falloff_radius: f32,
    pub inner_radius: f32,
}

impl Default for SphereGravity {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            gravity: STANDARD_GRAVITY,
            outer_radius: 10.0,
            outer_falloff_radius: 15.0,
            inner_falloff_radius: 0.0,
            inner_radius: 0.0,
        }
    }
}

impl SphereGravity {
    /// Solid sphere at `center` with the given outer band.
    pub fn new(center: Vec3, gravity: f32, outer_radius: f32, outer_falloff_radius: f32) -> Self {
        Self {
            center,
            gravity,
            outer_radius,
            outer_falloff_radius,
            ..Default::default()
        }
        .validated()
    }

    /// Clamp the radii into their required ordering.
    pub fn validated(mut self) -> Self {
        self.inner_falloff_radius = self.inner_falloff_radius.max(0.0);
        self.inner_radius = self.inner_radius.max(self.inner_falloff_radius);
        self.outer_radius = self.outer_radius.max(self.inner_radius);
        self.outer_falloff_radius = self.outer_falloff_radius.max(self.outer_radius);
        self
    }

    pub fn evaluate(&self, position: Vec3) -> Vec3 {
        let vector = self.center - position;
        let distance = vector.length();
        if distance > self.outer_falloff_radius
            || distance < self.inner_falloff_radius
            || distance < DISTANCE_EPSILON
        {
            return Vec3::ZERO;
        }

        // `vector` is not normalized: dividing by distance gives magnitude `gravity`
        let mut g = self.gravity / distance;
        if distance > self.outer_radius {
            g *= 1.0
                - falloff_fraction(
                    distance - self.outer_radius,
                    self.outer_falloff_radius - self.outer_radius,
                );
        } else if distance < self.inner_radius {
            g *= 1.0
                - falloff_fraction(
                    self.inner_radius - distance,
                    self.inner_radius - self.inner_falloff_radius,
                );
        }
        vector * g
    }
}

// =============================================================================
// Box
// =============================================================================

/// Oriented box gravity.
///
/// `boundary_distance` holds the half-extents of the box surface.
/// Outside the surface, gravity pulls toward the nearest surface point and
/// falls off between `outer_distance` and `outer_falloff_distance`.
/// Inside, only the axis of the nearest face contributes; the component
/// points away from that face, full within `inner_distance` of it and
/// fading out at `inner_falloff_distance`. A degenerate inner band leaves
/// the whole interior at full strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxGravity {
    pub center: Vec3,
    pub rotation: Quat,
    pub gravity: f32,
    pub boundary_distance: Vec3,
    pub inner_distance: f32,
    pub inner_falloff_distance: f32,
    pub outer_distance: f32,
    pub outer_falloff_distance: f32,
}

impl Default for BoxGravity {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            gravity: STANDARD_GRAVITY,
            boundary_distance: Vec3::ONE,
            inner_distance: 0.0,
            inner_falloff_distance: 0.0,
            outer_distance: 0.0,
            outer_falloff_distance: 0.0,
        }
    }
}

impl BoxGravity {
    /// Axis-aligned box at `center` with the given half-extents.
    pub fn new(center: Vec3, gravity: f32, boundary_distance: Vec3) -> Self {
        Self {
            center,
            gravity,
            boundary_distance,
            ..Default::default()
        }
        .validated()
    }

    /// Clamp the distance bands so that
    /// `inner <= inner_falloff <= min(boundary)` and `outer <= outer_falloff`.
    pub fn validated(mut self) -> Self {
        self.rotation = self.rotation.normalize();
        if !self.rotation.is_finite() {
            self.rotation = Quat::IDENTITY;
        }
        self.boundary_distance = self.boundary_distance.max(Vec3::ZERO);
        let max_inner = self.boundary_distance.min_element();
        self.inner_distance = self.inner_distance.clamp(0.0, max_inner);
        self.inner_falloff_distance = self
            .inner_falloff_distance
            .min(max_inner)
            .max(self.inner_distance);
        self.outer_distance = self.outer_distance.max(0.0);
        self.outer_falloff_distance = self.outer_falloff_distance.max(self.outer_distance);
        self
    }

    /// Signed gravity component for the interior axis nearest to a face.
    fn inner_component(&self, coordinate: f32, distance: f32) -> f32 {
        let mut g = self.gravity;
        let band = self.inner_falloff_distance - self.inner_distance;
        if distance > self.inner_distance && band > BAND_EPSILON {
            g *= 1.0 - falloff_fraction(distance - self.inner_distance, band);
        }
        if coordinate > 0.0 { -g } else { g }
    }

    pub fn evaluate(&self, position: Vec3) -> Vec3 {
        let local = self.rotation.inverse() * (position - self.center);
        let bounds = self.boundary_distance;

        let mut vector = Vec3::ZERO;
        let mut outside = 0;
        for axis in 0..3 {
            if local[axis] > bounds[axis] {
                vector[axis] = bounds[axis] - local[axis];
                outside += 1;
            } else if local[axis] < -bounds[axis] {
                vector[axis] = -bounds[axis] - local[axis];
                outside += 1;
            }
        }

        if outside > 0 {
            // One axis: the excess along that axis. Edge/corner: full offset length.
            let distance = if outside == 1 {
                (vector.x + vector.y + vector.z).abs()
            } else {
                vector.length()
            };
            if distance > self.outer_falloff_distance || distance < DISTANCE_EPSILON {
                return Vec3::ZERO;
            }
            let mut g = self.gravity / distance;
            if distance > self.outer_distance {
                g *= 1.0
                    - falloff_fraction(
                        distance - self.outer_distance,
                        self.outer_falloff_distance - self.outer_distance,
                    );
            }
            return self.rotation * (vector * g);
        }

        let distances = bounds - local.abs();
        let axis = if distances.x < distances.y {
            if distances.x < distances.z { 0 } else { 2 }
        } else if distances.y < distances.z {
            1
        } else {
            2
        };
        vector[axis] = self.inner_component(local[axis], distances[axis]);
        self.rotation * vector
    }
}

// =============================================================================
// Plane
// =============================================================================

/// Planar gravity pulling along `-normal`.
///
/// Zero above `range`; full strength on and below the plane. With
/// `falloff` enabled the strength fades linearly from full at the plane to
/// zero at `range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneGravity {
    /// Any point on the plane
    pub point: Vec3,
    /// Plane up direction (normalized on validation)
    pub normal: Vec3,
    pub gravity: f32,
    pub range: f32,
    pub falloff: bool,
}

impl Default for PlaneGravity {
    fn default() -> Self {
        Self {
            point: Vec3::ZERO,
            normal: Vec3::Y,
            gravity: STANDARD_GRAVITY,
            range: 1.0,
            falloff: true,
        }
    }
}

impl PlaneGravity {
    pub fn new(point: Vec3, normal: Vec3, gravity: f32, range: f32) -> Self {
        Self {
            point,
            normal,
            gravity,
            range,
            falloff: true,
        }
        .validated()
    }

    pub fn validated(mut self) -> Self {
        self.normal = self.normal.normalize_or(Vec3::Y);
        self.range = self.range.max(0.0);
        self
    }

    /// Signed distance of `position` above the plane.
    #[inline]
    pub fn distance(&self, position: Vec3) -> f32 {
        self.normal.dot(position - self.point)
    }

    pub fn evaluate(&self, position: Vec3) -> Vec3 {
        let distance = self.distance(position);
        if distance > self.range {
            return Vec3::ZERO;
        }
        let mut g = -self.gravity;
        if self.falloff && distance > 0.0 {
            g *= 1.0 - falloff_fraction(distance, self.range);
        }
        self.normal * g
    }
}

// =============================================================================
// GravitySource
// =============================================================================

/// A single gravity contribution, dispatched by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GravitySource {
    Uniform(UniformGravity),
    Sphere(SphereGravity),
    Box(BoxGravity),
    Plane(PlaneGravity),
}

impl Default for GravitySource {
    fn default() -> Self {
        Self::Uniform(UniformGravity::default())
    }
}

impl GravitySource {
    /// Gravity contribution at `position`.
    pub fn evaluate(&self, position: Vec3) -> Vec3 {
        match self {
            GravitySource::Uniform(source) => source.evaluate(position),
            GravitySource::Sphere(source) => source.evaluate(position),
            GravitySource::Box(source) => source.evaluate(position),
            GravitySource::Plane(source) => source.evaluate(position),
        }
    }

    /// Copy of this source with degenerate parameters clamped.
    pub fn validated(self) -> Self {
        match self {
            GravitySource::Uniform(source) => GravitySource::Uniform(source),
            GravitySource::Sphere(source) => GravitySource::Sphere(source.validated()),
            GravitySource::Box(source) => GravitySource::Box(source.validated()),
            GravitySource::Plane(source) => GravitySource::Plane(source.validated()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            GravitySource::Uniform(_) => "uniform",
            GravitySource::Sphere(_) => "sphere",
            GravitySource::Box(_) => "box",
            GravitySource::Plane(_) => "plane",
        }
    }
}

impl From<UniformGravity> for GravitySource {
    fn from(source: UniformGravity) -> Self {
        GravitySource::Uniform(source)
    }
}

impl From<SphereGravity> for GravitySource {
    fn from(source: SphereGravity) -> Self {
        GravitySource::Sphere(source)
    }
}

impl From<BoxGravity> for GravitySource {
    fn from(source: BoxGravity) -> Self {
        GravitySource::Box(source)
    }
}

impl From<PlaneGravity> for GravitySource {
    fn from(source: PlaneGravity) -> Self {
        GravitySource::Plane(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn sphere_10_15() -> SphereGravity {
        SphereGravity::new(Vec3::ZERO, 9.81, 10.0, 15.0)
    }

    // Sphere

    #[test]
    fn test_sphere_full_strength_at_outer_radius() {
        let g = sphere_10_15().evaluate(Vec3::new(10.0, 0.0, 0.0));
        assert!((g.length() - 9.81).abs() < EPSILON, "got {}", g.length());
        assert!(g.x < 0.0, "should pull toward the center");
    }

    #[test]
    fn test_sphere_zero_at_falloff_radius() {
        let g = sphere_10_15().evaluate(Vec3::new(15.0, 0.0, 0.0));
        assert_eq!(g.length(), 0.0);
    }

    #[test]
    fn test_sphere_zero_beyond_falloff_radius() {
        let g = sphere_10_15().evaluate(Vec3::new(0.0, 20.0, 0.0));
        assert_eq!(g, Vec3::ZERO);
    }

    #[test]
    fn test_sphere_halfway_through_falloff() {
        let g = sphere_10_15().evaluate(Vec3::new(0.0, 0.0, -12.5));
        assert!((g.length() - 9.81 * 0.5).abs() < EPSILON);
        assert!(g.z > 0.0);
    }

    #[test]
    fn test_sphere_center_is_zero() {
        assert_eq!(sphere_10_15().evaluate(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_sphere_hollow_core() {
        let sphere = SphereGravity {
            inner_falloff_radius: 2.0,
            inner_radius: 4.0,
            ..sphere_10_15()
        }
        .validated();

        assert_eq!(sphere.evaluate(Vec3::new(1.0, 0.0, 0.0)), Vec3::ZERO);
        let halfway = sphere.evaluate(Vec3::new(3.0, 0.0, 0.0));
        assert!((halfway.length() - 9.81 * 0.5).abs() < EPSILON);
        let full = sphere.evaluate(Vec3::new(4.0, 0.0, 0.0));
        assert!((full.length() - 9.81).abs() < EPSILON);
    }

    #[test]
    fn test_sphere_validation_orders_radii() {
        let sphere = SphereGravity {
            inner_falloff_radius: -1.0,
            inner_radius: 6.0,
            outer_radius: 3.0,
            outer_falloff_radius: 2.0,
            ..Default::default()
        }
        .validated();
        assert_eq!(sphere.inner_falloff_radius, 0.0);
        assert_eq!(sphere.inner_radius, 6.0);
        assert_eq!(sphere.outer_radius, 6.0);
        assert_eq!(sphere.outer_falloff_radius, 6.0);
    }

    // Plane

    #[test]
    fn test_plane_full_at_surface_zero_at_range() {
        let plane = PlaneGravity::new(Vec3::ZERO, Vec3::Y, 9.81, 5.0);
        let at_surface = plane.evaluate(Vec3::new(3.0, 0.0, -2.0));
        assert!((at_surface.length() - 9.81).abs() < EPSILON);
        assert!(at_surface.y < 0.0);

        let at_range = plane.evaluate(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(at_range.length(), 0.0);

        assert_eq!(plane.evaluate(Vec3::new(0.0, 6.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn test_plane_full_below_surface() {
        let plane = PlaneGravity::new(Vec3::ZERO, Vec3::Y, 9.81, 5.0);
        let below = plane.evaluate(Vec3::new(0.0, -3.0, 0.0));
        assert!((below.length() - 9.81).abs() < EPSILON);
    }

    #[test]
    fn test_plane_without_falloff() {
        let plane = PlaneGravity {
            falloff: false,
            ..PlaneGravity::new(Vec3::ZERO, Vec3::Y, 9.81, 5.0)
        };
        let g = plane.evaluate(Vec3::new(0.0, 4.0, 0.0));
        assert!((g.length() - 9.81).abs() < EPSILON);
    }

    #[test]
    fn test_plane_tilted_normal_is_normalized() {
        let plane = PlaneGravity::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 2.0), 9.81, 5.0);
        assert!((plane.normal.length() - 1.0).abs() < EPSILON);
        let g = plane.evaluate(Vec3::ZERO);
        assert!((g.normalize() + plane.normal).length() < EPSILON);
    }

    // Box

    #[test]
    fn test_box_inside_points_along_nearest_axis() {
        let source = BoxGravity::new(Vec3::ZERO, 9.81, Vec3::ONE);
        let g = source.evaluate(Vec3::new(0.5, 0.0, 0.0));
        assert!((g - Vec3::new(-9.81, 0.0, 0.0)).length() < EPSILON, "got {g:?}");
    }

    #[test]
    fn test_box_inside_falloff_band() {
        let source = BoxGravity {
            boundary_distance: Vec3::splat(4.0),
            inner_distance: 1.0,
            inner_falloff_distance: 3.0,
            ..Default::default()
        }
        .validated();
        // 2.0 from the +y face: halfway through the band
        let g = source.evaluate(Vec3::new(0.0, 2.0, 0.2));
        assert!((g - Vec3::new(0.0, -9.81 * 0.5, 0.0)).length() < EPSILON);
        // Deep interior is beyond the falloff band
        assert_eq!(source.evaluate(Vec3::new(0.1, 0.0, 0.2)).length(), 0.0);
    }

    #[test]
    fn test_box_outside_single_face() {
        let source = BoxGravity {
            outer_distance: 2.0,
            outer_falloff_distance: 4.0,
            ..BoxGravity::new(Vec3::ZERO, 9.81, Vec3::ONE)
        }
        .validated();
        let near = source.evaluate(Vec3::new(0.0, 2.0, 0.0));
        assert!((near - Vec3::new(0.0, -9.81, 0.0)).length() < EPSILON);

        let fading = source.evaluate(Vec3::new(0.0, 0.0, -4.0));
        assert!((fading - Vec3::new(0.0, 0.0, 9.81 * 0.5)).length() < EPSILON);

        assert_eq!(source.evaluate(Vec3::new(6.0, 0.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn test_box_outside_edge_uses_offset_length() {
        let source = BoxGravity {
            outer_distance: 1.0,
            outer_falloff_distance: 3.0,
            ..BoxGravity::new(Vec3::ZERO, 9.81, Vec3::ONE)
        }
        .validated();
        let p = Vec3::new(2.0, 2.0, 0.0);
        let g = source.evaluate(p);
        let distance = 2.0_f32.sqrt();
        let expected = 9.81 * (1.0 - (distance - 1.0) / 2.0);
        assert!((g.length() - expected).abs() < EPSILON);
        assert!((g.normalize() - Vec3::new(-1.0, -1.0, 0.0).normalize()).length() < EPSILON);
    }

    #[test]
    fn test_box_edge_formula_matches_face_formula_at_boundary() {
        let source = BoxGravity {
            outer_distance: 1.0,
            outer_falloff_distance: 3.0,
            ..BoxGravity::new(Vec3::ZERO, 9.81, Vec3::ONE)
        }
        .validated();
        // Just past the x = 1 boundary on the y face vs. exactly on it
        let face = source.evaluate(Vec3::new(1.0, 2.0, 0.0));
        let edge = source.evaluate(Vec3::new(1.0 + 1e-5, 2.0, 0.0));
        assert!((face - edge).length() < 1e-3);
    }

    #[test]
    fn test_box_rotation() {
        let source = BoxGravity {
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            outer_falloff_distance: 5.0,
            outer_distance: 5.0,
            ..BoxGravity::new(Vec3::ZERO, 9.81, Vec3::new(1.0, 3.0, 1.0))
        }
        .validated();
        // Rotated 90 degrees about z: world +y maps onto the short local x axis
        let g = source.evaluate(Vec3::new(0.0, 2.0, 0.0));
        assert!((g - Vec3::new(0.0, -9.81, 0.0)).length() < EPSILON, "got {g:?}");
    }

    #[test]
    fn test_box_validation_clamps_inner_bands() {
        let source = BoxGravity {
            boundary_distance: Vec3::new(3.0, -1.0, 2.0),
            inner_distance: 5.0,
            inner_falloff_distance: 1.0,
            outer_distance: 4.0,
            outer_falloff_distance: 2.0,
            ..Default::default()
        }
        .validated();
        assert_eq!(source.boundary_distance, Vec3::new(3.0, 0.0, 2.0));
        assert_eq!(source.inner_distance, 0.0);
        assert_eq!(source.inner_falloff_distance, 0.0);
        assert_eq!(source.outer_falloff_distance, 4.0);
    }

    // Dispatch

    #[test]
    fn test_source_dispatch_matches_variant() {
        let sphere = sphere_10_15();
        let source = GravitySource::from(sphere);
        let p = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(source.evaluate(p), sphere.evaluate(p));
        assert_eq!(source.kind_name(), "sphere");
    }

    #[test]
    fn test_source_serde_tagged() {
        let source = GravitySource::Plane(PlaneGravity::new(Vec3::ZERO, Vec3::Y, 9.81, 5.0));
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains("\"kind\":\"plane\""));
        let back: GravitySource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn test_source_serde_partial_fields_use_defaults() {
        let source: GravitySource =
            serde_json::from_str(r#"{ "kind": "sphere", "outer_radius": 20.0 }"#).unwrap();
        match source {
            GravitySource::Sphere(sphere) => {
                assert_eq!(sphere.outer_radius, 20.0);
                assert_eq!(sphere.gravity, STANDARD_GRAVITY);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }
}

//! Gravity Field
//!
//! Aggregates the active gravity sources of a scene and derives the local
//! "up" axis from them.
//!
//! The field does not own the lifetime of its sources: the scene registers a
//! source when it activates and unregisters it when it deactivates. Sources
//! are identified by a scene-allocated [`SourceId`].
//!
//! # Up Axis Policy
//!
//! When the aggregate gravity at a position is (nearly) zero there is no
//! meaningful "up". Every consumer keeps its own last known up axis and
//! passes it in; the field hands it back unchanged in that case.
//!
//! # Example
//!
//! ```rust,ignore
//! use gravity_locomotion_engine::gravity::{GravityField, GravitySource, SourceId, UniformGravity};
//! use glam::Vec3;
//!
//! let mut field = GravityField::new();
//! field.register(SourceId(1), UniformGravity::default().into())?;
//!
//! let sample = field.sample(Vec3::ZERO, Vec3::Y);
//! assert_eq!(sample.up_axis, Vec3::Y);
//! ```

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::source::GravitySource;

/// Squared gravity magnitudes below this have no usable direction
const MIN_GRAVITY_SQUARED: f32 = 1e-10;

/// Up axis used before any gravity has been observed
pub const DEFAULT_UP_AXIS: Vec3 = Vec3::Y;

/// Scene-allocated handle for a registered gravity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Gravity and up axis sampled at one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySample {
    /// Aggregate gravity acceleration (m/s^2)
    pub gravity: Vec3,
    /// Unit vector opposite to `gravity`, or the caller's previous axis
    pub up_axis: Vec3,
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Registry misuse. The field is left untouched when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityFieldError {
    /// The id is already registered.
    DuplicateSource(SourceId),
    /// The id is not registered.
    UnknownSource(SourceId),
}

impl fmt::Display for GravityFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GravityFieldError::DuplicateSource(id) => {
                write!(f, "duplicated registration of gravity {id}")
            }
            GravityFieldError::UnknownSource(id) => {
                write!(f, "unregistration of unknown gravity {id}")
            }
        }
    }
}

impl std::error::Error for GravityFieldError {}

// ============================================================================
// FIELD
// ============================================================================

/// The set of active gravity sources for one scene.
#[derive(Debug, Clone, Default)]
pub struct GravityField {
    sources: Vec<(SourceId, GravitySource)>,
}

impl GravityField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a source. The source is validated before it is stored.
    pub fn register(&mut self, id: SourceId, source: GravitySource) -> Result<(), GravityFieldError> {
        if self.contains(id) {
            tracing::warn!(%id, "duplicated registration of gravity source");
            return Err(GravityFieldError::DuplicateSource(id));
        }
        tracing::debug!(%id, kind = source.kind_name(), "gravity source registered");
        self.sources.push((id, source.validated()));
        Ok(())
    }

    /// Deactivate a source, returning its last parameters.
    pub fn unregister(&mut self, id: SourceId) -> Result<GravitySource, GravityFieldError> {
        match self.index_of(id) {
            Some(index) => {
                let (_, source) = self.sources.remove(index);
                tracing::debug!(%id, kind = source.kind_name(), "gravity source unregistered");
                Ok(source)
            }
            None => {
                tracing::warn!(%id, "unregistration of unknown gravity source");
                Err(GravityFieldError::UnknownSource(id))
            }
        }
    }

    /// Replace the parameters of a registered source (e.g. a moving planet).
    pub fn update(&mut self, id: SourceId, source: GravitySource) -> Result<(), GravityFieldError> {
        match self.index_of(id) {
            Some(index) => {
                self.sources[index].1 = source.validated();
                Ok(())
            }
            None => {
                tracing::warn!(%id, "update of unknown gravity source");
                Err(GravityFieldError::UnknownSource(id))
            }
        }
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: SourceId) -> Option<&GravitySource> {
        self.sources.iter().find(|(sid, _)| *sid == id).map(|(_, source)| source)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterate over the active sources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &GravitySource)> {
        self.sources.iter().map(|(id, source)| (*id, source))
    }

    /// Remove every source (scene teardown).
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    fn index_of(&self, id: SourceId) -> Option<usize> {
        self.sources.iter().position(|(sid, _)| *sid == id)
    }

    /// Sum of every source's contribution at `position`.
    pub fn gravity(&self, position: Vec3) -> Vec3 {
        self.sources
            .iter()
            .fold(Vec3::ZERO, |g, (_, source)| g + source.evaluate(position))
    }

    /// `-normalize(gravity(position))`, or `None` where gravity vanishes.
    pub fn up_axis(&self, position: Vec3) -> Option<Vec3> {
        Self::up_from_gravity(self.gravity(position))
    }

    /// Up axis at `position`, falling back to `previous` where gravity vanishes.
    pub fn up_axis_or(&self, position: Vec3, previous: Vec3) -> Vec3 {
        self.up_axis(position).unwrap_or(previous)
    }

    /// Gravity and up axis with a single aggregation pass.
    pub fn sample(&self, position: Vec3, previous_up: Vec3) -> GravitySample {
        let gravity = self.gravity(position);
        GravitySample {
            gravity,
            up_axis: Self::up_from_gravity(gravity).unwrap_or(previous_up),
        }
    }

    fn up_from_gravity(gravity: Vec3) -> Option<Vec3> {
        if gravity.length_squared() < MIN_GRAVITY_SQUARED {
            None
        } else {
            Some(-gravity.normalize())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::source::{PlaneGravity, SphereGravity, UniformGravity};

    fn three_sources() -> Vec<(SourceId, GravitySource)> {
        vec![
            (SourceId(1), SphereGravity::new(Vec3::ZERO, 9.81, 10.0, 15.0).into()),
            (
                SourceId(2),
                PlaneGravity::new(Vec3::new(0.0, -10.0, 0.0), Vec3::Y, 9.81, 5.0).into(),
            ),
            (SourceId(3), UniformGravity::new(Vec3::new(0.0, -9.81, 0.0)).into()),
        ]
    }

    #[test]
    fn test_empty_field_has_no_gravity() {
        let field = GravityField::new();
        assert!(field.is_empty());
        assert_eq!(field.gravity(Vec3::new(1.0, 2.0, 3.0)), Vec3::ZERO);
        assert_eq!(field.up_axis(Vec3::ZERO), None);
    }

    #[test]
    fn test_superposition_in_any_order() {
        let sources = three_sources();
        let probes = [
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(4.0, -7.0, 1.0),
            Vec3::new(-12.0, 0.5, 3.0),
        ];

        let mut forward = GravityField::new();
        for (id, source) in &sources {
            forward.register(*id, *source).unwrap();
        }
        let mut reversed = GravityField::new();
        for (id, source) in sources.iter().rev() {
            reversed.register(*id, *source).unwrap();
        }

        for p in probes {
            let expected = sources
                .iter()
                .fold(Vec3::ZERO, |g, (_, source)| g + source.evaluate(p));
            assert!((forward.gravity(p) - expected).length() < 1e-5);
            assert!((reversed.gravity(p) - expected).length() < 1e-5);
        }
    }

    #[test]
    fn test_up_axis_is_negated_unit_gravity() {
        let mut field = GravityField::new();
        for (id, source) in three_sources() {
            field.register(id, source).unwrap();
        }
        let p = Vec3::new(2.0, 3.0, -1.0);
        let up = field.up_axis(p).unwrap();
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert_eq!(up, -field.gravity(p).normalize());
    }

    #[test]
    fn test_zero_gravity_retains_previous_axis() {
        let mut field = GravityField::new();
        field
            .register(SourceId(7), SphereGravity::new(Vec3::ZERO, 9.81, 1.0, 2.0).into())
            .unwrap();
        let previous = Vec3::new(0.0, 0.0, 1.0);
        let far = Vec3::new(100.0, 0.0, 0.0);
        assert_eq!(field.up_axis_or(far, previous), previous);
        let sample = field.sample(far, previous);
        assert_eq!(sample.gravity, Vec3::ZERO);
        assert_eq!(sample.up_axis, previous);
    }

    #[test]
    fn test_sample_matches_separate_queries() {
        let mut field = GravityField::new();
        for (id, source) in three_sources() {
            field.register(id, source).unwrap();
        }
        let p = Vec3::new(1.0, 1.0, 1.0);
        let sample = field.sample(p, Vec3::Y);
        assert_eq!(sample.gravity, field.gravity(p));
        assert_eq!(sample.up_axis, field.up_axis(p).unwrap());
    }

    #[test]
    fn test_duplicate_register_is_rejected_without_change() {
        let mut field = GravityField::new();
        let source: GravitySource = UniformGravity::default().into();
        field.register(SourceId(1), source).unwrap();

        let err = field.register(SourceId(1), source).unwrap_err();
        assert_eq!(err, GravityFieldError::DuplicateSource(SourceId(1)));
        assert_eq!(field.len(), 1);
        assert_eq!(field.gravity(Vec3::ZERO), Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn test_unregister_unknown_is_rejected() {
        let mut field = GravityField::new();
        let err = field.unregister(SourceId(42)).unwrap_err();
        assert_eq!(err, GravityFieldError::UnknownSource(SourceId(42)));
        assert!(err.to_string().contains("source#42"));
    }

    #[test]
    fn test_register_unregister_lifecycle() {
        let mut field = GravityField::new();
        for (id, source) in three_sources() {
            field.register(id, source).unwrap();
        }
        assert_eq!(field.len(), 3);

        let removed = field.unregister(SourceId(3)).unwrap();
        assert_eq!(removed.kind_name(), "uniform");
        assert!(!field.contains(SourceId(3)));

        // Re-activation after deactivation is allowed
        field.register(SourceId(3), removed).unwrap();
        assert_eq!(field.len(), 3);

        field.clear();
        assert!(field.is_empty());
    }

    #[test]
    fn test_update_moves_source() {
        let mut field = GravityField::new();
        field
            .register(SourceId(1), SphereGravity::new(Vec3::ZERO, 9.81, 10.0, 15.0).into())
            .unwrap();
        field
            .update(
                SourceId(1),
                SphereGravity::new(Vec3::new(0.0, 100.0, 0.0), 9.81, 10.0, 15.0).into(),
            )
            .unwrap();
        let up = field.up_axis(Vec3::new(0.0, 95.0, 0.0)).unwrap();
        assert!((up - Vec3::NEG_Y).length() < 1e-5);

        assert!(field.update(SourceId(9), GravitySource::default()).is_err());
    }

    #[test]
    fn test_register_validates_source() {
        let mut field = GravityField::new();
        let inverted = SphereGravity {
            outer_radius: 10.0,
            outer_falloff_radius: 5.0,
            ..Default::default()
        };
        field.register(SourceId(1), inverted.into()).unwrap();
        match field.get(SourceId(1)) {
            Some(GravitySource::Sphere(sphere)) => assert_eq!(sphere.outer_falloff_radius, 10.0),
            other => panic!("unexpected source {other:?}"),
        }
    }
}

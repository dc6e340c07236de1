//! Connected-body tracking
//!
//! When the character rests on a body that can carry it (kinematic, or at
//! least as heavy as the character), the anchor point under the character is
//! followed through the body's transform. The anchor's displacement since
//! the previous step, divided by the step time, is the connection velocity
//! that player movement is measured against.

use glam::Vec3;

use crate::physics::{BodyId, BodyInfo};

/// Anchor of the character on its connected body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Connection {
    /// Anchor in world space as of the last update
    pub world_position: Vec3,
    /// Anchor in the body's local space
    pub local_position: Vec3,
    /// Velocity of the anchor, zero unless connected for two steps in a row
    pub velocity: Vec3,
}

impl Connection {
    /// Whether `info` describes a body able to carry a character of `character_mass`.
    #[inline]
    pub fn can_carry(info: &BodyInfo, character_mass: f32) -> bool {
        info.kinematic || info.mass >= character_mass
    }

    /// Advance the anchor for this step.
    ///
    /// `same_body` must be true only when `info` belongs to the body that was
    /// connected on the previous step as well.
    pub fn update(&mut self, info: &BodyInfo, same_body: bool, character_position: Vec3, dt: f32) {
        if same_body && dt > 0.0 {
            let moved_anchor = info.transform.transform_point3(self.local_position);
            self.velocity = (moved_anchor - self.world_position) / dt;
        }
        self.world_position = character_position;
        self.local_position = info.transform.inverse().transform_point3(character_position);
    }

    pub fn reset_velocity(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}

/// Connected body of this step and the one before it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectionState {
    pub anchor: Connection,
    pub previous_body: Option<BodyId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Affine3A, Quat};

    fn kinematic_at(translation: Vec3, rotation: Quat) -> BodyInfo {
        BodyInfo {
            kinematic: true,
            mass: 1.0,
            transform: Affine3A::from_rotation_translation(rotation, translation),
        }
    }

    #[test]
    fn test_first_contact_has_no_velocity() {
        let mut connection = Connection::default();
        connection.update(&kinematic_at(Vec3::ZERO, Quat::IDENTITY), false, Vec3::new(0.0, 1.0, 0.0), 0.02);
        assert_eq!(connection.velocity, Vec3::ZERO);
        assert_eq!(connection.local_position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_translating_platform_velocity() {
        let mut connection = Connection::default();
        let position = Vec3::new(0.0, 1.0, 0.0);
        connection.update(&kinematic_at(Vec3::ZERO, Quat::IDENTITY), false, position, 0.5);
        connection.update(&kinematic_at(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY), true, position, 0.5);
        assert!((connection.velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotating_platform_carries_anchor() {
        let mut connection = Connection::default();
        let position = Vec3::new(2.0, 1.0, 0.0);
        connection.update(&kinematic_at(Vec3::ZERO, Quat::IDENTITY), false, position, 1.0);
        let quarter = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        connection.update(&kinematic_at(Vec3::ZERO, quarter), true, position, 1.0);
        // (2, 1, 0) rotated a quarter turn about y lands on (0, 1, -2)
        assert!((connection.velocity - Vec3::new(-2.0, 0.0, -2.0)).length() < 1e-4);
    }

    #[test]
    fn test_light_dynamic_body_cannot_carry() {
        let crate_body = BodyInfo {
            kinematic: false,
            mass: 0.5,
            transform: Affine3A::IDENTITY,
        };
        assert!(!Connection::can_carry(&crate_body, 1.0));
        assert!(Connection::can_carry(&BodyInfo { mass: 1.0, ..crate_body }, 1.0));
        assert!(Connection::can_carry(&kinematic_at(Vec3::ZERO, Quat::IDENTITY), 100.0));
    }
}

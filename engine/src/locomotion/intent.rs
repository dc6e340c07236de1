//! Player intent
//!
//! Input polling lives outside the engine. Whatever reads the keyboard,
//! gamepad or a script fills a [`PlayerIntent`] once per frame and hands it
//! to the controller.

use glam::{Quat, Vec3};

/// Orientation that movement input is expressed in (usually the camera).
///
/// `right` is the space's +X axis and `forward` its +Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSpace {
    pub rotation: Quat,
}

impl InputSpace {
    pub fn new(rotation: Quat) -> Self {
        Self { rotation }
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// Per-frame movement request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// x = right, y = swim up/down, z = forward
    pub movement: Vec3,
    /// Jump was pressed this frame
    pub jump: bool,
    /// Climb is held
    pub climb: bool,
    /// Camera-relative input; world axes when `None`
    pub input_space: Option<InputSpace>,
}

impl PlayerIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal movement from two axes (x = right, y = forward).
    pub fn with_axes(mut self, right: f32, forward: f32) -> Self {
        self.movement.x = right;
        self.movement.z = forward;
        self
    }

    pub fn with_vertical(mut self, vertical: f32) -> Self {
        self.movement.y = vertical;
        self
    }

    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    pub fn with_climb(mut self, climb: bool) -> Self {
        self.climb = climb;
        self
    }

    pub fn with_input_space(mut self, rotation: Quat) -> Self {
        self.input_space = Some(InputSpace::new(rotation));
        self
    }

    /// Movement axes clamped to unit length.
    pub fn clamped_movement(&self) -> Vec3 {
        self.movement.clamp_length_max(1.0)
    }
}

//! GPU-facing locomotion snapshot
//!
//! A plain `#[repr(C)]` copy of the state camera and render consumers care
//! about. It can be written straight into a uniform buffer.

use bytemuck::{Pod, Zeroable};

use super::controller::LocomotionController;

/// Set in [`LocomotionView::flags`] while supported
pub const FLAG_GROUNDED: u32 = 1 << 0;
pub const FLAG_CLIMBING: u32 = 1 << 1;
pub const FLAG_SWIMMING: u32 = 1 << 2;
pub const FLAG_IN_WATER: u32 = 1 << 3;

/// Snapshot layout (64 bytes, four vec4s)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LocomotionView {
    pub up_axis: [f32; 3],
    /// [`Support`](super::Support) as `u32`
    pub support: u32,
    pub contact_normal: [f32; 3],
    pub submergence: f32,
    pub velocity: [f32; 3],
    pub jump_phase: u32,
    pub gravity: [f32; 3],
    pub flags: u32,
}

static_assertions::assert_eq_size!(LocomotionView, [u8; 64]);

impl LocomotionView {
    pub fn from_controller(controller: &LocomotionController) -> Self {
        let mut flags = 0;
        if controller.is_grounded() {
            flags |= FLAG_GROUNDED;
        }
        if controller.is_climbing() {
            flags |= FLAG_CLIMBING;
        }
        if controller.is_swimming() {
            flags |= FLAG_SWIMMING;
        }
        if controller.in_water() {
            flags |= FLAG_IN_WATER;
        }
        Self {
            up_axis: controller.up_axis().to_array(),
            support: controller.support().as_u32(),
            contact_normal: controller.contact_normal().to_array(),
            submergence: controller.submergence(),
            velocity: controller.velocity().to_array(),
            jump_phase: controller.jump_phase(),
            gravity: controller.gravity().to_array(),
            flags,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_controller_view() {
        let view = LocomotionController::default().view();
        assert_eq!(view.up_axis, [0.0, 1.0, 0.0]);
        assert_eq!(view.support, 0);
        assert_eq!(view.flags, 0);
        assert_eq!(view.as_bytes().len(), 64);
    }

    #[test]
    fn test_zeroed_view() {
        let view: LocomotionView = Zeroable::zeroed();
        assert_eq!(view, LocomotionView::default());
    }
}

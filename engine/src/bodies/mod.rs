//! Gravity-field consumers other than the character.
//!
//! - [`floating`] - Passive rigid bodies with custom gravity and buoyancy

pub mod floating;

pub use floating::{DynamicBody, FloatingBody, FloatingConfig, FloatingStep, PointAcceleration};

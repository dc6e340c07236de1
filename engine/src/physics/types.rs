//! Physics identifiers and collision layers
//!
//! Core math types are re-exported from glam alongside the handles the
//! physics collaborator uses to refer to bodies and layers.

use std::fmt;

pub use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Handle of a rigid body owned by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Number of collision layers a [`LayerMask`] can hold.
pub const LAYER_COUNT: u8 = 32;

/// Collision layer index (0..32). Deserializing a larger index fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Layer(pub u8);

/// Layer index outside `0..LAYER_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerOutOfRange(pub u8);

impl fmt::Display for LayerOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collision layer {} out of range (max {})", self.0, LAYER_COUNT - 1)
    }
}

impl std::error::Error for LayerOutOfRange {}

impl TryFrom<u8> for Layer {
    type Error = LayerOutOfRange;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        if index < LAYER_COUNT {
            Ok(Layer(index))
        } else {
            Err(LayerOutOfRange(index))
        }
    }
}

impl From<Layer> for u8 {
    fn from(layer: Layer) -> u8 {
        layer.0
    }
}

impl Layer {
    pub const DEFAULT: Layer = Layer(0);
    pub const STAIRS: Layer = Layer(1);
    pub const CLIMB: Layer = Layer(2);
    pub const WATER: Layer = Layer(4);
    pub const AGENT: Layer = Layer(8);

    /// Mask containing only this layer. Out-of-range layers match nothing.
    #[inline]
    pub const fn mask(self) -> LayerMask {
        match 1u32.checked_shl(self.0 as u32) {
            Some(bit) => LayerMask(bit),
            None => LayerMask::NONE,
        }
    }
}

/// Bit set of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn from_layers(layers: &[Layer]) -> Self {
        layers
            .iter()
            .fold(LayerMask::NONE, |mask, layer| mask.with(*layer))
    }

    #[inline]
    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & layer.mask().0 != 0
    }

    #[inline]
    pub const fn with(self, layer: Layer) -> Self {
        LayerMask(self.0 | layer.mask().0)
    }

    #[inline]
    pub const fn without(self, layer: Layer) -> Self {
        LayerMask(self.0 & !layer.mask().0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

//! Locomotion module
//!
//! Gravity-aware character movement: a fixed-step controller that classifies
//! contacts against a variable up axis, snaps to ground, climbs, swims, jumps
//! and rides moving platforms.
//!
//! # Submodules
//!
//! - [`config`] - Tuning values and derived contact thresholds
//! - [`intent`] - Per-frame player intent
//! - [`contact`] - Per-step contact classification
//! - [`connection`] - Moving platform tracking
//! - [`controller`] - The step pipeline
//! - [`view`] - `bytemuck` snapshot for render and camera consumers

pub mod config;
pub mod connection;
pub mod contact;
pub mod controller;
pub mod intent;
pub mod view;

pub use config::{ContactThresholds, LocomotionConfig};
pub use connection::Connection;
pub use contact::ContactAccumulator;
pub use controller::{LocomotionController, MIN_STEP_TIME, StepReport, Support, project_direction_on_plane};
pub use intent::{InputSpace, PlayerIntent};
pub use view::LocomotionView;

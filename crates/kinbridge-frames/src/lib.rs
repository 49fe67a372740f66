//! `kinbridge-frames` – poses and frame lookups.
//!
//! # Modules
//!
//! - [`pose`] – [`RigidTransform`][pose::RigidTransform] and helpers for
//!   building, splitting and comparing rigid transforms.
//! - [`transform`] – [`FrameTree`][transform::FrameTree]: a tree of named
//!   frames with fixed, revolute and prismatic edges whose transforms depend
//!   on the current joint positions.
//! - [`state`] – [`KinematicState`][state::KinematicState]: the frame-lookup
//!   contract kinematics adapters consume.

pub mod pose;
pub mod state;
pub mod transform;

pub use pose::RigidTransform;
pub use state::KinematicState;
pub use transform::{FrameTree, JointMotion};

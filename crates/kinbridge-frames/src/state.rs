//! [`KinematicState`] – the frame-lookup contract consumed by the adapter.
//!
//! Hosts implement this trait over whatever holds their robot state (a scene
//! graph, a robot model with joint values, …).  [`FrameTree`] is the
//! in-workspace implementation.

use kinbridge_types::KinError;

use crate::pose::RigidTransform;
use crate::transform::FrameTree;

/// Read access to the frame transforms of a kinematic state.
///
/// All transforms are expressed in one common model frame, so the relation
/// between two frames `a` and `b` is `transform(a).inverse() * transform(b)`.
pub trait KinematicState {
    /// Pose of `frame` in the model frame.
    ///
    /// # Errors
    ///
    /// Returns [`KinError::UnknownFrame`] if the state does not know `frame`.
    fn frame_transform(&self, frame: &str) -> Result<RigidTransform, KinError>;

    /// Whether `frame` can be resolved by [`KinematicState::frame_transform`].
    fn knows_frame(&self, frame: &str) -> bool;
}

impl KinematicState for FrameTree {
    fn frame_transform(&self, frame: &str) -> Result<RigidTransform, KinError> {
        FrameTree::frame_transform(self, frame)
            .ok_or_else(|| KinError::UnknownFrame(frame.to_string()))
    }

    fn knows_frame(&self, frame: &str) -> bool {
        self.contains(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::from_xyz_rpy;

    #[test]
    fn frame_tree_reports_unknown_frames() {
        let mut tree = FrameTree::new("world");
        tree.add_fixed("world", "base_link", from_xyz_rpy([0.0, 0.0, 1.0], [0.0; 3]))
            .unwrap();

        let state: &dyn KinematicState = &tree;
        assert!(state.knows_frame("world"));
        assert!(state.knows_frame("base_link"));
        assert!(!state.knows_frame("base_lnk"));
        assert_eq!(
            state.frame_transform("base_lnk"),
            Err(KinError::UnknownFrame("base_lnk".into()))
        );
        assert!((state.frame_transform("base_link").unwrap().translation.z - 1.0).abs() < 1e-12);
    }
}

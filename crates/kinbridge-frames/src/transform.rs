//! Frame tree.
//!
//! Maintains a tree of named reference frames rooted at a single model frame.
//! Every non-root frame hangs off a parent through a static origin transform
//! followed by an optional joint motion (revolute or prismatic about a unit
//! axis).  Changing a joint position moves every frame below that joint, so
//! cached offsets derived from the tree must be recomputed after each state
//! change.
//!
//! [`FrameTree::frame_transform`] returns the pose of a frame in the root
//! frame; [`FrameTree::lookup`] relates any two frames.
//!
//! # Example
//!
//! ```rust
//! use kinbridge_frames::pose::from_xyz_rpy;
//! use kinbridge_frames::transform::{FrameTree, JointMotion};
//! use nalgebra::Vector3;
//!
//! let mut tree = FrameTree::new("world");
//! tree.add_joint("world", "carriage", from_xyz_rpy([1.0, 0.0, 0.0], [0.0; 3]),
//!     "rail", JointMotion::prismatic(Vector3::x())).unwrap();
//! tree.add_fixed("carriage", "base_link", from_xyz_rpy([0.0, 0.0, 0.5], [0.0; 3])).unwrap();
//!
//! tree.set_joint_position("rail", 0.25).unwrap();
//! let t = tree.frame_transform("base_link").unwrap();
//! assert!((t.translation.x - 1.25).abs() < 1e-12);
//! assert!((t.translation.z - 0.5).abs() < 1e-12);
//! ```

use std::collections::HashMap;

use kinbridge_types::{ChainSpec, JointConfiguration, KinError};
use nalgebra::{Translation3, Unit, UnitQuaternion, Vector3};
use tracing::trace;

use crate::pose::RigidTransform;

// ────────────────────────────────────────────────────────────────────────────
// Joint motion
// ────────────────────────────────────────────────────────────────────────────

/// How a joint moves its child frame relative to the joint origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointMotion {
    /// Rotation of `position` radians about `axis`.
    Revolute { axis: Unit<Vector3<f64>> },
    /// Translation of `position` meters along `axis`.
    Prismatic { axis: Unit<Vector3<f64>> },
}

impl JointMotion {
    pub fn revolute(axis: Vector3<f64>) -> Self {
        Self::Revolute {
            axis: Unit::new_normalize(axis),
        }
    }

    pub fn prismatic(axis: Vector3<f64>) -> Self {
        Self::Prismatic {
            axis: Unit::new_normalize(axis),
        }
    }

    /// Local transform produced by this joint at `position`.
    pub fn transform(&self, position: f64) -> RigidTransform {
        match self {
            Self::Revolute { axis } => RigidTransform::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(axis, position),
            ),
            Self::Prismatic { axis } => RigidTransform::from_parts(
                Translation3::from(axis.into_inner() * position),
                UnitQuaternion::identity(),
            ),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal node
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct FrameNode {
    parent: String,
    origin: RigidTransform,
    joint: Option<(String, JointMotion)>,
}

// ────────────────────────────────────────────────────────────────────────────
// FrameTree
// ────────────────────────────────────────────────────────────────────────────

/// A tree of named frames connected by fixed or actuated edges.
///
/// Frames are identified by arbitrary string names (e.g. `"world"`,
/// `"base_link"`, `"tool0"`).  Joint positions default to zero.
#[derive(Debug, Clone)]
pub struct FrameTree {
    root: String,
    /// `frames[child] = node`; the root has no entry.
    frames: HashMap<String, FrameNode>,
    /// `joints[joint_name] = child frame driven by that joint`.
    joints: HashMap<String, String>,
    positions: HashMap<String, f64>,
}

impl FrameTree {
    /// Create a tree containing only `root`.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            frames: HashMap::new(),
            joints: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    /// Name of the root (model) frame.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Whether `frame` exists in the tree.
    pub fn contains(&self, frame: &str) -> bool {
        frame == self.root || self.frames.contains_key(frame)
    }

    /// Attach `child` to `parent` through a static `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`KinError::UnknownFrame`] when `parent` is missing and
    /// [`KinError::FrameTree`] when `child` already exists.
    pub fn add_fixed(
        &mut self,
        parent: &str,
        child: &str,
        origin: RigidTransform,
    ) -> Result<(), KinError> {
        self.insert(parent, child, origin, None)
    }

    /// Attach `child` to `parent` through `origin` followed by a joint named
    /// `joint_name`.
    ///
    /// # Errors
    ///
    /// As [`FrameTree::add_fixed`], plus [`KinError::FrameTree`] when
    /// `joint_name` is already in use.
    pub fn add_joint(
        &mut self,
        parent: &str,
        child: &str,
        origin: RigidTransform,
        joint_name: &str,
        motion: JointMotion,
    ) -> Result<(), KinError> {
        if self.joints.contains_key(joint_name) {
            return Err(KinError::FrameTree(format!(
                "joint '{joint_name}' already exists"
            )));
        }
        self.insert(parent, child, origin, Some((joint_name.to_string(), motion)))?;
        self.joints.insert(joint_name.to_string(), child.to_string());
        self.positions.insert(joint_name.to_string(), 0.0);
        Ok(())
    }

    fn insert(
        &mut self,
        parent: &str,
        child: &str,
        origin: RigidTransform,
        joint: Option<(String, JointMotion)>,
    ) -> Result<(), KinError> {
        if !self.contains(parent) {
            return Err(KinError::UnknownFrame(parent.to_string()));
        }
        // A new leaf can never close a cycle, so rejecting existing names is
        // enough to keep this a tree.
        if self.contains(child) {
            return Err(KinError::FrameTree(format!("frame '{child}' already exists")));
        }
        self.frames.insert(
            child.to_string(),
            FrameNode {
                parent: parent.to_string(),
                origin,
                joint,
            },
        );
        Ok(())
    }

    /// Set a single joint position.
    ///
    /// # Errors
    ///
    /// Returns [`KinError::FrameTree`] when no joint is named `joint_name`.
    pub fn set_joint_position(&mut self, joint_name: &str, position: f64) -> Result<(), KinError> {
        match self.positions.get_mut(joint_name) {
            Some(slot) => {
                trace!(joint = joint_name, position, "joint position updated");
                *slot = position;
                Ok(())
            }
            None => Err(KinError::FrameTree(format!(
                "joint '{joint_name}' is not part of the tree"
            ))),
        }
    }

    /// Set every joint of `chain` from `joints`, in chain order.
    ///
    /// # Errors
    ///
    /// Returns [`KinError::InvalidConfiguration`] on a length mismatch, or the
    /// first [`FrameTree::set_joint_position`] failure.
    pub fn set_chain_positions(
        &mut self,
        chain: &ChainSpec,
        joints: &JointConfiguration,
    ) -> Result<(), KinError> {
        if joints.len() != chain.dof() {
            return Err(KinError::InvalidConfiguration {
                rule: "dof".to_string(),
                details: format!("expected {} values, got {}", chain.dof(), joints.len()),
            });
        }
        for (limit, value) in chain.joints.iter().zip(joints.iter()) {
            self.set_joint_position(&limit.name, *value)?;
        }
        Ok(())
    }

    /// Current position of `joint_name`, if it exists.
    pub fn joint_position(&self, joint_name: &str) -> Option<f64> {
        self.positions.get(joint_name).copied()
    }

    /// Pose of `frame` expressed in the root frame.
    ///
    /// Returns `None` if the frame is unknown.
    pub fn frame_transform(&self, frame: &str) -> Option<RigidTransform> {
        let mut accumulated = RigidTransform::identity();
        let mut current = frame;
        // Walk towards the root, pre-multiplying each local edge.
        while current != self.root {
            let node = self.frames.get(current)?;
            accumulated = self.local_transform(node) * accumulated;
            current = &node.parent;
        }
        Some(accumulated)
    }

    /// Pose of `target_frame` expressed in `source_frame`.
    ///
    /// Returns `None` if either frame is unknown.
    pub fn lookup(&self, source_frame: &str, target_frame: &str) -> Option<RigidTransform> {
        if source_frame == target_frame {
            return self.contains(source_frame).then(RigidTransform::identity);
        }
        let source = self.frame_transform(source_frame)?;
        let target = self.frame_transform(target_frame)?;
        Some(source.inverse() * target)
    }

    fn local_transform(&self, node: &FrameNode) -> RigidTransform {
        match &node.joint {
            Some((name, motion)) => {
                let position = self.positions.get(name).copied().unwrap_or(0.0);
                node.origin * motion.transform(position)
            }
            None => node.origin,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{approx_eq, from_xyz_rpy};
    use approx::assert_relative_eq;
    use kinbridge_types::JointLimit;
    use std::f64::consts::FRAC_PI_2;

    fn offset(x: f64, y: f64, z: f64) -> RigidTransform {
        from_xyz_rpy([x, y, z], [0.0; 3])
    }

    // ── Lookups ─────────────────────────────────────────────────────────────

    #[test]
    fn root_transform_is_identity() {
        let tree = FrameTree::new("world");
        assert_eq!(tree.root(), "world");
        assert_eq!(tree.frame_transform("world"), Some(RigidTransform::identity()));
    }

    #[test]
    fn fixed_chain_composes() {
        let mut tree = FrameTree::new("world");
        tree.add_fixed("world", "robot_base", offset(1.0, 0.0, 0.0)).unwrap();
        tree.add_fixed("robot_base", "camera", offset(0.5, 0.0, 0.0)).unwrap();

        let t = tree.frame_transform("camera").unwrap();
        assert_relative_eq!(t.translation.x, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn unknown_frame_returns_none() {
        let mut tree = FrameTree::new("world");
        tree.add_fixed("world", "robot_base", offset(1.0, 0.0, 0.0)).unwrap();
        assert!(tree.frame_transform("ghost_frame").is_none());
        assert!(tree.lookup("world", "ghost_frame").is_none());
        assert!(tree.lookup("ghost_frame", "ghost_frame").is_none());
    }

    #[test]
    fn lookup_between_siblings() {
        let mut tree = FrameTree::new("world");
        tree.add_fixed("world", "a", offset(1.0, 0.0, 0.0)).unwrap();
        tree.add_fixed("world", "b", offset(0.0, 2.0, 0.0)).unwrap();

        let a_to_b = tree.lookup("a", "b").unwrap();
        assert_relative_eq!(a_to_b.translation.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(a_to_b.translation.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rotation_in_chain_is_respected() {
        let mut tree = FrameTree::new("world");
        tree.add_fixed("world", "robot_base", from_xyz_rpy([0.0; 3], [0.0, 0.0, FRAC_PI_2]))
            .unwrap();
        tree.add_fixed("robot_base", "camera", offset(1.0, 0.0, 0.0)).unwrap();

        let t = tree.frame_transform("camera").unwrap();
        assert_relative_eq!(t.translation.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(t.translation.y, 1.0, epsilon = 1e-12);
    }

    // ── Joints ──────────────────────────────────────────────────────────────

    #[test]
    fn revolute_joint_moves_child() {
        let mut tree = FrameTree::new("world");
        tree.add_joint(
            "world",
            "link",
            RigidTransform::identity(),
            "yaw",
            JointMotion::revolute(Vector3::z()),
        )
        .unwrap();
        tree.add_fixed("link", "tip", offset(1.0, 0.0, 0.0)).unwrap();

        tree.set_joint_position("yaw", FRAC_PI_2).unwrap();
        let tip = tree.frame_transform("tip").unwrap();
        assert!(approx_eq(
            &tip,
            &from_xyz_rpy([0.0, 1.0, 0.0], [0.0, 0.0, FRAC_PI_2]),
            1e-12
        ));
    }

    #[test]
    fn prismatic_joint_translates_child() {
        let mut tree = FrameTree::new("world");
        tree.add_joint(
            "world",
            "carriage",
            offset(0.0, 0.0, 1.0),
            "lift",
            JointMotion::prismatic(Vector3::z()),
        )
        .unwrap();
        assert_relative_eq!(tree.frame_transform("carriage").unwrap().translation.z, 1.0);

        tree.set_joint_position("lift", 0.3).unwrap();
        assert_relative_eq!(
            tree.frame_transform("carriage").unwrap().translation.z,
            1.3,
            epsilon = 1e-12
        );
    }

    #[test]
    fn unknown_joint_is_rejected() {
        let mut tree = FrameTree::new("world");
        assert!(matches!(
            tree.set_joint_position("nope", 1.0),
            Err(KinError::FrameTree(_))
        ));
    }

    #[test]
    fn set_chain_positions_checks_length() {
        let mut tree = FrameTree::new("world");
        let yaw = JointMotion::revolute(Vector3::z());
        tree.add_joint("world", "a", offset(0.0, 0.0, 0.0), "j1", yaw)
            .unwrap();
        let chain = ChainSpec {
            group_name: "arm".into(),
            world_frame: "world".into(),
            tool_frame: "a".into(),
            joints: vec![JointLimit::new("j1", -1.0, 1.0)],
        };
        assert!(tree
            .set_chain_positions(&chain, &JointConfiguration::from([0.5, 0.5]))
            .is_err());
        tree.set_chain_positions(&chain, &JointConfiguration::from([0.5]))
            .unwrap();
        assert_eq!(tree.joint_position("j1"), Some(0.5));
    }

    // ── Structure ───────────────────────────────────────────────────────────

    #[test]
    fn missing_parent_is_rejected() {
        let mut tree = FrameTree::new("world");
        assert_eq!(
            tree.add_fixed("nowhere", "child", RigidTransform::identity()),
            Err(KinError::UnknownFrame("nowhere".into()))
        );
    }

    #[test]
    fn duplicate_frame_and_joint_are_rejected() {
        let mut tree = FrameTree::new("world");
        let yaw = JointMotion::revolute(Vector3::z());
        tree.add_joint("world", "a", RigidTransform::identity(), "j", yaw)
            .unwrap();
        assert!(tree.add_fixed("world", "a", RigidTransform::identity()).is_err());
        assert!(tree.add_fixed("a", "world", RigidTransform::identity()).is_err());
        assert!(tree
            .add_joint("a", "b", RigidTransform::identity(), "j", yaw)
            .is_err());
    }
}

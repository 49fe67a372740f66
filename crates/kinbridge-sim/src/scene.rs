//! Demo work cell: the gantry on a linear rail.
//!
//! ```text
//! world
//!  └─ rail (prismatic X) ─ rail_carriage
//!      └─ base_link (fixed, 0.5 m up)
//!          └─ gantry_x ─ gantry_y ─ gantry_z ─ wrist_yaw ─ wrist_pitch ─ wrist_roll
//!              └─ flange (fixed) ─ tool0 (fixed) ─ tcp (fixed tool offset)
//! ```
//!
//! The rail is not part of the chain.  Moving it moves the solver base, which
//! is the case an adapter has to follow through `on_state_changed`.

use kinbridge_frames::pose::from_xyz_rpy;
use kinbridge_frames::{FrameTree, JointMotion, RigidTransform};
use kinbridge_types::{ChainSpec, JointConfiguration, JointLimit, KinError};
use nalgebra::Vector3;
use std::f64::consts::TAU;

use crate::solver::{DEFAULT_FLANGE, GantryWristSolver};

pub const WORLD_FRAME: &str = "world";
pub const TCP_FRAME: &str = "tcp";
pub const GROUP_NAME: &str = "gantry";
pub const RAIL_JOINT: &str = "rail";

/// Height of `base_link` above the rail carriage.
pub const BASE_HEIGHT: f64 = 0.5;

/// TCP offset from `tool0`.
pub const TOOL_OFFSET: [f64; 3] = [0.0, 0.0, 0.15];

/// Travel of each gantry axis, in meters.
pub const LINEAR_TRAVEL: f64 = 2.0;

/// Joint names of the gantry chain, in solver order.
pub const JOINT_NAMES: [&str; 6] = [
    "gantry_x",
    "gantry_y",
    "gantry_z",
    "wrist_yaw",
    "wrist_pitch",
    "wrist_roll",
];

/// Frame tree plus chain description of the demo cell.
#[derive(Debug, Clone)]
pub struct DemoCell {
    pub tree: FrameTree,
    pub chain: ChainSpec,
}

impl DemoCell {
    /// Move the rail the gantry is mounted on.
    pub fn set_rail(&mut self, position: f64) -> Result<(), KinError> {
        self.tree.set_joint_position(RAIL_JOINT, position)
    }

    /// Move the gantry joints.
    pub fn set_joints(&mut self, joints: &JointConfiguration) -> Result<(), KinError> {
        self.tree.set_chain_positions(&self.chain, joints)
    }

    /// Pose of the TCP in the world frame according to the tree.
    pub fn tcp_in_world(&self) -> Option<RigidTransform> {
        self.tree.lookup(WORLD_FRAME, TCP_FRAME)
    }

    /// Solver matching the flange of this cell.
    pub fn solver(&self) -> GantryWristSolver {
        GantryWristSolver::default()
    }
}

/// Build the demo cell with every joint at zero.
pub fn demo_cell() -> Result<DemoCell, KinError> {
    let mut tree = FrameTree::new(WORLD_FRAME);
    let identity = RigidTransform::identity();

    tree.add_joint(
        WORLD_FRAME,
        "rail_carriage",
        identity,
        RAIL_JOINT,
        JointMotion::prismatic(Vector3::x()),
    )?;
    tree.add_fixed(
        "rail_carriage",
        "base_link",
        from_xyz_rpy([0.0, 0.0, BASE_HEIGHT], [0.0; 3]),
    )?;

    let motions = [
        JointMotion::prismatic(Vector3::x()),
        JointMotion::prismatic(Vector3::y()),
        JointMotion::prismatic(Vector3::z()),
        JointMotion::revolute(Vector3::z()),
        JointMotion::revolute(Vector3::y()),
        JointMotion::revolute(Vector3::x()),
    ];
    let mut parent = "base_link".to_string();
    for (name, motion) in JOINT_NAMES.iter().zip(motions) {
        let child = format!("{name}_link");
        tree.add_joint(&parent, &child, identity, *name, motion)?;
        parent = child;
    }

    tree.add_fixed(&parent, "flange", from_xyz_rpy(DEFAULT_FLANGE, [0.0; 3]))?;
    tree.add_fixed("flange", "tool0", identity)?;
    tree.add_fixed("tool0", TCP_FRAME, from_xyz_rpy(TOOL_OFFSET, [0.0; 3]))?;

    let joints = JOINT_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i < 3 {
                JointLimit::new(*name, -LINEAR_TRAVEL, LINEAR_TRAVEL)
            } else {
                JointLimit::new(*name, -TAU, TAU)
            }
        })
        .collect();

    Ok(DemoCell {
        tree,
        chain: ChainSpec {
            group_name: GROUP_NAME.to_string(),
            world_frame: WORLD_FRAME.to_string(),
            tool_frame: TCP_FRAME.to_string(),
            joints,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinbridge_core::IkSolver;
    use kinbridge_frames::pose::approx_eq;

    #[test]
    fn tree_matches_solver_forward_kinematics() {
        let mut cell = demo_cell().unwrap();
        let q = JointConfiguration::from([0.3, -0.4, 0.2, 0.5, -0.7, 1.2]);
        cell.set_joints(&q).unwrap();

        let tool0 = cell.tree.lookup("base_link", "tool0").unwrap();
        let fk = cell.solver().forward_kinematics(&q).unwrap();
        assert!(approx_eq(&tool0, &fk, 1e-12));
    }

    #[test]
    fn rail_moves_the_base() {
        let mut cell = demo_cell().unwrap();
        cell.set_rail(0.75).unwrap();
        let base = cell.tree.frame_transform("base_link").unwrap();
        assert!((base.translation.x - 0.75).abs() < 1e-12);
        assert!((base.translation.z - BASE_HEIGHT).abs() < 1e-12);
    }

    #[test]
    fn chain_has_six_limited_joints() {
        let cell = demo_cell().unwrap();
        assert_eq!(cell.chain.dof(), 6);
        assert_eq!(cell.chain.joints[0].upper, LINEAR_TRAVEL);
        assert_eq!(cell.chain.joints[5].lower, -TAU);
    }
}

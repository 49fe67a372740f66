//! Closed-form solver for a six-axis gantry with a spherical wrist.
//!
//! Joint order: prismatic X, Y, Z, then yaw (about Z), pitch (about Y) and
//! roll (about X), followed by a fixed flange offset:
//!
//! ```text
//! T(q) = Trans(q0, q1, q2) * Rz(q3) * Ry(q4) * Rx(q5) * flange
//! ```
//!
//! Every orientation has two wrist branches, `(y, p, r)` and
//! `(y + π, π - p, r + π)`.  The solver returns both, with every revolute
//! value shifted by a multiple of 2π to lie nearest the seed.  Different seeds
//! therefore surface different 2π-equivalent solutions, which is what the
//! adapter's multi-seed enumeration is built to collect.
//!
//! # Example
//!
//! ```rust
//! use kinbridge_core::IkSolver;
//! use kinbridge_sim::solver::GantryWristSolver;
//! use kinbridge_types::JointConfiguration;
//!
//! let solver = GantryWristSolver::default();
//! let q = JointConfiguration::from([0.2, -0.1, 0.4, 0.3, 0.2, -0.5]);
//! let pose = solver.forward_kinematics(&q).unwrap();
//! let solutions = solver.all_solutions_near(&pose, &q).unwrap();
//! assert_eq!(solutions.len(), 2);
//! ```

use std::f64::consts::{PI, TAU};

use kinbridge_core::IkSolver;
use kinbridge_frames::pose::{from_xyz_rpy, to_xyz_rpy};
use kinbridge_frames::RigidTransform;
use kinbridge_types::{JointConfiguration, KinError, DEFAULT_SOLVER_TIP_FRAME};
use nalgebra::{Translation3, UnitQuaternion};
use tracing::trace;

/// Number of joints of the gantry.
pub const GANTRY_DOF: usize = 6;

/// Flange offset used by [`GantryWristSolver::default`]: 0.1 m along the roll
/// axis' Z.
pub const DEFAULT_FLANGE: [f64; 3] = [0.0, 0.0, 0.1];

// ────────────────────────────────────────────────────────────────────────────
// Solver
// ────────────────────────────────────────────────────────────────────────────

/// Analytic IK/FK for the gantry described in the module docs.
#[derive(Debug, Clone)]
pub struct GantryWristSolver {
    tip_frame: String,
    flange: RigidTransform,
}

impl Default for GantryWristSolver {
    fn default() -> Self {
        Self::new(DEFAULT_SOLVER_TIP_FRAME, from_xyz_rpy(DEFAULT_FLANGE, [0.0; 3]))
    }
}

impl GantryWristSolver {
    /// Solver whose tip frame `tip_frame` sits at `flange` relative to the
    /// roll joint.
    pub fn new(tip_frame: impl Into<String>, flange: RigidTransform) -> Self {
        Self {
            tip_frame: tip_frame.into(),
            flange,
        }
    }

    pub fn flange(&self) -> &RigidTransform {
        &self.flange
    }

    fn check_len(&self, joints: &JointConfiguration, what: &str) -> Result<(), KinError> {
        if joints.len() != GANTRY_DOF {
            return Err(KinError::Solver(format!(
                "{what} has {} values, gantry expects {GANTRY_DOF}",
                joints.len()
            )));
        }
        Ok(())
    }
}

impl IkSolver for GantryWristSolver {
    fn tip_frame(&self) -> &str {
        &self.tip_frame
    }

    fn dof(&self) -> usize {
        GANTRY_DOF
    }

    fn all_solutions_near(
        &self,
        pose: &RigidTransform,
        seed: &JointConfiguration,
    ) -> Result<Vec<JointConfiguration>, KinError> {
        self.check_len(seed, "seed")?;

        let wrist = pose * self.flange.inverse();
        let ([x, y, z], [roll, pitch, yaw]) = to_xyz_rpy(&wrist);
        trace!(x, y, z, roll, pitch, yaw, "wrist pose decomposed");

        let branches = [[yaw, pitch, roll], [yaw + PI, PI - pitch, roll + PI]];
        Ok(branches
            .iter()
            .map(|[yaw, pitch, roll]| {
                JointConfiguration::from([
                    x,
                    y,
                    z,
                    nearest_equivalent(*yaw, seed[3]),
                    nearest_equivalent(*pitch, seed[4]),
                    nearest_equivalent(*roll, seed[5]),
                ])
            })
            .collect())
    }

    fn forward_kinematics(&self, joints: &JointConfiguration) -> Result<RigidTransform, KinError> {
        self.check_len(joints, "joint configuration")?;
        if joints.iter().any(|v| !v.is_finite()) {
            return Err(KinError::Solver("joint configuration is not finite".into()));
        }
        let wrist = RigidTransform::from_parts(
            Translation3::new(joints[0], joints[1], joints[2]),
            UnitQuaternion::from_euler_angles(joints[5], joints[4], joints[3]),
        );
        Ok(wrist * self.flange)
    }
}

/// `angle + 2πk` for the integer `k` that brings it closest to `reference`.
fn nearest_equivalent(angle: f64, reference: f64) -> f64 {
    angle + TAU * ((reference - angle) / TAU).round()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

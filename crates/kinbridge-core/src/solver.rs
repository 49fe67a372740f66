//! [`IkSolver`] – the external analytic solver capability.
//!
//! The adapter never computes kinematics itself.  It hands poses expressed in
//! the solver's own base/tip convention to an implementation of this trait and
//! post-processes whatever comes back.  Implementations wrap a closed-form
//! solver (generated IKFast code, an OPW solver, …).
//!
//! Calls are made sequentially from a single thread.  Hosts that need parallel
//! queries give each worker its own solver instance.

use kinbridge_frames::RigidTransform;
use kinbridge_types::{JointConfiguration, KinError};

/// Black-box inverse/forward kinematics for one chain.
pub trait IkSolver: Send {
    /// Name of the frame the solver's poses refer to as the tip.
    fn tip_frame(&self) -> &str;

    /// Number of joints the solver expects and returns.
    fn dof(&self) -> usize;

    /// Every joint configuration the solver finds for `pose` when started
    /// from `seed`.
    ///
    /// `pose` is the tip pose in the solver's base frame.  An empty vector is
    /// a normal outcome for unreachable poses.
    ///
    /// # Errors
    ///
    /// Returns [`KinError::Solver`] for malformed input or an internal
    /// failure.
    fn all_solutions_near(
        &self,
        pose: &RigidTransform,
        seed: &JointConfiguration,
    ) -> Result<Vec<JointConfiguration>, KinError>;

    /// Tip pose in the solver's base frame for `joints`.
    ///
    /// # Errors
    ///
    /// Returns [`KinError::Solver`] for malformed input or an internal
    /// failure.
    fn forward_kinematics(&self, joints: &JointConfiguration) -> Result<RigidTransform, KinError>;
}

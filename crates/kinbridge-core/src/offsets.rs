//! Frame offset cache.
//!
//! The solver works between its own base and tip frames while clients work
//! between the world frame and the TCP frame.  Two transforms bridge the
//! conventions:
//!
//! - `world_to_solver_base = world_to_chain_root * T(solver_base)`
//! - `tool_to_solver_tip = T(tool)^-1 * T(solver_tip)`
//!
//! where `T(f)` is the pose of frame `f` in the model frame of the current
//! [`KinematicState`].  Both depend on joint values (a rail or positioner
//! upstream of the chain moves the solver base), so they are recomputed on
//! every state change and never assumed stable.

use kinbridge_frames::{KinematicState, RigidTransform};
use kinbridge_types::{AdapterConfig, ChainSpec, ConfigError, KinError};
use tracing::{error, info};

/// Cached transforms between client and solver conventions.
///
/// Inverses are derived on demand rather than stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOffsets {
    /// Pose of the solver base frame in the world frame.
    pub world_to_solver_base: RigidTransform,
    /// Pose of the solver tip frame in the tool (TCP) frame.
    pub tool_to_solver_tip: RigidTransform,
    /// Solver base frame these offsets were computed from.
    pub solver_base_frame: String,
    /// Solver tip frame these offsets were computed from.
    pub solver_tip_frame: String,
}

impl FrameOffsets {
    /// Compute the offsets for `chain` against `state`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFrame`] if the solver base or tip frame,
    /// or the chain's world or tool frame, is unknown to `state`.
    pub fn compute<S: KinematicState + ?Sized>(
        state: &S,
        chain: &ChainSpec,
        solver_base_frame: &str,
        solver_tip_frame: &str,
    ) -> Result<Self, KinError> {
        for frame in [solver_base_frame, solver_tip_frame] {
            if !state.knows_frame(frame) {
                return Err(unknown_frame(frame, chain));
            }
        }

        let lookup = |frame: &str| {
            state
                .frame_transform(frame)
                .map_err(|_| unknown_frame(frame, chain))
        };

        let world_to_chain_root = lookup(&chain.world_frame)?.inverse();
        let tool = lookup(&chain.tool_frame)?;

        Ok(Self {
            world_to_solver_base: world_to_chain_root * lookup(solver_base_frame)?,
            tool_to_solver_tip: tool.inverse() * lookup(solver_tip_frame)?,
            solver_base_frame: solver_base_frame.to_string(),
            solver_tip_frame: solver_tip_frame.to_string(),
        })
    }

    /// Express a TCP pose given in the world frame as a solver tip pose in
    /// the solver base frame.
    pub fn to_solver(&self, pose_in_world: &RigidTransform) -> RigidTransform {
        self.world_to_solver_base.inverse() * pose_in_world * self.tool_to_solver_tip
    }

    /// Inverse of [`FrameOffsets::to_solver`].
    pub fn to_world(&self, pose_in_solver_base: &RigidTransform) -> RigidTransform {
        self.world_to_solver_base * pose_in_solver_base * self.tool_to_solver_tip.inverse()
    }
}

fn unknown_frame(frame: &str, chain: &ChainSpec) -> KinError {
    error!(
        group = %chain.group_name,
        frame,
        "cannot find transformation to frame"
    );
    ConfigError::UnknownFrame {
        frame: frame.to_string(),
        group: chain.group_name.clone(),
    }
    .into()
}

/// Holds the most recent [`FrameOffsets`] of one adapter.
///
/// A failed recompute leaves the stored offsets untouched but marks them
/// stale; [`FrameOffsetCache::current`] refuses stale or missing offsets.
#[derive(Debug, Default)]
pub struct FrameOffsetCache {
    offsets: Option<FrameOffsets>,
    stale: bool,
}

impl FrameOffsetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the offsets from `state` using the solver frames named in
    /// `config`.
    ///
    /// # Errors
    ///
    /// Propagates [`FrameOffsets::compute`] failures; the cache is then stale.
    pub fn recompute<S: KinematicState + ?Sized>(
        &mut self,
        state: &S,
        chain: &ChainSpec,
        config: &AdapterConfig,
    ) -> Result<&FrameOffsets, KinError> {
        let base = config.solver_base_frame();
        let tip = config.solver_tip_frame();
        match FrameOffsets::compute(state, chain, base, tip) {
            Ok(offsets) => {
                info!(
                    group = %chain.group_name,
                    solver_base_frame = base,
                    solver_tip_frame = tip,
                    "frame offsets computed"
                );
                self.stale = false;
                Ok(self.offsets.insert(offsets))
            }
            Err(e) => {
                self.stale = true;
                Err(e)
            }
        }
    }

    /// The usable offsets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotInitialized`] before the first successful
    /// recompute or after a failed one.
    pub fn current(&self, chain: &ChainSpec) -> Result<&FrameOffsets, KinError> {
        match (&self.offsets, self.stale) {
            (Some(offsets), false) => Ok(offsets),
            _ => Err(ConfigError::NotInitialized {
                group: chain.group_name.clone(),
            }
            .into()),
        }
    }

    /// Whether [`FrameOffsetCache::current`] would succeed.
    pub fn is_current(&self) -> bool {
        self.offsets.is_some() && !self.stale
    }

    /// The last successfully computed offsets, even if stale.
    pub fn last(&self) -> Option<&FrameOffsets> {
        self.offsets.as_ref()
    }
}

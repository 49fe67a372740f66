//! IK enumeration across seeds.
//!
//! The target TCP pose is moved into the solver's convention once, then the
//! solver is run from every seed in order.  Candidates are admitted through the
//! [`SolutionFilter`]; invalid and duplicate candidates are dropped silently.

use std::borrow::Cow;

use kinbridge_frames::RigidTransform;
use kinbridge_types::{ConfigError, JointConfiguration, KinError};
use tracing::{debug, trace};

use crate::filter::{Admission, SolutionFilter, SolutionSet};
use crate::offsets::FrameOffsets;
use crate::seeds::zero_seed;
use crate::solver::IkSolver;

/// Runs one solver over a seed set and collects distinct valid solutions.
pub struct IkEnumerator<'a> {
    solver: &'a dyn IkSolver,
    filter: &'a SolutionFilter,
    dof: usize,
}

impl<'a> IkEnumerator<'a> {
    pub fn new(solver: &'a dyn IkSolver, filter: &'a SolutionFilter, dof: usize) -> Self {
        Self {
            solver,
            filter,
            dof,
        }
    }

    /// Every distinct valid solution for `pose_in_world` reachable from
    /// `seeds`.
    ///
    /// An empty `seeds` slice is replaced by a single all-zero seed.  An empty
    /// result means no solution was found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeed`] for a seed of the wrong length and
    /// propagates the first solver failure.
    pub fn solve_all(
        &self,
        offsets: &FrameOffsets,
        pose_in_world: &RigidTransform,
        seeds: &[JointConfiguration],
    ) -> Result<SolutionSet, KinError> {
        let solver_pose = offsets.to_solver(pose_in_world);
        let seeds: Cow<'_, [JointConfiguration]> = if seeds.is_empty() {
            Cow::Owned(vec![zero_seed(self.dof)])
        } else {
            Cow::Borrowed(seeds)
        };

        let mut solutions = self.filter.empty_set();
        for (seed_index, seed) in seeds.iter().enumerate() {
            if seed.len() != self.dof {
                return Err(ConfigError::InvalidSeed {
                    index: seed_index,
                    expected: self.dof,
                    got: seed.len(),
                }
                .into());
            }

            let candidates = self.solver.all_solutions_near(&solver_pose, seed)?;
            let returned = candidates.len();
            let mut accepted = 0;
            for candidate in candidates {
                match self.filter.admit(&mut solutions, candidate) {
                    Admission::Accepted => accepted += 1,
                    rejected => trace!(seed_index, ?rejected, "candidate dropped"),
                }
            }
            debug!(seed_index, returned, accepted, "solver run complete");
        }

        Ok(solutions)
    }
}

//! [`KinematicsAdapter`] – world/TCP-frame IK and FK over a solver-native
//! analytic solver.
//!
//! Lifecycle:
//!
//! 1. [`KinematicsAdapter::new`] checks the chain against the solver and the
//!    configuration.
//! 2. [`KinematicsAdapter::initialize`] computes the frame offsets from the
//!    host's [`KinematicState`].
//! 3. The host calls [`KinematicsAdapter::on_state_changed`] after every
//!    mutation of that state.  Offsets are never refreshed implicitly.
//! 4. IK/FK queries use the offsets from the last successful recompute and
//!    fail with [`ConfigError::NotInitialized`] if there is none.
//!
//! The adapter is a plain single-threaded object.  Share it between threads
//! only behind external synchronisation; a blocked solver call blocks the
//! caller.
//!
//! # Example
//!
//! ```ignore
//! let mut adapter = KinematicsAdapter::new(chain, AdapterConfig::default(), Box::new(solver))?;
//! adapter.initialize(&state)?;
//!
//! let pose = adapter.solve_fk(&joints)?;
//! let nearest = adapter.solve_ik(&pose, &joints)?;
//! ```

use kinbridge_frames::{KinematicState, RigidTransform};
use kinbridge_types::{AdapterConfig, ChainSpec, ConfigError, JointConfiguration, KinError};
use tracing::{debug, warn};

use crate::enumerator::IkEnumerator;
use crate::filter::{SolutionFilter, SolutionSet};
use crate::offsets::{FrameOffsetCache, FrameOffsets};
use crate::seeds::merge_seeds;
use crate::selector::closest;
use crate::solver::IkSolver;
use crate::validity::{ValidityChecker, ValidityRule};

/// Resolves IK/FK requests expressed in the world and TCP frames.
pub struct KinematicsAdapter {
    chain: ChainSpec,
    config: AdapterConfig,
    solver: Box<dyn IkSolver>,
    filter: SolutionFilter,
    offsets: FrameOffsetCache,
    seed_states: Vec<JointConfiguration>,
}

impl KinematicsAdapter {
    /// Build an adapter for `chain` driving `solver`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DofMismatch`] when the chain and solver disagree
    /// on the joint count, and the [`AdapterConfig::validate`] errors for a bad
    /// tolerance or malformed seed states.
    pub fn new(
        chain: ChainSpec,
        config: AdapterConfig,
        solver: Box<dyn IkSolver>,
    ) -> Result<Self, KinError> {
        if solver.dof() != chain.dof() {
            return Err(ConfigError::DofMismatch {
                expected: chain.dof(),
                got: solver.dof(),
            }
            .into());
        }
        config.validate(chain.dof())?;

        if config.solver_base_frame.is_none() {
            warn!(
                group = %chain.group_name,
                default = config.solver_base_frame(),
                "solver base frame not configured, using default"
            );
        }
        if config.solver_tip_frame.is_none() {
            warn!(
                group = %chain.group_name,
                default = config.solver_tip_frame(),
                "solver tip frame not configured, using default"
            );
        }
        if solver.tip_frame() != config.solver_tip_frame() {
            warn!(
                group = %chain.group_name,
                configured = config.solver_tip_frame(),
                solver = solver.tip_frame(),
                "configured solver tip frame differs from the solver's own tip frame"
            );
        }

        let filter = SolutionFilter::new(
            ValidityChecker::with_bounds(chain.joints.clone()),
            config.tolerance,
        );
        let seed_states = config
            .seed_states
            .iter()
            .cloned()
            .map(JointConfiguration::from)
            .collect();

        Ok(Self {
            chain,
            config,
            solver,
            filter,
            offsets: FrameOffsetCache::new(),
            seed_states,
        })
    }

    /// Compute the frame offsets for the first time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFrame`] when a solver frame (or the
    /// chain's world/tool frame) is unknown to `state`; the adapter stays
    /// unusable until a later recompute succeeds.
    pub fn initialize<S: KinematicState + ?Sized>(&mut self, state: &S) -> Result<(), KinError> {
        self.offsets.recompute(state, &self.chain, &self.config)?;
        Ok(())
    }

    /// Recompute the frame offsets after the host mutated `state`.
    ///
    /// # Errors
    ///
    /// As [`KinematicsAdapter::initialize`].  On failure the previous offsets
    /// are kept but no longer used.
    pub fn on_state_changed<S: KinematicState + ?Sized>(
        &mut self,
        state: &S,
    ) -> Result<(), KinError> {
        debug!(group = %self.chain.group_name, "kinematic state changed");
        self.offsets.recompute(state, &self.chain, &self.config)?;
        Ok(())
    }

    /// All distinct valid IK solutions for `pose` (TCP in world), using the
    /// configured seed states.
    ///
    /// An empty set means the pose has no solution.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotInitialized`] without usable offsets and
    /// propagates solver failures.
    pub fn solve_all_ik(&self, pose: &RigidTransform) -> Result<SolutionSet, KinError> {
        self.solve_all_ik_with_seeds(pose, &self.seed_states)
    }

    /// As [`KinematicsAdapter::solve_all_ik`] but with caller-supplied seeds.
    ///
    /// An empty `seeds` slice falls back to a single all-zero seed.
    pub fn solve_all_ik_with_seeds(
        &self,
        pose: &RigidTransform,
        seeds: &[JointConfiguration],
    ) -> Result<SolutionSet, KinError> {
        let offsets = self.offsets.current(&self.chain)?;
        let solutions = IkEnumerator::new(self.solver.as_ref(), &self.filter, self.chain.dof())
            .solve_all(offsets, pose, seeds)?;
        debug!(
            group = %self.chain.group_name,
            seeds = seeds.len().max(1),
            solutions = solutions.len(),
            "IK enumeration finished"
        );
        Ok(solutions)
    }

    /// The IK solution for `pose` closest (L1) to `seed`.
    ///
    /// The solver is driven from `seed` first, then from every configured seed
    /// state.  Returns `Ok(None)` when no solution exists.
    ///
    /// # Errors
    ///
    /// As [`KinematicsAdapter::solve_all_ik`], plus
    /// [`ConfigError::InvalidSeed`] when `seed` has the wrong length.
    pub fn solve_ik(
        &self,
        pose: &RigidTransform,
        seed: &JointConfiguration,
    ) -> Result<Option<JointConfiguration>, KinError> {
        if seed.len() != self.chain.dof() {
            return Err(ConfigError::InvalidSeed {
                index: 0,
                expected: self.chain.dof(),
                got: seed.len(),
            }
            .into());
        }
        let seeds = merge_seeds(
            std::iter::once(seed.clone()).chain(self.seed_states.iter().cloned()),
            self.filter.tolerance(),
        );
        let solutions = self.solve_all_ik_with_seeds(pose, &seeds)?;
        Ok(closest(seed, solutions.as_slice()).and_then(|i| solutions.get(i).cloned()))
    }

    /// TCP pose in the world frame for `joints`.
    ///
    /// # Errors
    ///
    /// Returns [`KinError::InvalidConfiguration`] when `joints` violates a
    /// validity rule, [`ConfigError::NotInitialized`] without usable offsets,
    /// and propagates solver failures.
    pub fn solve_fk(&self, joints: &JointConfiguration) -> Result<RigidTransform, KinError> {
        self.filter.check(joints)?;
        let offsets = self.offsets.current(&self.chain)?;
        let pose_in_solver_base = self.solver.forward_kinematics(joints)?;
        Ok(offsets.to_world(&pose_in_solver_base))
    }

    /// Whether `joints` passes every validity rule.
    pub fn is_valid(&self, joints: &JointConfiguration) -> bool {
        self.filter.check(joints).is_ok()
    }

    /// Register an extra validity rule applied to IK candidates and FK input.
    pub fn add_validity_rule(&mut self, rule: Box<dyn ValidityRule>) {
        self.filter.validity_mut().add_rule(rule);
    }

    /// Replace the configured seed states.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeed`] if any seed has the wrong length;
    /// the previous seeds are then kept.
    pub fn set_seed_states(&mut self, seeds: Vec<JointConfiguration>) -> Result<(), KinError> {
        let dof = self.chain.dof();
        if let Some((index, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() != dof) {
            return Err(ConfigError::InvalidSeed {
                index,
                expected: dof,
                got: seed.len(),
            }
            .into());
        }
        self.config.seed_states = seeds.iter().map(|s| s.to_vec()).collect();
        self.seed_states = seeds;
        Ok(())
    }

    pub fn seed_states(&self) -> &[JointConfiguration] {
        &self.seed_states
    }

    pub fn dof(&self) -> usize {
        self.chain.dof()
    }

    pub fn chain(&self) -> &ChainSpec {
        &self.chain
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Offsets from the last successful recompute, if still current.
    pub fn frame_offsets(&self) -> Option<&FrameOffsets> {
        self.offsets.current(&self.chain).ok()
    }

    pub fn is_initialized(&self) -> bool {
        self.offsets.is_current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinbridge_frames::pose::{approx_eq, from_xyz_rpy};
    use kinbridge_frames::FrameTree;
    use kinbridge_types::JointLimit;

    /// Two-joint "solver": the tip sits at (q0, q1, 0) in the solver base.
    /// Every pose has two solutions, the true one and one shifted by +1 on q0,
    /// plus a 1e-9 near-duplicate of the true one.
    struct PlanarSolver;

    impl IkSolver for PlanarSolver {
        fn tip_frame(&self) -> &str {
            "tool0"
        }

        fn dof(&self) -> usize {
            2
        }

        fn all_solutions_near(
            &self,
            pose: &RigidTransform,
            _seed: &JointConfiguration,
        ) -> Result<Vec<JointConfiguration>, KinError> {
            let x = pose.translation.x;
            let y = pose.translation.y;
            Ok(vec![
                [x, y].into(),
                [x + 1e-9, y - 1e-9].into(),
                [x + 1.0, y].into(),
            ])
        }

        fn forward_kinematics(
            &self,
            joints: &JointConfiguration,
        ) -> Result<RigidTransform, KinError> {
            if joints.len() != 2 {
                return Err(KinError::Solver("expected 2 joints".into()));
            }
            Ok(from_xyz_rpy([joints[0], joints[1], 0.0], [0.0; 3]))
        }
    }

    fn chain() -> ChainSpec {
        ChainSpec {
            group_name: "planar".into(),
            world_frame: "world".into(),
            tool_frame: "tcp".into(),
            joints: vec![JointLimit::new("x", -2.0, 2.0), JointLimit::new("y", -2.0, 2.0)],
        }
    }

    fn tree() -> FrameTree {
        let mut tree = FrameTree::new("world");
        tree.add_fixed("world", "base_link", from_xyz_rpy([0.5, 0.0, 0.0], [0.0; 3]))
            .unwrap();
        tree.add_fixed("base_link", "tool0", RigidTransform::identity())
            .unwrap();
        tree.add_fixed("tool0", "tcp", from_xyz_rpy([0.0, 0.0, 0.1], [0.0; 3]))
            .unwrap();
        tree
    }

    fn adapter() -> KinematicsAdapter {
        let mut adapter =
            KinematicsAdapter::new(chain(), AdapterConfig::default(), Box::new(PlanarSolver))
                .unwrap();
        adapter.initialize(&tree()).unwrap();
        adapter
    }

    #[test]
    fn dof_mismatch_is_rejected() {
        let mut chain = chain();
        chain.joints.push(JointLimit::new("z", -1.0, 1.0));
        let err = KinematicsAdapter::new(chain, AdapterConfig::default(), Box::new(PlanarSolver))
            .err()
            .unwrap();
        assert_eq!(
            err,
            KinError::Config(ConfigError::DofMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn queries_before_initialize_fail_with_configuration_error() {
        let adapter =
            KinematicsAdapter::new(chain(), AdapterConfig::default(), Box::new(PlanarSolver))
                .unwrap();
        assert!(!adapter.is_initialized());
        let pose = RigidTransform::identity();
        assert!(matches!(
            adapter.solve_all_ik(&pose),
            Err(KinError::Config(ConfigError::NotInitialized { .. }))
        ));
        assert!(matches!(
            adapter.solve_fk(&[0.0, 0.0].into()),
            Err(KinError::Config(ConfigError::NotInitialized { .. }))
        ));
    }

    #[test]
    fn misspelled_base_frame_fails_initialize() {
        let config = AdapterConfig {
            solver_base_frame: Some("base_lnk".into()),
            ..AdapterConfig::default()
        };
        let mut adapter = KinematicsAdapter::new(chain(), config, Box::new(PlanarSolver)).unwrap();
        let err = adapter.initialize(&tree()).unwrap_err();
        assert!(matches!(
            err,
            KinError::Config(ConfigError::UnknownFrame { ref frame, .. }) if frame == "base_lnk"
        ));
        assert!(adapter.frame_offsets().is_none());
    }

    #[test]
    fn solve_all_ik_deduplicates_and_filters() {
        let adapter = adapter();
        // TCP at (1.2, 0.3, 0.1) in world → tip at (0.7, 0.3, 0.0) in base.
        let pose = from_xyz_rpy([1.2, 0.3, 0.1], [0.0; 3]);
        let solutions = adapter.solve_all_ik(&pose).unwrap();
        assert_eq!(solutions.len(), 2);
        assert!((solutions.get(0).unwrap()[0] - 0.7).abs() < 1e-12);
        assert!((solutions.get(1).unwrap()[0] - 1.7).abs() < 1e-12);
    }

    #[test]
    fn out_of_reach_pose_yields_empty_set() {
        let adapter = adapter();
        let pose = from_xyz_rpy([5.0, 0.0, 0.1], [0.0; 3]);
        assert!(adapter.solve_all_ik(&pose).unwrap().is_empty());
        assert_eq!(adapter.solve_ik(&pose, &[0.0, 0.0].into()).unwrap(), None);
    }

    #[test]
    fn solve_ik_picks_closest_to_seed() {
        let adapter = adapter();
        let pose = from_xyz_rpy([1.2, 0.3, 0.1], [0.0; 3]);
        let near_first = adapter.solve_ik(&pose, &[0.0, 0.0].into()).unwrap().unwrap();
        assert!((near_first[0] - 0.7).abs() < 1e-12);
        let near_second = adapter.solve_ik(&pose, &[2.0, 0.3].into()).unwrap().unwrap();
        assert!((near_second[0] - 1.7).abs() < 1e-12);
    }

    #[test]
    fn solve_ik_rejects_short_seed() {
        let adapter = adapter();
        assert!(matches!(
            adapter.solve_ik(&RigidTransform::identity(), &[0.0].into()),
            Err(KinError::Config(ConfigError::InvalidSeed { .. }))
        ));
    }

    #[test]
    fn fk_roundtrips_through_ik() {
        let adapter = adapter();
        let q = JointConfiguration::from([0.4, -0.6]);
        let pose = adapter.solve_fk(&q).unwrap();
        assert!(approx_eq(&pose, &from_xyz_rpy([0.9, -0.6, 0.1], [0.0; 3]), 1e-12));

        let solutions = adapter
            .solve_all_ik_with_seeds(&pose, std::slice::from_ref(&q))
            .unwrap();
        assert!(solutions.contains(&q));
    }

    #[test]
    fn fk_rejects_out_of_limit_configuration() {
        let adapter = adapter();
        assert!(matches!(
            adapter.solve_fk(&[3.0, 0.0].into()),
            Err(KinError::InvalidConfiguration { .. })
        ));
        assert!(!adapter.is_valid(&[3.0, 0.0].into()));
    }

    #[test]
    fn failed_state_change_disables_queries() {
        let mut adapter = adapter();
        assert!(adapter.solve_fk(&[0.0, 0.0].into()).is_ok());

        let broken = FrameTree::new("world");
        assert!(adapter.on_state_changed(&broken).is_err());
        assert!(!adapter.is_initialized());
        assert!(adapter.solve_fk(&[0.0, 0.0].into()).is_err());

        adapter.on_state_changed(&tree()).unwrap();
        assert!(adapter.solve_fk(&[0.0, 0.0].into()).is_ok());
    }

    #[test]
    fn set_seed_states_validates_length() {
        let mut adapter = adapter();
        assert!(adapter
            .set_seed_states(vec![[0.0, 0.0].into(), [0.0].into()])
            .is_err());
        assert!(adapter.seed_states().is_empty());

        adapter
            .set_seed_states(vec![[1.0, 1.0].into()])
            .unwrap();
        assert_eq!(adapter.seed_states().len(), 1);
        assert_eq!(adapter.config().seed_states, vec![vec![1.0, 1.0]]);
    }

    #[test]
    fn extra_validity_rule_filters_candidates() {
        struct PositiveOnly;
        impl ValidityRule for PositiveOnly {
            fn name(&self) -> &str {
                "positive_only"
            }
            fn check(&self, joints: &JointConfiguration) -> Result<(), KinError> {
                if joints.iter().any(|v| *v < 0.0) {
                    return Err(KinError::InvalidConfiguration {
                        rule: self.name().into(),
                        details: "negative joint".into(),
                    });
                }
                Ok(())
            }
        }

        let mut adapter = adapter();
        adapter.add_validity_rule(Box::new(PositiveOnly));
        // Tip at (-0.3, 0.2): only the +1 shifted branch (0.7, 0.2) survives.
        let pose = from_xyz_rpy([0.2, 0.2, 0.1], [0.0; 3]);
        let solutions = adapter.solve_all_ik(&pose).unwrap();
        assert_eq!(solutions.len(), 1);
        assert!((solutions.get(0).unwrap()[0] - 0.7).abs() < 1e-12);
    }
}

//! `kinbridge-core` – Kinematics Resolution
//!
//! Bridges world/TCP-frame IK and FK requests to an analytic solver that only
//! understands its own base and tip frames.  The core does not compute
//! kinematics; it moves poses between conventions, enumerates and filters
//! solver output and picks among solutions.
//!
//! # Modules
//!
//! - [`solver`] – [`IkSolver`][solver::IkSolver]: the black-box solver
//!   contract.
//! - [`offsets`] – [`FrameOffsetCache`][offsets::FrameOffsetCache]: the two
//!   transforms relating world/TCP to solver base/tip, recomputed on every
//!   state change.
//! - [`validity`] – [`ValidityChecker`][validity::ValidityChecker]:
//!   a rule engine deciding whether a joint configuration is admissible
//!   (joint bounds plus any registered rules).
//! - [`filter`] – [`SolutionFilter`][filter::SolutionFilter] and
//!   [`SolutionSet`][filter::SolutionSet]: validity gating and
//!   tolerance-based deduplication.
//! - [`seeds`] – seed set construction.
//! - [`enumerator`] – [`IkEnumerator`][enumerator::IkEnumerator]: runs the
//!   solver across seeds and merges the results.
//! - [`selector`] – closest-to-seed selection under the L1 metric.
//! - [`adapter`] – [`KinematicsAdapter`][adapter::KinematicsAdapter]: the
//!   public IK/FK entry point.

pub mod adapter;
pub mod enumerator;
pub mod filter;
pub mod offsets;
pub mod seeds;
pub mod selector;
pub mod solver;
pub mod validity;

pub use adapter::KinematicsAdapter;
pub use enumerator::IkEnumerator;
pub use filter::{Admission, SolutionFilter, SolutionSet};
pub use offsets::{FrameOffsetCache, FrameOffsets};
pub use solver::IkSolver;
pub use validity::{JointBoundsRule, ValidityChecker, ValidityRule};

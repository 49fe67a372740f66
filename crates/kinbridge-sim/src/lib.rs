//! `kinbridge-sim` – Reference solver and demo cell
//!
//! In-process collaborators for running the full kinematics stack in tests,
//! CI and the CLI without a generated solver or a robot model on disk.
//!
//! # Modules
//!
//! - [`solver`] – [`GantryWristSolver`][solver::GantryWristSolver]: a
//!   closed-form six-axis solver with two wrist branches per pose.
//! - [`scene`] – [`demo_cell`][scene::demo_cell]: a frame tree mounting that
//!   gantry on a linear rail, plus its chain description.

pub mod scene;
pub mod solver;

pub use scene::{DemoCell, demo_cell};
pub use solver::GantryWristSolver;

//! `kinbridge-types` – shared data types and errors for the kinematics
//! resolution crates.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Solver base frame used when [`AdapterConfig::solver_base_frame`] is unset.
pub const DEFAULT_SOLVER_BASE_FRAME: &str = "base_link";

/// Solver tip frame used when [`AdapterConfig::solver_tip_frame`] is unset.
pub const DEFAULT_SOLVER_TIP_FRAME: &str = "tool0";

/// Per-joint tolerance used for deduplication when none is configured.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Ordered joint coordinates for one kinematic chain (radians or meters).
///
/// The length always equals the chain's degree-of-freedom count.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointConfiguration(Vec<f64>);

impl JointConfiguration {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// All-zero configuration of length `dof`.
    pub fn zeros(dof: usize) -> Self {
        Self(vec![0.0; dof])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for JointConfiguration {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for JointConfiguration {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for JointConfiguration {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for JointConfiguration {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec())
    }
}

/// Inclusive position bounds of a single actuated joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

impl JointLimit {
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
        }
    }

    /// Whether `value` lies within `[lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Clamp `value` into `[lower, upper]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

/// The planning group the adapter resolves kinematics for.
///
/// `world_frame` is the frame client poses are expressed in; `tool_frame` is
/// the semantic TCP frame.  `joints` lists the actuated joints in chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub group_name: String,
    pub world_frame: String,
    pub tool_frame: String,
    pub joints: Vec<JointLimit>,
}

impl ChainSpec {
    /// Degree-of-freedom count of the chain.
    pub fn dof(&self) -> usize {
        self.joints.len()
    }
}

/// Tunables for a kinematics adapter.
///
/// Every field has a default, so an empty TOML table deserializes to a usable
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Base frame of the external solver. `None` selects
    /// [`DEFAULT_SOLVER_BASE_FRAME`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_base_frame: Option<String>,

    /// Tip frame of the external solver. `None` selects
    /// [`DEFAULT_SOLVER_TIP_FRAME`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_tip_frame: Option<String>,

    /// Absolute per-joint tolerance for solution equality.
    ///
    /// A single value is applied to every joint, revolute or prismatic alike.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Seeds the solver is driven with when the caller supplies none.
    #[serde(default)]
    pub seed_states: Vec<Vec<f64>>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            solver_base_frame: None,
            solver_tip_frame: None,
            tolerance: default_tolerance(),
            seed_states: Vec::new(),
        }
    }
}

impl AdapterConfig {
    /// Effective solver base frame.
    pub fn solver_base_frame(&self) -> &str {
        self.solver_base_frame
            .as_deref()
            .unwrap_or(DEFAULT_SOLVER_BASE_FRAME)
    }

    /// Effective solver tip frame.
    pub fn solver_tip_frame(&self) -> &str {
        self.solver_tip_frame
            .as_deref()
            .unwrap_or(DEFAULT_SOLVER_TIP_FRAME)
    }

    /// Check the tolerance and that every configured seed has `dof` entries.
    pub fn validate(&self, dof: usize) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        for (index, seed) in self.seed_states.iter().enumerate() {
            if seed.len() != dof {
                return Err(ConfigError::InvalidSeed {
                    index,
                    expected: dof,
                    got: seed.len(),
                });
            }
        }
        Ok(())
    }
}

/// Errors that leave an adapter unusable until its setup is corrected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("cannot find transformation to frame '{frame}' in group '{group}'")]
    UnknownFrame { frame: String, group: String },

    #[error("frame offsets for group '{group}' have not been computed")]
    NotInitialized { group: String },

    #[error("DOF mismatch: chain has {expected} joints, solver has {got}")]
    DofMismatch { expected: usize, got: usize },

    #[error("invalid tolerance {0} (must be finite and > 0)")]
    InvalidTolerance(f64),

    #[error("seed {index} has {got} values, expected {expected}")]
    InvalidSeed {
        index: usize,
        expected: usize,
        got: usize,
    },
}

/// Top-level error type for kinematics resolution.
///
/// There is no "no IK solution" variant; an empty result reports that case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid joint configuration ({rule}): {details}")]
    InvalidConfiguration { rule: String, details: String },

    #[error("Solver failure: {0}")]
    Solver(String),

    #[error("Unknown frame: {0}")]
    UnknownFrame(String),

    #[error("Frame tree error: {0}")]
    FrameTree(String),
}

//! Solution filtering and deduplication.
//!
//! Two joint configurations are equal when every joint differs by strictly
//! less than the tolerance.  The tolerance is absolute and shared by all
//! joints, so on chains mixing revolute (radians) and prismatic (meters) joints
//! it is compared against values of different units.

use kinbridge_types::{JointConfiguration, KinError};

use crate::validity::ValidityChecker;

/// Element-wise tolerance equality of two joint configurations.
///
/// Configurations of different lengths are never equal.
pub fn joints_equal(a: &[f64], b: &[f64], tolerance: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < tolerance)
}

/// Joint configurations with no two members tolerance-equal.
///
/// Insertion order is preserved so results are reproducible for a fixed seed
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionSet {
    solutions: Vec<JointConfiguration>,
    tolerance: f64,
}

impl SolutionSet {
    pub fn new(tolerance: f64) -> Self {
        Self {
            solutions: Vec::new(),
            tolerance,
        }
    }

    /// Whether a tolerance-equal configuration is already present.
    pub fn contains(&self, joints: &[f64]) -> bool {
        self.solutions
            .iter()
            .any(|s| joints_equal(s, joints, self.tolerance))
    }

    /// Append `joints` unless a tolerance-equal member exists.
    ///
    /// Returns whether it was appended.
    pub fn insert(&mut self, joints: JointConfiguration) -> bool {
        if self.contains(&joints) {
            return false;
        }
        self.solutions.push(joints);
        true
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn get(&self, index: usize) -> Option<&JointConfiguration> {
        self.solutions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JointConfiguration> {
        self.solutions.iter()
    }

    pub fn as_slice(&self) -> &[JointConfiguration] {
        &self.solutions
    }

    pub fn into_vec(self) -> Vec<JointConfiguration> {
        self.solutions
    }
}

impl IntoIterator for SolutionSet {
    type Item = JointConfiguration;
    type IntoIter = std::vec::IntoIter<JointConfiguration>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

impl<'a> IntoIterator for &'a SolutionSet {
    type Item = &'a JointConfiguration;
    type IntoIter = std::slice::Iter<'a, JointConfiguration>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}

/// What [`SolutionFilter::admit`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Rejected by a validity rule.
    Invalid,
    /// Tolerance-equal to an existing member.
    Duplicate,
}

/// Validity + deduplication gate for IK candidates.
pub struct SolutionFilter {
    validity: ValidityChecker,
    tolerance: f64,
}

impl SolutionFilter {
    pub fn new(validity: ValidityChecker, tolerance: f64) -> Self {
        Self {
            validity,
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Empty set using this filter's tolerance.
    pub fn empty_set(&self) -> SolutionSet {
        SolutionSet::new(self.tolerance)
    }

    /// Validate `joints` against every rule.
    pub fn check(&self, joints: &JointConfiguration) -> Result<(), KinError> {
        self.validity.check(joints)
    }

    pub fn validity_mut(&mut self) -> &mut ValidityChecker {
        &mut self.validity
    }

    /// Add `candidate` to `set` if it is valid and not a duplicate.
    pub fn admit(&self, set: &mut SolutionSet, candidate: JointConfiguration) -> Admission {
        if !self.validity.is_valid(&candidate) {
            Admission::Invalid
        } else if set.insert(candidate) {
            Admission::Accepted
        } else {
            Admission::Duplicate
        }
    }
}

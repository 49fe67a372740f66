//! [`ValidityChecker`] – joint-configuration validity rules.
//!
//! Every joint configuration passes through [`ValidityChecker::check`] before
//! it is used: IK candidates that fail are dropped, FK requests that fail are
//! rejected.  Each registered [`ValidityRule`] is evaluated in order; the
//! first violation is returned as [`KinError::InvalidConfiguration`].
//!
//! The built-in [`JointBoundsRule`] rejects configurations of the wrong length
//! or with any joint outside its inclusive limits.

use kinbridge_types::{JointConfiguration, JointLimit, KinError};

// ────────────────────────────────────────────────────────────────────────────
// Rule trait
// ────────────────────────────────────────────────────────────────────────────

/// A single invariant a joint configuration must satisfy.
///
/// Implement this trait to add host-specific checks (e.g. coupled-joint
/// constraints) and register them via [`ValidityChecker::add_rule`].
pub trait ValidityRule: Send + Sync {
    /// Human-readable name used in error messages.
    fn name(&self) -> &str;

    /// Return `Ok(())` when `joints` satisfies the invariant, or
    /// [`KinError::InvalidConfiguration`] when it is violated.
    fn check(&self, joints: &JointConfiguration) -> Result<(), KinError>;
}

// ────────────────────────────────────────────────────────────────────────────
// ValidityChecker
// ────────────────────────────────────────────────────────────────────────────

/// Ordered collection of [`ValidityRule`]s.
///
/// # Example
///
/// ```
/// use kinbridge_core::validity::{JointBoundsRule, ValidityChecker};
/// use kinbridge_types::{JointConfiguration, JointLimit};
///
/// let mut checker = ValidityChecker::new();
/// checker.add_rule(Box::new(JointBoundsRule::new(vec![
///     JointLimit::new("j1", -1.0, 1.0),
///     JointLimit::new("j2", -2.0, 2.0),
/// ])));
///
/// assert!(checker.is_valid(&JointConfiguration::from([0.5, -1.5])));
/// assert!(!checker.is_valid(&JointConfiguration::from([1.5, 0.0])));
/// ```
#[derive(Default)]
pub struct ValidityChecker {
    rules: Vec<Box<dyn ValidityRule>>,
}

impl ValidityChecker {
    /// Create a checker with no rules; it accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a checker holding a single [`JointBoundsRule`].
    pub fn with_bounds(limits: Vec<JointLimit>) -> Self {
        let mut checker = Self::new();
        checker.add_rule(Box::new(JointBoundsRule::new(limits)));
        checker
    }

    /// Register a new rule.  Rules are evaluated in insertion order.
    pub fn add_rule(&mut self, rule: Box<dyn ValidityRule>) {
        self.rules.push(rule);
    }

    /// Validate `joints` against every rule, returning the first violation.
    pub fn check(&self, joints: &JointConfiguration) -> Result<(), KinError> {
        for rule in &self.rules {
            rule.check(joints)?;
        }
        Ok(())
    }

    pub fn is_valid(&self, joints: &JointConfiguration) -> bool {
        self.check(joints).is_ok()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in rules
// ────────────────────────────────────────────────────────────────────────────

/// Rejects configurations whose length differs from the number of limits or
/// whose values fall outside `[lower, upper]`.
pub struct JointBoundsRule {
    limits: Vec<JointLimit>,
}

impl JointBoundsRule {
    pub fn new(limits: Vec<JointLimit>) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &[JointLimit] {
        &self.limits
    }
}

impl ValidityRule for JointBoundsRule {
    fn name(&self) -> &str {
        "joint_bounds"
    }

    fn check(&self, joints: &JointConfiguration) -> Result<(), KinError> {
        if joints.len() != self.limits.len() {
            return Err(KinError::InvalidConfiguration {
                rule: self.name().to_string(),
                details: format!(
                    "expected {} joint values, got {}",
                    self.limits.len(),
                    joints.len()
                ),
            });
        }
        for (limit, value) in self.limits.iter().zip(joints.iter()) {
            if !limit.contains(*value) {
                return Err(KinError::InvalidConfiguration {
                    rule: self.name().to_string(),
                    details: format!(
                        "{} = {value} out of [{}, {}]",
                        limit.name, limit.lower, limit.upper
                    ),
                });
            }
        }
        Ok(())
    }
}

//! Seed selection: pick the candidate closest to a target configuration.
//!
//! Distance is the plain L1 norm in joint space, with no per-joint weighting
//! and no angle wrapping.  Callers mixing joint types with very different
//! ranges should scale their seeds accordingly.

use kinbridge_types::JointConfiguration;

/// Sum of absolute per-joint differences.
pub fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "joint configurations of different DOF");
    a.iter().zip(b).map(|(x, y)| (y - x).abs()).sum()
}

/// Index of the candidate with the smallest [`l1_distance`] to `target`.
///
/// Ties go to the earliest candidate.  Returns `None` only for an empty
/// candidate list.
pub fn closest(target: &[f64], candidates: &[JointConfiguration]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let cost = l1_distance(target, candidate);
        if best.is_none_or(|(_, lowest)| cost < lowest) {
            best = Some((index, cost));
        }
    }
    best.map(|(index, _)| index)
}

//! Seed sets for driving a seed-sensitive solver.
//!
//! Analytic solvers often surface different solution branches depending on
//! where they start.  These helpers build seed sets that spread the starting
//! points over the joint space.

use kinbridge_types::{JointConfiguration, JointLimit, KinError};

use crate::filter::SolutionSet;

/// Single all-zero seed of length `dof`.
pub fn zero_seed(dof: usize) -> JointConfiguration {
    JointConfiguration::zeros(dof)
}

/// Sweep pairs of joints across their limits.
///
/// For every `(i, j)` in `pairs`, joints `i` and `j` each take `steps` evenly
/// spaced values from lower to upper limit (the midpoint when `steps == 1`)
/// while every other joint sits at zero clamped into its limits.  Seeds that
/// coincide are emitted once.
///
/// # Errors
///
/// Returns [`KinError::InvalidConfiguration`] when a pair references a joint
/// index outside `limits` or repeats the same joint.
pub fn joint_pair_seeds(
    limits: &[JointLimit],
    pairs: &[(usize, usize)],
    steps: usize,
) -> Result<Vec<JointConfiguration>, KinError> {
    let home: Vec<f64> = limits.iter().map(|l| l.clamp(0.0)).collect();
    let mut seeds = SolutionSet::new(f64::EPSILON);

    for &(i, j) in pairs {
        if i >= limits.len() || j >= limits.len() || i == j {
            return Err(KinError::InvalidConfiguration {
                rule: "seed_pairs".to_string(),
                details: format!("invalid joint pair ({i}, {j}) for {} joints", limits.len()),
            });
        }
        for a in 0..steps {
            for b in 0..steps {
                let mut seed = home.clone();
                seed[i] = sample(&limits[i], a, steps);
                seed[j] = sample(&limits[j], b, steps);
                seeds.insert(seed.into());
            }
        }
    }
    Ok(seeds.into_vec())
}

fn sample(limit: &JointLimit, index: usize, steps: usize) -> f64 {
    if steps <= 1 {
        return 0.5 * (limit.lower + limit.upper);
    }
    limit.lower + (limit.upper - limit.lower) * index as f64 / (steps - 1) as f64
}

/// Concatenate seed sources, keeping the first of any tolerance-equal seeds.
pub fn merge_seeds<I>(seeds: I, tolerance: f64) -> Vec<JointConfiguration>
where
    I: IntoIterator<Item = JointConfiguration>,
{
    let mut merged = SolutionSet::new(tolerance);
    for seed in seeds {
        merged.insert(seed);
    }
    merged.into_vec()
}

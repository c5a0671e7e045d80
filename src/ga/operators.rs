use crate::config::Param;
use rand::Rng;

/// Geometric-decay weights over a population already ranked best-first:
/// `w[0] = 1024`, `w[i] = w[i-1] * 9/10 + 1` in integer arithmetic. The
/// decay strongly favors the top ranks while keeping every rank's weight
/// nonzero.
pub fn rank_weights(n: usize) -> Vec<u64> {
    let mut weights = Vec::with_capacity(n);
    let mut w: u64 = 1024;
    for i in 0..n {
        if i > 0 {
            w = w * 9 / 10 + 1;
        }
        weights.push(w);
    }
    weights
}

/// Weighted rank selection: draw one index from a rank-ordered population,
/// favoring the front. `exclude_id` is drawn with probability zero; its
/// absence does not perturb the other ranks' weights.
pub fn select_rank<R: Rng>(ids: &[&str], exclude_id: Option<&str>, rng: &mut R) -> usize {
    debug_assert!(!ids.is_empty());
    let mut weights = rank_weights(ids.len());
    if let Some(exclude) = exclude_id {
        for (i, id) in ids.iter().enumerate() {
            if *id == exclude {
                weights[i] = 0;
            }
        }
    }

    let sum: u64 = weights.iter().sum();
    debug_assert!(sum > 0, "every candidate excluded");
    let mut r = rng.gen_range(0..sum);
    for (i, &w) in weights.iter().enumerate() {
        if r < w {
            return i;
        }
        r -= w;
    }
    unreachable!("draw exceeded weight sum")
}

/// Uniform crossover: each gene is taken from one of the two parents,
/// chosen independently per gene.
pub fn crossover<R: Rng>(parent1: &[i32], parent2: &[i32], rng: &mut R) -> Vec<i32> {
    parent1
        .iter()
        .zip(parent2)
        .map(|(&a, &b)| if rng.gen_range(0..2) == 0 { a } else { b })
        .collect()
}

/// Damped mutation: pick one gene and move it halfway toward a fresh
/// uniform draw within its bounds (integer average, truncating). A partial
/// step rather than a reset, so late-run convergence is not destroyed.
pub fn mutate<R: Rng>(values: &mut [i32], params: &[Param], rng: &mut R) {
    let i = rng.gen_range(0..values.len());
    let t = rng.gen_range(params[i].minimum_value..=params[i].maximum_value);
    values[i] = ((values[i] as i64 + t as i64) / 2) as i32;
}

/// A fresh gene vector with every gene drawn uniformly within bounds.
pub fn random_values<R: Rng>(params: &[Param], rng: &mut R) -> Vec<i32> {
    params
        .iter()
        .map(|p| rng.gen_range(p.minimum_value..=p.maximum_value))
        .collect()
}

/// The hand-tuned baseline vector used to seed the first elite.
pub fn first_elite_values(params: &[Param]) -> Vec<i32> {
    params.iter().map(|p| p.first_elite_value).collect()
}

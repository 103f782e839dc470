//! Distribution helpers shared by the prior-guided driver.
//!
//! Priors come from raw model scores restricted to the legal slots; the
//! reported policy comes from root visit counts. Both degrade to uniform or
//! empty results instead of producing NaNs.

use rand::Rng;
use rand_distr::{Distribution, Gamma};

/// Temperatures below this collapse the visit policy onto the arg-max.
pub const GREEDY_TEMPERATURE: f32 = 1e-3;

/// Softmax of `logits` over the `legal` slots only, in `legal` order.
///
/// Scores are max-subtracted before exponentiation. If the result degenerates
/// (NaN or infinite scores, zero mass) every legal slot gets `1 / legal.len()`.
pub fn legal_softmax(logits: &[f32], legal: &[usize]) -> Vec<f32> {
    if legal.is_empty() {
        return Vec::new();
    }
    let uniform = vec![1.0 / legal.len() as f32; legal.len()];

    let scores: Vec<f32> = legal
        .iter()
        .map(|&i| logits.get(i).copied().unwrap_or(f32::NAN))
        .collect();
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() || scores.iter().any(|s| s.is_nan()) {
        return uniform;
    }

    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return uniform;
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Generate Dirichlet-distributed noise using Gamma variates.
///
/// Falls back to a flat vector if `alpha` is not a valid Gamma shape or every
/// draw underflows to zero.
pub fn dirichlet_noise<R: Rng>(n: usize, alpha: f32, rng: &mut R) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    let flat = vec![1.0 / n as f32; n];
    let Ok(gamma) = Gamma::new(alpha as f64, 1.0) else {
        return flat;
    };

    let mut samples: Vec<f32> = (0..n).map(|_| gamma.sample(rng) as f32).collect();

    // Normalize
    let sum: f32 = samples.iter().sum();
    if !(sum > 0.0 && sum.is_finite()) {
        return flat;
    }
    for s in &mut samples {
        *s /= sum;
    }
    samples
}

/// Visit counts turned into a distribution: `count^(1/T)` renormalised.
///
/// At `T < GREEDY_TEMPERATURE` all mass goes to the most visited entry (first
/// on ties). Returns all zeros when no entry has visits.
pub fn visit_policy(counts: &[u32], temperature: f32) -> Vec<f32> {
    let mut policy = vec![0.0; counts.len()];
    let total: u64 = counts.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return policy;
    }

    if temperature < GREEDY_TEMPERATURE {
        let mut best = 0;
        for (i, &c) in counts.iter().enumerate() {
            if c > counts[best] {
                best = i;
            }
        }
        policy[best] = 1.0;
        return policy;
    }

    let inv_t = 1.0 / temperature as f64;
    let scaled: Vec<f64> = counts.iter().map(|&c| (c as f64).powf(inv_t)).collect();
    let sum: f64 = scaled.iter().sum();
    if !(sum > 0.0 && sum.is_finite()) {
        // Overflow at tiny temperatures: treat as greedy.
        return visit_policy(counts, 0.0);
    }
    for (p, s) in policy.iter_mut().zip(scaled) {
        *p = (s / sum) as f32;
    }
    policy
}

/// Sample an index from a probability vector.
///
/// Returns `None` if the vector has no positive mass.
pub fn sample_index<R: Rng>(probs: &[f32], rng: &mut R) -> Option<usize> {
    let total: f32 = probs.iter().filter(|p| **p > 0.0).sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let r: f32 = rng.gen::<f32>() * total;
    let mut cumsum = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        cumsum += p;
        if r < cumsum {
            return Some(i);
        }
    }

    // Fallback to last non-zero entry (handles floating point issues)
    probs.iter().rposition(|&p| p > 0.0)
}

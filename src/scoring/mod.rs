//! C6-C9 — shape, location, and language scoring, and their fusion into a
//! ranked candidate list.

pub mod fusion;
pub mod language;
pub mod location;
pub mod shape;

/// Weighted-mean-distance row scoring shared by [`shape`] and [`location`]:
/// `mean_i(w[i] * dist(row, target)) / mean(w)`.
pub(crate) fn weighted_mean_distance(
    target_x: &[f64],
    target_y: &[f64],
    row_x: &[f64],
    row_y: &[f64],
    weights: &[f64],
) -> f64 {
    let n = target_x.len() as f64;
    let mean_w: f64 = weights.iter().sum::<f64>() / weights.len() as f64;
    let weighted_sum: f64 = target_x
        .iter()
        .zip(target_y.iter())
        .zip(row_x.iter().zip(row_y.iter()))
        .zip(weights.iter())
        .map(|(((&tx, &ty), (&rx, &ry)), &w)| {
            w * ((tx - rx).powi(2) + (ty - ry).powi(2)).sqrt()
        })
        .sum();
    (weighted_sum / n) / mean_w
}

/// L1-normalize a non-negative score vector into a probability distribution.
/// Returns a uniform distribution if the input sums to zero (avoids a
/// division producing NaN when every candidate scored exactly zero).
pub(crate) fn normalize_l1(scores: &[f64]) -> Vec<f64> {
    let sum: f64 = scores.iter().sum();
    if sum == 0.0 {
        let n = scores.len().max(1) as f64;
        vec![1.0 / n; scores.len()]
    } else {
        scores.iter().map(|s| s / sum).collect()
    }
}

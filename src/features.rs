//! C3 — FeatureExtractor: per-segment density, directional angle, and
//! corner-count-from-angle-gradient.

use std::f64::consts::PI;

/// `exp(-((v-mu)/sigma)^2 / 2) / sigma * sqrt(2*pi)`, applied element-wise.
///
/// Not a normalized Gaussian PDF (the source multiplies by `sqrt(2*pi)`
/// rather than dividing by it) — reproduced verbatim per `spec.md` §4.3.
pub fn gaussian(values: &[f64], mu: f64, sigma: f64) -> Vec<f64> {
    let norm = (2.0 * PI).sqrt();
    values
        .iter()
        .map(|&v| (-((v - mu) / sigma).powi(2) / 2.0).exp() / sigma * norm)
        .collect()
}

/// Per-sample step length `sqrt(dx^2 + dy^2)`, with the first delta defined
/// as `xs[1]-xs[0]`/`ys[1]-ys[0]` rather than zero, normalized to sum 1.
pub fn density(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let steps = leading_diff(xs, ys);
    let raw: Vec<f64> = steps.iter().map(|&(dx, dy)| (dx * dx + dy * dy).sqrt()).collect();
    let sum: f64 = raw.iter().sum();
    if sum == 0.0 {
        raw
    } else {
        raw.iter().map(|v| v / sum).collect()
    }
}

/// `spec.md` §9 magic constant for the per-point scoring weight below.
pub const DENSITY_GAUSS_SIGMA: f64 = 0.006;

/// Per-point weight used by the shape/location scorers. Computed from the
/// *raw* stroke's density (resampling to a fixed point count makes every
/// step roughly equal length, which would flatten this feature to uniform
/// and neutralize it), gaussian-sharpened around 0, then indexed onto the
/// resampled points via [`crate::sampler::near_point_indices`] so the
/// weight vector lines up with `sampled_x`/`sampled_y`.
pub fn density_weight(raw_x: &[f64], raw_y: &[f64], sampled_x: &[f64], sampled_y: &[f64]) -> Vec<f64> {
    let gauss = gaussian(&density(raw_x, raw_y), 0.0, DENSITY_GAUSS_SIGMA);
    let indices = crate::sampler::near_point_indices(sampled_x, sampled_y, raw_x, raw_y);
    indices.iter().map(|&i| gauss[i]).collect()
}

/// `atan2(dy, dx)` in degrees, with the first delta defined as
/// `xs[1]-xs[0]`/`ys[1]-ys[0]` rather than zero.
pub fn degrees(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    leading_diff(xs, ys)
        .iter()
        .map(|&(dx, dy)| dy.atan2(dx).to_degrees())
        .collect()
}

/// `ediff1d(v, to_begin=v[1]-v[0])`-style per-axis delta pairs: the first
/// entry uses `v[1]-v[0]` instead of the usual leading zero.
fn leading_diff(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    assert!(xs.len() >= 2, "degrees/density require at least 2 points");
    let mut out = Vec::with_capacity(xs.len());
    out.push((xs[1] - xs[0], ys[1] - ys[0]));
    for i in 1..xs.len() {
        out.push((xs[i] - xs[i - 1], ys[i] - ys[i - 1]));
    }
    out
}

/// Second-order central-difference gradient, matching `numpy.gradient`:
/// interior points use the centered difference `(v[i+1]-v[i-1])/2`; the
/// endpoints use one-sided differences.
pub fn gradient(v: &[f64]) -> Vec<f64> {
    let n = v.len();
    if n == 1 {
        return vec![0.0];
    }
    let mut out = vec![0.0; n];
    out[0] = v[1] - v[0];
    out[n - 1] = v[n - 1] - v[n - 2];
    for i in 1..n - 1 {
        out[i] = (v[i + 1] - v[i - 1]) / 2.0;
    }
    out
}

/// The corner band: rising-edge count `H` of `|gradient|` crossing `high`
/// (default 50 degrees), widened to `[0,12)` if the narrow band would admit
/// a count >= 7.
pub fn corner_band(gradient_of_degrees: &[f64], high: f64) -> Vec<i64> {
    let mut rising_edges = 0i64;
    for i in 1..gradient_of_degrees.len() {
        let v1 = gradient_of_degrees[i - 1].abs();
        let v2 = gradient_of_degrees[i].abs();
        if v2 >= high && v1 < high {
            rising_edges += 1;
        }
    }
    let lo = (rising_edges - 2).max(0);
    let band: Vec<i64> = (lo..lo + 4).collect();
    if *band.iter().max().unwrap() >= 7 {
        (0..12).collect()
    } else {
        band
    }
}

/// Default high-bound for `corner_band`, per `spec.md` §9 magic constants.
pub const CORNER_HIGH_BOUND: f64 = 50.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_peaks_at_mu() {
        let g = gaussian(&[0.0, 1.0], 0.0, 60.0);
        assert!(g[0] > g[1]);
    }

    #[test]
    fn density_sums_to_one() {
        let xs = vec![0.0, 1.0, 3.0, 6.0];
        let ys = vec![0.0, 0.0, 0.0, 0.0];
        let d = density(&xs, &ys);
        let sum: f64 = d.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn corner_band_widens_when_busy() {
        // Force a high rising-edge count via an alternating gradient.
        let grad: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 0.0 } else { 80.0 })
            .collect();
        let band = corner_band(&grad, CORNER_HIGH_BOUND);
        assert_eq!(band, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn corner_band_is_four_wide_normally() {
        let grad = vec![0.0, 0.0, 80.0, 80.0, 0.0, 0.0];
        let band = corner_band(&grad, CORNER_HIGH_BOUND);
        assert_eq!(band.len(), 4);
    }

    #[test]
    fn density_weight_is_indexed_onto_sampled_points() {
        let raw_x = vec![0.0, 1.0, 3.0, 6.0];
        let raw_y = vec![0.0, 0.0, 0.0, 0.0];
        let sampled_x = vec![0.0, 2.0, 6.0];
        let sampled_y = vec![0.0, 0.0, 0.0];
        let w = density_weight(&raw_x, &raw_y, &sampled_x, &sampled_y);
        assert_eq!(w.len(), sampled_x.len());
        assert!(w.iter().all(|&x| x >= 0.0));

        // Each sampled point's weight equals the gaussian-density of the
        // raw point it snaps to — uneven step lengths in the raw stroke
        // must survive into the weight vector instead of flattening out.
        let raw_gauss = gaussian(&density(&raw_x, &raw_y), 0.0, DENSITY_GAUSS_SIGMA);
        let nearest = crate::sampler::near_point_indices(&sampled_x, &sampled_y, &raw_x, &raw_y);
        for (i, &j) in nearest.iter().enumerate() {
            assert!((w[i] - raw_gauss[j]).abs() < 1e-9);
        }
    }
}

//! C2 — StrokeSampler: resampling to a fixed point count, length-wise
//! resampling, aspect-preserving normalization, and nearest-raw-point
//! lookup.

use thiserror::Error;

/// Fixed resample count used for shape/location scoring (`spec.md` N=300).
pub const SAMPLE_COUNT: usize = 300;
/// Normalization box side length (`spec.md` L=100).
pub const NORMALIZE_L: f64 = 100.0;
/// Step gap for the length-wise resample used only for angle features.
pub const LENGTH_WISE_GAP: f64 = 30.0;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("stroke cannot be resampled: all points are coincident")]
pub struct DegenerateStroke;

/// Resample `(xs, ys)` to exactly `n` equidistant points by cumulative arc
/// length. If the stroke has a single point, that point is repeated `n`
/// times. Returns `DegenerateStroke` if the stroke has more than one point
/// but zero total arc length (all points identical) — the caller then
/// substitutes the single-point path, per `spec.md` §4.2.
pub fn resample(xs: &[f64], ys: &[f64], n: usize) -> Result<(Vec<f64>, Vec<f64>), DegenerateStroke> {
    assert!(n >= 1, "resample target count must be at least 1");
    assert!(!xs.is_empty() && xs.len() == ys.len());

    if xs.len() == 1 {
        return Ok((vec![xs[0]; n], vec![ys[0]; n]));
    }

    let segment_lengths: Vec<f64> = xs
        .windows(2)
        .zip(ys.windows(2))
        .map(|(wx, wy)| ((wx[1] - wx[0]).powi(2) + (wy[1] - wy[0]).powi(2)).sqrt())
        .collect();
    let total_length: f64 = segment_lengths.iter().sum();
    if total_length == 0.0 {
        return Err(DegenerateStroke);
    }

    let mut out_x = Vec::with_capacity(n);
    let mut out_y = Vec::with_capacity(n);

    let mut seg = 0usize; // current segment index
    let mut point = (xs[0], ys[0]); // current walking position
    let mut traveled = 0.0; // distance covered so far

    for i in 0..n.saturating_sub(1) {
        let target = (i as f64 * total_length) / (n - 1) as f64;
        while target > traveled {
            let c = segment_lengths[seg];
            if target > traveled + c {
                seg += 1;
                point = (xs[seg], ys[seg]);
                traveled += c;
            } else {
                let f = if c == 0.0 { 0.0 } else { (target - traveled) / c };
                point = (
                    (1.0 - f) * point.0 + f * xs[seg + 1],
                    (1.0 - f) * point.1 + f * ys[seg + 1],
                );
                traveled = target;
            }
        }
        out_x.push(point.0);
        out_y.push(point.1);
    }
    out_x.push(*xs.last().unwrap());
    out_y.push(*ys.last().unwrap());

    Ok((out_x, out_y))
}

/// Resample by fixed step `gap` along the polyline, giving a variable-length
/// array used only for angle features.
pub fn resample_length_wise(
    xs: &[f64],
    ys: &[f64],
    gap: f64,
) -> Result<(Vec<f64>, Vec<f64>), DegenerateStroke> {
    let length: f64 = xs
        .windows(2)
        .zip(ys.windows(2))
        .map(|(wx, wy)| ((wx[1] - wx[0]).powi(2) + (wy[1] - wy[0]).powi(2)).sqrt())
        .sum();
    let dots_num = (length / gap) as usize + 1;
    resample(xs, ys, dots_num.max(1))
}

/// Translate/scale so the longer of (width, height) maps to `[0, L-1]`,
/// preserving aspect ratio. For a degenerate stroke (`max(W,H) == 0`) this
/// is a no-op: the input is returned unchanged.
pub fn normalize(sx: &[f64], sy: &[f64], l: f64) -> (Vec<f64>, Vec<f64>) {
    let min_x = sx.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_x = sx.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_y = sy.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_y = sy.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let w = (max_x - min_x).abs();
    let h = (max_y - min_y).abs();
    let m = w.max(h);

    if m == 0.0 {
        return (sx.to_vec(), sy.to_vec());
    }

    let scale = (l - 1.0) / m;
    let nx = sx.iter().map(|x| (x - min_x) * scale).collect();
    let ny = sy.iter().map(|y| (y - min_y) * scale).collect();
    (nx, ny)
}

/// For each sampled point, the index of the nearest raw point by squared
/// Euclidean distance.
///
/// The source computes this via two separate per-axis outer-difference
/// matrices (`np.subtract.outer`) and argmins the summed squares — an
/// unusual route to what is, algebraically, plain nearest-neighbour search:
/// `diff_x[i,j]^2 + diff_y[i,j]^2` is exactly the squared distance between
/// sampled point `i` and raw point `j`. This resolves the open question in
/// `spec.md` §9: the formulation is not a bug, just an indirect way to write
/// squared Euclidean distance, and is reproduced here as a direct distance
/// computation with identical results.
pub fn near_point_indices(sx: &[f64], sy: &[f64], xs: &[f64], ys: &[f64]) -> Vec<usize> {
    sx.iter()
        .zip(sy.iter())
        .map(|(&px, &py)| {
            xs.iter()
                .zip(ys.iter())
                .enumerate()
                .map(|(j, (&qx, &qy))| (j, (px - qx).powi(2) + (py - qy).powi(2)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(j, _)| j)
                .expect("xs/ys non-empty")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_preserves_endpoints() {
        let xs = vec![0.0, 10.0, 20.0];
        let ys = vec![0.0, 0.0, 0.0];
        let (sx, sy) = resample(&xs, &ys, 300).unwrap();
        assert_eq!(sx.len(), 300);
        assert_eq!(sy.len(), 300);
        assert!((sx[0] - 0.0).abs() < 1e-6);
        assert!((sx[299] - 20.0).abs() < 1e-6);
        assert!((sy[0] - 0.0).abs() < 1e-6);
        assert!((sy[299] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn resample_single_point_repeats() {
        let xs = vec![60.0];
        let ys = vec![450.0];
        let (sx, sy) = resample(&xs, &ys, 300).unwrap();
        assert_eq!(sx.len(), 300);
        assert!(sx.iter().all(|&x| x == 60.0));
        assert!(sy.iter().all(|&y| y == 450.0));
    }

    #[test]
    fn resample_rejects_coincident_points() {
        let xs = vec![5.0, 5.0, 5.0];
        let ys = vec![5.0, 5.0, 5.0];
        assert_eq!(resample(&xs, &ys, 300), Err(DegenerateStroke));
    }

    #[test]
    fn normalize_range_is_99() {
        let sx = vec![200.0, 400.0, 1000.0];
        let sy = vec![450.0, 450.0, 450.0];
        let (nx, ny) = normalize(&sx, &sy, NORMALIZE_L);
        let min_nx = nx.iter().cloned().fold(f64::INFINITY, f64::min);
        let min_ny = ny.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_nx = nx.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let max_ny = ny.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!((min_nx - 0.0).abs() < 1e-6);
        assert!((min_ny - 0.0).abs() < 1e-6);
        assert!((max_nx.max(max_ny) - 99.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_degenerate_is_noop() {
        let sx = vec![5.0, 5.0, 5.0];
        let sy = vec![5.0, 5.0, 5.0];
        let (nx, ny) = normalize(&sx, &sy, NORMALIZE_L);
        assert_eq!(nx, sx);
        assert_eq!(ny, sy);
    }

    #[test]
    fn near_point_indices_finds_closest() {
        let sx = vec![0.0, 5.0, 10.0];
        let sy = vec![0.0, 0.0, 0.0];
        let xs = vec![0.0, 4.0, 11.0];
        let ys = vec![0.0, 0.0, 0.0];
        assert_eq!(near_point_indices(&sx, &sy, &xs, &ys), vec![0, 1, 2]);
    }
}

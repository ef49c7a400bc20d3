//! C7 — LocationScorer: weighted distance between the raw stroke and a
//! layout-translated candidate template, gated by an offset-sanity check.
//!
//! Only engaged once a session has a non-zero `(dx, dy)` offset from a
//! prior `CONFIRM`.

use crate::features;
use crate::session::Offset;
use crate::template::PrunedView;

/// Reference keyboard size used for offset translation (`spec.md` §9).
pub const MEAN_GESTURE_KEYBOARD_WIDTH: f64 = 381.0;
pub const MEAN_GESTURE_KEYBOARD_HEIGHT: f64 = 318.0;
/// Per-axis centroid mean at the reference keyboard size, hardcoded in the
/// source rather than derived from `KeyboardModel::mean_center` (see
/// `keyboard::KeyboardModel::mean_center` doc comment).
const REFERENCE_ORIGIN_X: f64 = 190.5;
const REFERENCE_ORIGIN_Y: f64 = 159.0;
/// Sanity-gate threshold: if the offset's magnitude diverges from the
/// stroke's own displacement from the reference origin by this much, the
/// offset is presumed stale and location scoring is skipped.
const SANITY_GATE_THRESHOLD: f64 = 150.0;
/// Gaussian sigma for converting location distance (scaled by 1/10) into a
/// probability weight.
pub const LOCATION_GAUSS_SIGMA: f64 = 10.0;

/// `None` means the sanity gate failed (or the offset is zero): location
/// contributes a flat 1 to fusion rather than a normalized distribution —
/// reproducing the source's incomparable-magnitude behaviour flagged as an
/// Open Question in `spec.md` §9 (see DESIGN.md).
///
/// `stroke_x`/`stroke_y` is the 300-point *resampled* (not normalized)
/// stroke — the same point count as `candidates.sampled(k)` — so it lines
/// up against a translated template point-for-point; the un-resampled
/// pixel stream from the client is the wrong shape for this comparison.
pub fn location_probs(
    stroke_x: &[f64],
    stroke_y: &[f64],
    offset: Offset,
    candidates: &PrunedView<'_>,
    weights: &[f64],
) -> Option<Vec<f64>> {
    if offset.dx == 0.0 && offset.dy == 0.0 {
        return None;
    }

    let mean_x: f64 = stroke_x.iter().sum::<f64>() / stroke_x.len() as f64 - REFERENCE_ORIGIN_X;
    let mean_y: f64 = stroke_y.iter().sum::<f64>() / stroke_y.len() as f64 - REFERENCE_ORIGIN_Y;

    let change = (offset.dx.hypot(offset.dy) - mean_x.hypot(mean_y)).abs();
    if change >= SANITY_GATE_THRESHOLD {
        return None;
    }

    let scores: Vec<f64> = (0..candidates.len())
        .map(|k| {
            let (tx, ty) = candidates.sampled(k);
            let (trans_x, trans_y) = translate_template(tx, ty, offset);
            super::weighted_mean_distance(stroke_x, stroke_y, &trans_x, &trans_y, weights)
        })
        .collect();

    let scaled: Vec<f64> = scores.iter().map(|s| s / 10.0).collect();
    let gauss = features::gaussian(&scaled, 0.0, LOCATION_GAUSS_SIGMA);
    Some(super::normalize_l1(&gauss))
}

/// Scale a template's canonical-layout sampled points to the reference
/// keyboard size and add the session offset.
fn translate_template(tx: &[f64], ty: &[f64], offset: Offset) -> (Vec<f64>, Vec<f64>) {
    use crate::keyboard::{CANONICAL_HEIGHT, CANONICAL_WIDTH};
    let trans_x = tx
        .iter()
        .map(|x| x * MEAN_GESTURE_KEYBOARD_WIDTH / CANONICAL_WIDTH + offset.dx)
        .collect();
    let trans_y = ty
        .iter()
        .map(|y| y * MEAN_GESTURE_KEYBOARD_HEIGHT / CANONICAL_HEIGHT + offset.dy)
        .collect();
    (trans_x, trans_y)
}

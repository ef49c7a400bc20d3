//! C10 — SessionState: per-client last stroke and calibrated location
//! offset. The `UNDO_WORDS` exclusion set is a per-request caller-supplied
//! list (see `fusion::top_k`), not session state.

use crate::keyboard::KeyboardModel;
use crate::sampler::{self, SAMPLE_COUNT};

/// Reference keyboard size CONFIRM calibrates the offset against
/// (`spec.md` §9).
pub const CONFIRM_KEYBOARD_WIDTH: f64 = 381.0;
pub const CONFIRM_KEYBOARD_HEIGHT: f64 = 318.0;

/// Mean displacement between a confirmed word's inferred letter positions
/// and the canonical centroids, at the reference keyboard size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Default for Offset {
    fn default() -> Self {
        Offset { dx: 0.0, dy: 0.0 }
    }
}

impl Offset {
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Where a session sits in the `spec.md` §4.10 state machine. Purely
/// observational — derived from the fields below, not separately stored,
/// so it can never drift out of sync with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fresh,
    Decoded,
    Calibrated,
}

/// Per-client mutable state: the last stroke seen by `DECODE`/`CMD_DECODE`
/// and the offset calibrated by the most recent `CONFIRM`.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    last_stroke: Option<(Vec<i64>, Vec<i64>)>,
    offset: Offset,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn phase(&self) -> Phase {
        if !self.offset.is_zero() {
            Phase::Calibrated
        } else if self.last_stroke.is_some() {
            Phase::Decoded
        } else {
            Phase::Fresh
        }
    }

    /// `DECODE`/`CMD_DECODE`: record the stroke. Does not mutate offset.
    pub fn record_stroke(&mut self, xs: Vec<i64>, ys: Vec<i64>) {
        self.last_stroke = Some((xs, ys));
    }

    /// `UNDO`: reset offset to `(0,0)` and forget the last stroke.
    pub fn undo(&mut self) {
        self.offset = Offset::default();
        self.last_stroke = None;
    }

    /// `CONFIRM(word)`: resample the last stroke to 300 points, locate each
    /// letter's gesture anchor by proportional cumulative-length allocation
    /// over the word's canonical centroid spacing, and store the mean
    /// displacement from the scaled canonical centroids.
    ///
    /// Returns `false` (leaving state unchanged) if there is no last stroke
    /// to calibrate against, or the word's letters aren't all ASCII a-z.
    pub fn confirm(&mut self, word: &str, keyboard: &KeyboardModel) -> bool {
        let Some((xs, ys)) = &self.last_stroke else {
            return false;
        };
        let xs: Vec<f64> = xs.iter().map(|&v| v as f64).collect();
        let ys: Vec<f64> = ys.iter().map(|&v| v as f64).collect();
        let Some((template_x, template_y)) = keyboard.word_polyline(word.as_bytes()) else {
            return false;
        };

        let (sx, sy) = if xs.len() == 1 {
            (vec![xs[0]; SAMPLE_COUNT], vec![ys[0]; SAMPLE_COUNT])
        } else {
            match sampler::resample(&xs, &ys, SAMPLE_COUNT) {
                Ok(r) => r,
                Err(_) => return false,
            }
        };

        let indices = template_sample_indices(&template_x, &template_y, SAMPLE_COUNT);
        let gesture_letter_x: Vec<f64> = indices.iter().map(|&i| sx[i]).collect();
        let gesture_letter_y: Vec<f64> = indices.iter().map(|&i| sy[i]).collect();

        let scaled_template_x: Vec<f64> = template_x
            .iter()
            .map(|x| x * CONFIRM_KEYBOARD_WIDTH / crate::keyboard::CANONICAL_WIDTH)
            .collect();
        let scaled_template_y: Vec<f64> = template_y
            .iter()
            .map(|y| y * CONFIRM_KEYBOARD_HEIGHT / crate::keyboard::CANONICAL_HEIGHT)
            .collect();

        let dx = mean_diff(&gesture_letter_x, &scaled_template_x);
        let dy = mean_diff(&gesture_letter_y, &scaled_template_y);
        self.offset = Offset { dx, dy };
        true
    }
}

fn mean_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x - y).sum::<f64>() / a.len() as f64
}

/// Indices into a 300-point sample array corresponding to each letter of a
/// word's canonical centroid polyline, by cumulative-length proportional
/// allocation (mirrors `KeyboardUtil.py`'s `get_template_sample_points`).
///
/// Single-letter words are a degenerate case the source does not handle
/// cleanly (it would index a length-300 array with a length-2 index list
/// built for a length-1 centroid list); here a single letter anchors to
/// index 0 rather than propagating that mismatch.
fn template_sample_indices(letters_x: &[f64], letters_y: &[f64], count: usize) -> Vec<usize> {
    if letters_x.len() <= 1 {
        return vec![0];
    }
    let mut dists = Vec::with_capacity(letters_x.len() - 1);
    let mut length = 0.0;
    for i in 1..letters_x.len() {
        let d = (letters_x[i] - letters_x[i - 1]).hypot(letters_y[i] - letters_y[i - 1]);
        dists.push(d);
        length += d;
    }
    let step = length / (count - 1) as f64;

    let mut indices = vec![0usize];
    let mut acc = 0.0;
    for i in 0..dists.len().saturating_sub(1) {
        acc += dists[i];
        let idx = if step == 0.0 { 0.0 } else { (acc / step).round() };
        indices.push(idx as usize);
    }
    indices.push(count - 1);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_has_zero_offset() {
        let s = SessionState::new();
        assert_eq!(s.offset(), Offset::default());
        assert_eq!(s.phase(), Phase::Fresh);
    }

    #[test]
    fn decode_then_confirm_calibrates() {
        let kb = KeyboardModel::new();
        let mut s = SessionState::new();
        let xs: Vec<i64> = (0..40).map(|i| 200 + i * 20).collect();
        let ys: Vec<i64> = vec![450; 40];
        s.record_stroke(xs, ys);
        assert_eq!(s.phase(), Phase::Decoded);

        assert!(s.confirm("hello", &kb));
        assert_eq!(s.phase(), Phase::Calibrated);
        assert_ne!(s.offset(), Offset::default());

        // The keyboard diagonal at the reference size bounds any sane offset.
        let diagonal = CONFIRM_KEYBOARD_WIDTH.hypot(CONFIRM_KEYBOARD_HEIGHT);
        let magnitude = s.offset().dx.hypot(s.offset().dy);
        assert!(magnitude <= diagonal);
    }

    #[test]
    fn undo_resets_from_any_state() {
        let kb = KeyboardModel::new();
        let mut s = SessionState::new();
        s.record_stroke(vec![200, 400], vec![450, 450]);
        s.confirm("to", &kb);
        assert_ne!(s.offset(), Offset::default());
        s.undo();
        assert_eq!(s.offset(), Offset::default());
        assert_eq!(s.phase(), Phase::Fresh);
    }

    #[test]
    fn confirm_without_stroke_is_noop() {
        let kb = KeyboardModel::new();
        let mut s = SessionState::new();
        assert!(!s.confirm("hello", &kb));
        assert_eq!(s.offset(), Offset::default());
    }

    #[test]
    fn undo_forgets_last_stroke() {
        let mut s = SessionState::new();
        s.record_stroke(vec![200, 400], vec![450, 450]);
        assert_eq!(s.phase(), Phase::Decoded);
        s.undo();
        assert_eq!(s.phase(), Phase::Fresh);
    }
}

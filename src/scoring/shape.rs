//! C6 — ShapeScorer: weighted mean Euclidean distance between the
//! normalized stroke and each candidate template, turned into a
//! probability distribution.

use crate::features;
use crate::template::PrunedView;
use rayon::prelude::*;

/// Gaussian sigma for converting shape distance into a probability weight.
pub const SHAPE_GAUSS_SIGMA: f64 = 60.0;

/// Per-candidate shape score: `mean_i(w[i] * dist(stroke, template[k])) /
/// mean(w)`.
pub fn shape_scores(nx: &[f64], ny: &[f64], candidates: &PrunedView<'_>, weights: &[f64]) -> Vec<f64> {
    (0..candidates.len())
        .into_par_iter()
        .map(|k| {
            let (tx, ty) = candidates.normalized(k);
            super::weighted_mean_distance(nx, ny, tx, ty, weights)
        })
        .collect()
}

/// Convert shape distances into an L1-normalized probability distribution
/// via `gaussian(score, 0, 60)`.
pub fn shape_probs(scores: &[f64]) -> Vec<f64> {
    let gauss = features::gaussian(scores, 0.0, SHAPE_GAUSS_SIGMA);
    super::normalize_l1(&gauss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KeyboardModel;
    use crate::sampler::{self, NORMALIZE_L, SAMPLE_COUNT};
    use crate::template::{self, Tokenizer};

    struct StubTokenizer;
    impl Tokenizer for StubTokenizer {
        fn tokenize(&self, _word: &str) -> Vec<u32> {
            vec![]
        }
    }

    #[test]
    fn identical_stroke_scores_best() {
        let kb = KeyboardModel::new();
        let tok = StubTokenizer;
        let mut bank = template::TemplateBank::default();
        bank.push(template::build_template("hello", &kb, &tok).unwrap());
        bank.push(template::build_template("world", &kb, &tok).unwrap());

        let (cx, cy) = kb.word_polyline(b"hello").unwrap();
        let (sx, sy) = sampler::resample(&cx, &cy, SAMPLE_COUNT).unwrap();
        let (nx, ny) = sampler::normalize(&sx, &sy, NORMALIZE_L);
        let weights = vec![1.0; SAMPLE_COUNT];

        let indices: Vec<usize> = (0..bank.len()).collect();
        let view = bank.select(&indices);
        let scores = shape_scores(&nx, &ny, &view, &weights);
        let probs = shape_probs(&scores);

        assert!(scores[0] < scores[1]);
        assert!(probs[0] > probs[1]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}

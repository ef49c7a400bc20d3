//! C9 — Fusion & Ranker: combine shape, location, and language
//! probabilities into an integrated score and return the top-k candidates.

use std::collections::HashSet;

pub const SHAPE_EXPONENT: f64 = 1.0;
pub const LOCATION_EXPONENT: f64 = 0.1;
pub const TOP_K_LEXICON: usize = 20;
pub const TOP_K_COMMAND: usize = 229;

/// `g_k = p_shape_k^1 * p_loc_k^0.1`. `location_probs` of `None` means the
/// location-sanity gate failed or no offset was calibrated yet: location
/// contributes a flat 1 for every candidate.
pub fn integrate(shape_probs: &[f64], location_probs: Option<&[f64]>) -> Vec<f64> {
    shape_probs
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let loc = location_probs.map(|l| l[i]).unwrap_or(1.0);
            s.powf(SHAPE_EXPONENT) * loc.powf(LOCATION_EXPONENT)
        })
        .collect()
}

/// Raise raw language scores to `exponent` and L1-normalize across
/// candidates.
pub fn language_probs(raw: &[f64], exponent: f64) -> Vec<f64> {
    let powered: Vec<f64> = raw.iter().map(|&v| v.powf(exponent)).collect();
    super::normalize_l1(&powered)
}

/// `c_k = g_k * L_k`.
pub fn combine(integration: &[f64], language: &[f64]) -> Vec<f64> {
    integration
        .iter()
        .zip(language.iter())
        .map(|(a, b)| a * b)
        .collect()
}

/// Rank `words` by descending `scores`, take the top `k`, then drop any
/// candidate present in `undo_words` — the removal happens *after* ranking,
/// so it can shrink the result below `k` rather than backfilling.
pub fn top_k(words: &[&str], scores: &[f64], k: usize, undo_words: &HashSet<String>) -> (Vec<String>, Vec<f64>) {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut out_words = Vec::new();
    let mut out_scores = Vec::new();
    for i in order.into_iter().take(k) {
        if !undo_words.contains(words[i]) {
            out_words.push(words[i].to_string());
            out_scores.push(scores[i]);
        }
    }
    (out_words, out_scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_treats_missing_location_as_flat() {
        let shape = vec![0.5, 0.3, 0.2];
        let g = integrate(&shape, None);
        assert_eq!(g, shape);
    }

    #[test]
    fn top_k_is_descending_and_monotone() {
        let words = ["a", "b", "c"];
        let scores = [0.1, 0.9, 0.5];
        let (ws, ss) = top_k(&words, &scores, 3, &HashSet::new());
        assert_eq!(ws, vec!["b", "c", "a"]);
        for w in ss.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn top_k_drops_undo_words_after_ranking() {
        let words = ["the", "then", "they"];
        let scores = [0.9, 0.5, 0.3];
        let mut undo = HashSet::new();
        undo.insert("the".to_string());
        let (ws, _) = top_k(&words, &scores, 3, &undo);
        assert_eq!(ws[0], "then");
        assert!(!ws.contains(&"the".to_string()));
    }
}

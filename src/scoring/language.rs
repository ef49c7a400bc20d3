//! C8 — LanguageScorer: unigram, bigram, and neural next-token scoring.
//!
//! Modeled as a small capability trait per `spec.md` §9's "Dynamic dispatch
//! over language-model mode" design note, rather than a sum type, since the
//! neural variant is backed by an external collaborator whose only contract
//! is the scoring interface in `spec.md` §9.

use std::collections::HashMap;

/// Sentinel for "no prior word"/"no prior text".
pub const HEAD_SENTINEL: &str = "_HEAD_";

pub const BIGRAM_EXPONENT: f64 = 0.03;
pub const NEURAL_EXPONENT: f64 = 0.5;
pub const UNIGRAM_SIGMA: f64 = 7.0;
/// Fewer than this many successors for `prev_word` triggers the uniform
/// fallback (`spec.md` law 7).
const BIGRAM_SUCCESSOR_GUARD: usize = 10;

/// Unigram frequency table loaded from `freq.txt`
/// (`"<word>\t<count>\n"`, sorted descending by count).
#[derive(Debug, Clone, Default)]
pub struct UnigramTable {
    freq: HashMap<String, u64>,
    least_frequent: u64,
}

impl UnigramTable {
    pub fn from_entries(entries: Vec<(String, u64)>) -> Self {
        let least_frequent = entries.last().map(|(_, c)| *c).unwrap_or(0);
        Self {
            freq: entries.into_iter().collect(),
            least_frequent,
        }
    }

    /// Per-word frequency converted to a log-distance from the most
    /// frequent candidate in `words`, passed through a `UNIGRAM_SIGMA`
    /// gaussian and L1-normalized — the same distance-to-probability shape
    /// the shape/location scorers use. Unknown words get the minimum
    /// observed frequency.
    pub fn probs(&self, words: &[&str]) -> Vec<f64> {
        let raw: Vec<f64> = words
            .iter()
            .map(|w| *self.freq.get(*w).unwrap_or(&self.least_frequent) as f64)
            .collect();
        let peak = raw.iter().cloned().fold(1.0_f64, f64::max);
        let log_distance: Vec<f64> = raw.iter().map(|&f| (peak / f.max(1.0)).ln()).collect();
        let gauss = crate::features::gaussian(&log_distance, 0.0, UNIGRAM_SIGMA);
        super::normalize_l1(&gauss)
    }
}

/// Bigram table: `prev_word -> [(next_word, count), ...]` sorted descending
/// by count, per `spec.md` §6.
#[derive(Debug, Clone, Default)]
pub struct BigramTable {
    successors: HashMap<String, Vec<(String, u64)>>,
}

impl BigramTable {
    pub fn from_map(successors: HashMap<String, Vec<(String, u64)>>) -> Self {
        Self { successors }
    }

    /// Raw (non-normalized) bigram counts for `candidates` following
    /// `prev_word`. Absent candidates are substituted with the lowest
    /// non-zero count observed for `prev_word` — substituted locally, not
    /// written back into the shared table (see DESIGN.md's resolution of
    /// the bigram-backfill Open Question in `spec.md` §9).
    ///
    /// Returns a uniform vector if `prev_word` has `BIGRAM_SUCCESSOR_GUARD`
    /// or fewer successors.
    pub fn raw_counts(&self, prev_word: &str, candidates: &[&str]) -> Vec<f64> {
        let Some(successors) = self.successors.get(prev_word) else {
            return vec![1.0; candidates.len()];
        };
        if successors.len() <= BIGRAM_SUCCESSOR_GUARD {
            return vec![1.0; candidates.len()];
        }
        let lowest_value = successors.last().map(|(_, c)| *c).unwrap_or(1) as f64;
        let lookup: HashMap<&str, u64> =
            successors.iter().map(|(w, c)| (w.as_str(), *c)).collect();
        candidates
            .iter()
            .map(|w| {
                let raw = lookup.get(*w).copied().unwrap_or(0) as f64;
                if raw == 0.0 { lowest_value } else { raw }
            })
            .collect()
    }
}

/// External collaborator: the neural LM's scoring interface. Only this
/// narrow contract is in scope (`spec.md` §1, §9) — the model's weights and
/// whether it runs in-process or over RPC are not.
pub trait NeuralLanguageModel: Send + Sync {
    /// Logits over the LM's subword vocabulary, conditioned on `prev_text`.
    fn logits(&self, prev_text: &str) -> Vec<f64>;
}

/// Per-candidate neural score: the max logit over each candidate's token
/// ids, shifted so the minimum across candidates is zero. Not itself a
/// probability distribution — used as a relative weight (`spec.md` §4.8).
pub fn neural_scores(model: &dyn NeuralLanguageModel, prev_text: &str, token_ids: &[&[u32]]) -> Vec<f64> {
    let logits = model.logits(prev_text);
    let raw: Vec<f64> = token_ids
        .iter()
        .map(|ids| {
            ids.iter()
                .map(|&id| logits.get(id as usize).copied().unwrap_or(f64::NEG_INFINITY))
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect();
    let min = raw.iter().cloned().fold(f64::INFINITY, f64::min);
    raw.iter().map(|v| v - min).collect()
}

/// Which scorer the decoding pipeline selects for a given `prev_text`,
/// per `spec.md` §4.8: fewer than 2 whitespace-separated tokens -> Bigram,
/// else Neural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageMode {
    Bigram,
    Neural,
}

pub fn choose_mode(prev_text: &str) -> LanguageMode {
    if prev_text.split_whitespace().count() < 2 {
        LanguageMode::Bigram
    } else {
        LanguageMode::Neural
    }
}

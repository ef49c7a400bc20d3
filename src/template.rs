//! C4 — Template / TemplateBank: word -> canonical polyline, resampled,
//! normalized, with run-length-collapsed length and sharp-corner count.
//!
//! The struct-of-arrays layout keeps per-candidate vectorized arithmetic
//! (the shape/location scorers) contiguous and SIMD/`rayon`-friendly.

use crate::keyboard::KeyboardModel;
use crate::sampler::{self, NORMALIZE_L, SAMPLE_COUNT};

/// Sharp-corner threshold (interior angle, degrees) from `spec.md` §9.
pub const SHARP_CORNER_DEGREES: f64 = 90.0;

/// Collapse consecutive repeated letters, e.g. `"ssoo"` -> `"so"`.
/// Mirrors `KeyboardUtil.py`'s `getUnrepeatWord`.
pub fn collapse_runs(word: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(word.len());
    let mut prev: Option<u8> = None;
    for &c in word {
        if prev != Some(c) {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// Run-length-collapsed letter count. Mirrors `getWordLenth`.
pub fn word_length(word: &[u8]) -> usize {
    collapse_runs(word).len()
}

fn three_point_degrees(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let ba = (a.0 - b.0, a.1 - b.1);
    let bc = (c.0 - b.0, c.1 - b.1);
    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let norm_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let norm_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();
    (dot / (norm_ba * norm_bc)).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Sharp-corner count at `degree_threshold`, over the run-length-collapsed
/// word. `-1` for 1-letter words, `0` for 2-letter words. Mirrors
/// `getSharpWordCorner`.
pub fn sharp_corner_count(word: &[u8], keyboard: &KeyboardModel, degree_threshold: f64) -> i64 {
    let collapsed = collapse_runs(word);
    if collapsed.len() == 1 {
        return -1;
    }
    if collapsed.len() == 2 {
        return 0;
    }
    let mut count = 0i64;
    for w in collapsed.windows(3) {
        let p1 = keyboard.centroid(w[0]).expect("ascii a-z");
        let p2 = keyboard.centroid(w[1]).expect("ascii a-z");
        let p3 = keyboard.centroid(w[2]).expect("ascii a-z");
        if three_point_degrees(p1, p2, p3) < degree_threshold {
            count += 1;
        }
    }
    count
}

/// A tokenizer over the neural LM's subword vocabulary. The neural model's
/// internal weights are out of scope (`spec.md` §1); this is the narrow
/// interface the template bank needs to attach `token_id`s.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, word: &str) -> Vec<u32>;
}

/// Tokenizer for deployments with no neural backend configured: every
/// template gets an empty token id list, which is never read since
/// [`crate::scoring::language::neural_scores`] is only reached when a
/// [`crate::scoring::language::NeuralLanguageModel`] is actually wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTokenizer;

impl Tokenizer for NullTokenizer {
    fn tokenize(&self, _word: &str) -> Vec<u32> {
        Vec::new()
    }
}

/// One word's immutable geometric template.
#[derive(Debug, Clone)]
pub struct Template {
    pub word: String,
    pub length: usize,
    pub corners: i64,
    pub sampled_x: Vec<f64>,
    pub sampled_y: Vec<f64>,
    pub normalized_x: Vec<f64>,
    pub normalized_y: Vec<f64>,
    pub token_id: Vec<u32>,
}

/// Build a single template from a word, per `spec.md` §4.4 build procedure.
/// Returns `None` if `word` contains bytes outside ASCII `a`-`z` — the
/// explicit check `spec.md` §9 calls for in place of the source's
/// `word.isalpha` no-op.
pub fn build_template(
    word: &str,
    keyboard: &KeyboardModel,
    tokenizer: &dyn Tokenizer,
) -> Option<Template> {
    let bytes = word.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    let (cx, cy) = keyboard.word_polyline(bytes)?;
    let (sampled_x, sampled_y) = if cx.len() == 1 {
        (vec![cx[0]; SAMPLE_COUNT], vec![cy[0]; SAMPLE_COUNT])
    } else {
        sampler::resample(&cx, &cy, SAMPLE_COUNT).ok()?
    };
    let (normalized_x, normalized_y) = sampler::normalize(&sampled_x, &sampled_y, NORMALIZE_L);

    Some(Template {
        word: word.to_string(),
        length: word_length(bytes),
        corners: sharp_corner_count(bytes, keyboard, SHARP_CORNER_DEGREES),
        sampled_x,
        sampled_y,
        normalized_x,
        normalized_y,
        token_id: tokenizer.tokenize(word),
    })
}

/// Struct-of-arrays bank of templates, built once at process start (or
/// loaded from a precomputed snapshot — see `bank_data::load_or_build_bank`).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TemplateBank {
    pub words: Vec<String>,
    pub lengths: Vec<usize>,
    pub corners: Vec<i64>,
    pub sampled_x: Vec<Vec<f64>>,
    pub sampled_y: Vec<Vec<f64>>,
    pub normalized_x: Vec<Vec<f64>>,
    pub normalized_y: Vec<Vec<f64>>,
    pub token_ids: Vec<Vec<u32>>,
}

impl TemplateBank {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn push(&mut self, t: Template) {
        self.words.push(t.word);
        self.lengths.push(t.length);
        self.corners.push(t.corners);
        self.sampled_x.push(t.sampled_x);
        self.sampled_y.push(t.sampled_y);
        self.normalized_x.push(t.normalized_x);
        self.normalized_y.push(t.normalized_y);
        self.token_ids.push(t.token_id);
    }

    /// Build a bank from a word list, skipping words that fail ASCII
    /// validation (rather than the source's no-op `isalpha` check).
    pub fn build(words: &[String], keyboard: &KeyboardModel, tokenizer: &dyn Tokenizer) -> Self {
        let mut bank = TemplateBank::default();
        for w in words {
            if let Some(t) = build_template(w, keyboard, tokenizer) {
                bank.push(t);
            }
        }
        bank
    }

    /// A read-only view over the subset of rows selected by `indices`,
    /// the shape the Pruner hands to the scorers.
    pub fn select(&self, indices: &[usize]) -> PrunedView<'_> {
        PrunedView { bank: self, indices }
    }
}

/// Index-masked view over a [`TemplateBank`], as produced by the Pruner.
pub struct PrunedView<'a> {
    bank: &'a TemplateBank,
    indices: &'a [usize],
}

impl<'a> PrunedView<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn word(&self, i: usize) -> &str {
        &self.bank.words[self.indices[i]]
    }

    pub fn normalized(&self, i: usize) -> (&[f64], &[f64]) {
        let idx = self.indices[i];
        (&self.bank.normalized_x[idx], &self.bank.normalized_y[idx])
    }

    pub fn sampled(&self, i: usize) -> (&[f64], &[f64]) {
        let idx = self.indices[i];
        (&self.bank.sampled_x[idx], &self.bank.sampled_y[idx])
    }

    pub fn token_ids(&self, i: usize) -> &[u32] {
        &self.bank.token_ids[self.indices[i]]
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.indices.iter().map(move |&i| self.bank.words[i].as_str())
    }
}

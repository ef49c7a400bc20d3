//! Server-side decoder for a shape-writing (gesture) keyboard: normalizes a
//! stroke, prunes a candidate word bank by estimated corner count, scores
//! survivors by shape, location, and language fit, and ranks the fused
//! result.
//!
//! [`DecoderService`] owns the immutable per-process state (keyboard
//! layout, template banks, language tables) and the mutable per-client
//! [`session::SessionState`] registry; `service` wires it to the network.

pub mod bank_data;
pub mod config;
pub mod error;
pub mod features;
pub mod keyboard;
pub mod pruner;
pub mod sampler;
pub mod scoring;
pub mod service;
pub mod session;
pub mod template;

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Mutex;

use error::DecodeError;
use keyboard::KeyboardModel;
use pruner::BankKind;
use sampler::{LENGTH_WISE_GAP, NORMALIZE_L, SAMPLE_COUNT};
use scoring::language::{BigramTable, LanguageMode, NeuralLanguageModel, UnigramTable, HEAD_SENTINEL};
use scoring::{fusion, location, shape};
use session::SessionState;
use template::TemplateBank;

/// One decode's ranked output: candidate words in descending score order.
pub type Ranking = (Vec<String>, Vec<f64>);

pub struct DecoderService {
    pub keyboard: KeyboardModel,
    pub lexicon: TemplateBank,
    pub command: TemplateBank,
    pub unigram: UnigramTable,
    pub bigram: BigramTable,
    pub neural: Option<Box<dyn NeuralLanguageModel>>,
    sessions: Mutex<HashMap<IpAddr, SessionState>>,
}

impl DecoderService {
    pub fn new(
        keyboard: KeyboardModel,
        lexicon: TemplateBank,
        command: TemplateBank,
        unigram: UnigramTable,
        bigram: BigramTable,
        neural: Option<Box<dyn NeuralLanguageModel>>,
    ) -> Self {
        Self {
            keyboard,
            lexicon,
            command,
            unigram,
            bigram,
            neural,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn with_session<R>(&self, client: IpAddr, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut sessions = self.sessions.lock().expect("session registry poisoned");
        let session = sessions.entry(client).or_default();
        f(session)
    }

    /// `DECODE`: rank the lexicon bank against a free-text stroke.
    /// `prev_word` keys the bigram table; `prev_text` selects bigram vs.
    /// neural mode and feeds the neural model. `undo_words` is the
    /// caller-supplied exclusion set for this request (`spec.md` §6's
    /// `UNDO_WORDS`), applied after ranking.
    pub fn decode(
        &self,
        client: IpAddr,
        xs: &[i64],
        ys: &[i64],
        prev_word: &str,
        prev_text: &str,
        undo_words: &[String],
    ) -> Result<Ranking, DecodeError> {
        self.decode_against(client, xs, ys, prev_word, prev_text, undo_words, Bank::Lexicon)
    }

    /// `CMD_DECODE`: rank the command bank (no language model, command
    /// vocabulary only).
    pub fn decode_command(
        &self,
        client: IpAddr,
        xs: &[i64],
        ys: &[i64],
        undo_words: &[String],
    ) -> Result<Ranking, DecodeError> {
        self.decode_against(client, xs, ys, HEAD_SENTINEL, HEAD_SENTINEL, undo_words, Bank::Command)
    }

    /// `CONFIRM(word)`: calibrate this client's location offset against the
    /// last decoded stroke. A no-op (returns `false`) if there is no last
    /// stroke on record.
    pub fn confirm(&self, client: IpAddr, word: &str) -> bool {
        self.with_session(client, |session| session.confirm(word, &self.keyboard))
    }

    /// `UNDO`: reset this client's calibrated offset and forget its last
    /// stroke.
    pub fn undo(&self, client: IpAddr) {
        self.with_session(client, |session| session.undo());
    }

    fn decode_against(
        &self,
        client: IpAddr,
        xs: &[i64],
        ys: &[i64],
        prev_word: &str,
        prev_text: &str,
        undo_words: &[String],
        bank: Bank,
    ) -> Result<Ranking, DecodeError> {
        if xs.is_empty() || xs.len() != ys.len() {
            return Err(DecodeError::BadRequest(
                "stroke must have matching, non-empty x/y arrays".into(),
            ));
        }

        self.with_session(client, |session| {
            session.record_stroke(xs.to_vec(), ys.to_vec());
        });

        let raw_x: Vec<f64> = xs.iter().map(|&v| v as f64).collect();
        let raw_y: Vec<f64> = ys.iter().map(|&v| v as f64).collect();

        let (sampled_x, sampled_y) = if raw_x.len() == 1 {
            (vec![raw_x[0]; SAMPLE_COUNT], vec![raw_y[0]; SAMPLE_COUNT])
        } else {
            sampler::resample(&raw_x, &raw_y, SAMPLE_COUNT)
                .map_err(|e| DecodeError::BadRequest(e.to_string()))?
        };
        let (normalized_x, normalized_y) = sampler::normalize(&sampled_x, &sampled_y, NORMALIZE_L);
        let weights = if raw_x.len() == 1 {
            vec![1.0 / SAMPLE_COUNT as f64; SAMPLE_COUNT]
        } else {
            features::density_weight(&raw_x, &raw_y, &sampled_x, &sampled_y)
        };

        let band = estimate_corner_band(&raw_x, &raw_y);
        let (templates, kind) = match bank {
            Bank::Lexicon => (&self.lexicon, BankKind::Lexicon),
            Bank::Command => (&self.command, BankKind::Command),
        };
        let indices = pruner::prune(templates, &band, kind);
        if indices.is_empty() {
            return Err(DecodeError::EmptyCandidateSet);
        }
        let view = templates.select(&indices);

        let shape_scores = shape::shape_scores(&normalized_x, &normalized_y, &view, &weights);
        let shape_probs = shape::shape_probs(&shape_scores);

        let offset = self.with_session(client, |session| session.offset());
        let location_probs = location::location_probs(&sampled_x, &sampled_y, offset, &view, &weights);

        let integration = fusion::integrate(&shape_probs, location_probs.as_deref());

        let candidate_words: Vec<&str> = view.words().collect();
        let (raw_language, language_exponent) = match bank {
            Bank::Command => (vec![1.0; view.len()], 1.0),
            Bank::Lexicon => self.language_scores(prev_word, prev_text, &view, &candidate_words),
        };
        let language = fusion::language_probs(&raw_language, language_exponent);

        let combined = fusion::combine(&integration, &language);

        let top_k = match bank {
            Bank::Lexicon => fusion::TOP_K_LEXICON,
            Bank::Command => fusion::TOP_K_COMMAND,
        };
        let undo_words: HashSet<String> = undo_words.iter().cloned().collect();
        let (words, scores) = fusion::top_k(&candidate_words, &combined, top_k, &undo_words);

        Ok((words, scores))
    }

    /// Bigram or neural scoring depending on how much prior context
    /// `prev_text` carries, per [`scoring::language::choose_mode`]: fewer
    /// than two whitespace-separated tokens uses the bigram table keyed by
    /// `prev_word` (the empty-context sentinel `_HEAD_` counts as one token
    /// and so naturally looks up the table's bigram-from-sentence-start
    /// entry); two or more tokens use the neural model if configured, else
    /// a flat weight.
    fn language_scores(
        &self,
        prev_word: &str,
        prev_text: &str,
        view: &template::PrunedView<'_>,
        candidate_words: &[&str],
    ) -> (Vec<f64>, f64) {
        match scoring::language::choose_mode(prev_text) {
            LanguageMode::Bigram => (
                self.bigram.raw_counts(prev_word, candidate_words),
                scoring::language::BIGRAM_EXPONENT,
            ),
            LanguageMode::Neural => match &self.neural {
                Some(model) => {
                    let token_ids: Vec<&[u32]> = (0..view.len()).map(|i| view.token_ids(i)).collect();
                    (
                        scoring::language::neural_scores(model.as_ref(), prev_text, &token_ids),
                        scoring::language::NEURAL_EXPONENT,
                    )
                }
                None => (vec![1.0; view.len()], 1.0),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bank {
    Lexicon,
    Command,
}

/// Estimate a corner-count tolerance band from the stroke's own angle
/// gradient, over a length-wise resample (`spec.md` §9). A stroke too
/// short to resample length-wise (fewer than 2 distinct points) is
/// assumed corner-free.
fn estimate_corner_band(raw_x: &[f64], raw_y: &[f64]) -> Vec<i64> {
    match sampler::resample_length_wise(raw_x, raw_y, LENGTH_WISE_GAP) {
        Ok((lw_x, lw_y)) if lw_x.len() >= 2 => {
            let degrees = features::degrees(&lw_x, &lw_y);
            let gradient = features::gradient(&degrees);
            features::corner_band(&gradient, features::CORNER_HIGH_BOUND)
        }
        _ => vec![0, 1, 2, 3],
    }
}

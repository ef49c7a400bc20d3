//! Loading lexicon/command word lists, `TemplateBank` snapshots, and the
//! unigram/bigram language tables off disk, following the teacher's
//! plain-text data-loading style (`data.rs`/`csv_data.rs`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::StartupError;
use crate::keyboard::KeyboardModel;
use crate::scoring::language::{BigramTable, UnigramTable};
use crate::template::{Tokenizer, TemplateBank};

/// Newline-delimited word list, blank lines skipped.
pub fn load_word_list(path: &Path) -> Result<Vec<String>, StartupError> {
    let text = fs::read_to_string(path).map_err(|source| StartupError::WordList {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_word_list(&text))
}

fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load a `TemplateBank` from `snapshot_path` if it exists, otherwise build
/// one from `words_path` and (best-effort) write it back to `snapshot_path`
/// for the next startup.
pub fn load_or_build_bank(
    words_path: &Path,
    snapshot_path: Option<&Path>,
    keyboard: &KeyboardModel,
    tokenizer: &dyn Tokenizer,
) -> Result<TemplateBank, StartupError> {
    if let Some(snapshot) = snapshot_path {
        if snapshot.exists() {
            let bytes = fs::read(snapshot).map_err(|source| StartupError::WordList {
                path: snapshot.to_path_buf(),
                source,
            })?;
            let bank: TemplateBank = bincode::deserialize(&bytes).map_err(|source| {
                StartupError::LexiconSnapshot {
                    path: snapshot.to_path_buf(),
                    source,
                }
            })?;
            return Ok(bank);
        }
    }

    let words = load_word_list(words_path)?;
    let bank = TemplateBank::build(&words, keyboard, tokenizer);

    if let Some(snapshot) = snapshot_path {
        if let Ok(bytes) = bincode::serialize(&bank) {
            if let Err(err) = fs::write(snapshot, bytes) {
                tracing::warn!(path = %snapshot.display(), %err, "failed to write bank snapshot");
            }
        }
    }
    Ok(bank)
}

/// Parse a `freq.txt`-style unigram file: `"<word>\t<count>"` per line,
/// already sorted descending by count.
pub fn load_unigram_table(path: &Path) -> Result<UnigramTable, StartupError> {
    let text = fs::read_to_string(path).map_err(|source| StartupError::UnigramFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(UnigramTable::from_entries(parse_unigram(&text)))
}

fn parse_unigram(text: &str) -> Vec<(String, u64)> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(2, '\t');
            let word = parts.next()?.trim().to_string();
            let count: u64 = parts.next()?.trim().parse().ok()?;
            Some((word, count))
        })
        .collect()
}

/// Parse a bigram successor table: one line per `prev_word`, tab-separated
/// from a comma-joined `next_word:count` list, each already sorted
/// descending by count.
pub fn load_bigram_table(path: &Path) -> Result<BigramTable, StartupError> {
    let text = fs::read_to_string(path).map_err(|source| StartupError::BigramFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BigramTable::from_map(parse_bigram(&text)))
}

fn parse_bigram(text: &str) -> HashMap<String, Vec<(String, u64)>> {
    let mut successors = HashMap::new();
    for line in text.lines() {
        let mut parts = line.splitn(2, '\t');
        let (Some(prev), Some(rest)) = (parts.next(), parts.next()) else {
            continue;
        };
        let list: Vec<(String, u64)> = rest
            .split(',')
            .filter_map(|entry| {
                let mut kv = entry.splitn(2, ':');
                let word = kv.next()?.to_string();
                let count: u64 = kv.next()?.trim().parse().ok()?;
                Some((word, count))
            })
            .collect();
        if !list.is_empty() {
            successors.insert(prev.to_string(), list);
        }
    }
    successors
}

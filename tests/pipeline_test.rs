//! Seed scenarios exercising the full decode pipeline end to end, against
//! small hand-built banks.

use std::net::IpAddr;

use glide_decoder::keyboard::KeyboardModel;
use glide_decoder::scoring::language::{BigramTable, UnigramTable, HEAD_SENTINEL};
use glide_decoder::template::{NullTokenizer, TemplateBank};
use glide_decoder::DecoderService;

const SAMPLE_COUNT: usize = glide_decoder::sampler::SAMPLE_COUNT;

fn client() -> IpAddr {
    "127.0.0.1".parse().unwrap()
}

fn build_service(lexicon_words: &[&str], command_words: &[&str]) -> DecoderService {
    let keyboard = KeyboardModel::new();
    let tokenizer = NullTokenizer;
    let lexicon_words: Vec<String> = lexicon_words.iter().map(|w| w.to_string()).collect();
    let command_words: Vec<String> = command_words.iter().map(|w| w.to_string()).collect();
    let lexicon = TemplateBank::build(&lexicon_words, &keyboard, &tokenizer);
    let command = TemplateBank::build(&command_words, &keyboard, &tokenizer);
    let unigram = UnigramTable::from_entries(
        lexicon_words.iter().map(|w| (w.clone(), 1_000)).collect(),
    );
    let bigram = BigramTable::from_map(Default::default());
    DecoderService::new(keyboard, lexicon, command, unigram, bigram, None)
}

/// A bank whose every template's corner count is far outside the decode
/// pipeline's default (no-corner-evidence) band, so pruning either falls
/// back to everything (command) or comes back empty (lexicon).
fn high_corner_bank(words: &[&str]) -> TemplateBank {
    let mut bank = TemplateBank::default();
    for w in words {
        bank.words.push(w.to_string());
        bank.lengths.push(3);
        bank.corners.push(99);
        bank.sampled_x.push(vec![0.0; SAMPLE_COUNT]);
        bank.sampled_y.push(vec![0.0; SAMPLE_COUNT]);
        bank.normalized_x.push(vec![0.0; SAMPLE_COUNT]);
        bank.normalized_y.push(vec![0.0; SAMPLE_COUNT]);
        bank.token_ids.push(vec![]);
    }
    bank
}

fn word_stroke(keyboard: &KeyboardModel, word: &str) -> (Vec<i64>, Vec<i64>) {
    let (xs, ys) = keyboard.word_polyline(word.as_bytes()).expect("ascii word");
    (
        xs.iter().map(|&v| v.round() as i64).collect(),
        ys.iter().map(|&v| v.round() as i64).collect(),
    )
}

#[test]
fn s1_exact_stroke_ranks_its_own_word_first() {
    let service = build_service(&["to", "on", "at"], &[]);
    let keyboard = KeyboardModel::new();
    let (xs, ys) = word_stroke(&keyboard, "to");

    let no_undo: Vec<String> = Vec::new();
    let (words, _scores) =
        service.decode(client(), &xs, &ys, HEAD_SENTINEL, HEAD_SENTINEL, &no_undo).unwrap();
    assert_eq!(words.first().map(String::as_str), Some("to"));
}

#[test]
fn s2_command_bank_falls_back_when_corners_dont_match() {
    let keyboard = KeyboardModel::new();
    let tokenizer = NullTokenizer;
    let lexicon = TemplateBank::build(&["to".to_string()], &keyboard, &tokenizer);
    let command = high_corner_bank(&["undo", "confirm"]);
    let service = DecoderService::new(
        keyboard,
        lexicon,
        command,
        UnigramTable::default(),
        BigramTable::default(),
        None,
    );

    let (xs, ys) = (vec![100, 200, 300], vec![100, 100, 100]);
    let no_undo: Vec<String> = Vec::new();
    let (words, scores) = service.decode_command(client(), &xs, &ys, &no_undo).unwrap();
    assert_eq!(words.len(), 2);
    assert_eq!(scores.len(), 2);
}

#[test]
fn s3_lexicon_bank_with_no_matching_corners_is_empty_candidate_error() {
    let keyboard = KeyboardModel::new();
    let lexicon = high_corner_bank(&["alpha", "bravo"]);
    let service = DecoderService::new(
        keyboard,
        lexicon,
        TemplateBank::default(),
        UnigramTable::default(),
        BigramTable::default(),
        None,
    );

    let (xs, ys) = (vec![100, 200, 300], vec![100, 100, 100]);
    let no_undo: Vec<String> = Vec::new();
    let err = service
        .decode(client(), &xs, &ys, HEAD_SENTINEL, HEAD_SENTINEL, &no_undo)
        .unwrap_err();
    assert!(matches!(err, glide_decoder::error::DecodeError::EmptyCandidateSet));
}

#[test]
fn s4_confirm_then_redecode_does_not_error() {
    let service = build_service(&["to", "on", "at"], &[]);
    let keyboard = KeyboardModel::new();
    let (xs, ys) = word_stroke(&keyboard, "to");

    let no_undo: Vec<String> = Vec::new();
    service.decode(client(), &xs, &ys, HEAD_SENTINEL, HEAD_SENTINEL, &no_undo).unwrap();
    assert!(service.confirm(client(), "to"));

    let (words, _) =
        service.decode(client(), &xs, &ys, HEAD_SENTINEL, HEAD_SENTINEL, &no_undo).unwrap();
    assert!(!words.is_empty());
}

/// S5: a DECODE whose top candidate would be `"to"` but carries
/// `UNDO_WORDS:["to"]` in the same request excludes it from the reply —
/// the exclusion is a per-request field, not something `UNDO` leaves behind.
#[test]
fn s5_undo_words_excludes_the_named_candidate_from_this_decode() {
    let service = build_service(&["to", "on", "at"], &[]);
    let keyboard = KeyboardModel::new();
    let (xs, ys) = word_stroke(&keyboard, "to");

    let no_undo: Vec<String> = Vec::new();
    let (first, _) =
        service.decode(client(), &xs, &ys, HEAD_SENTINEL, HEAD_SENTINEL, &no_undo).unwrap();
    assert_eq!(first.first().map(String::as_str), Some("to"));

    let undo_words = vec!["to".to_string()];
    let (second, _) =
        service.decode(client(), &xs, &ys, HEAD_SENTINEL, HEAD_SENTINEL, &undo_words).unwrap();
    assert!(!second.iter().any(|w| w == "to"));
}

#[test]
fn s6_confirm_without_prior_decode_is_rejected() {
    let service = build_service(&["to"], &[]);
    assert!(!service.confirm(client(), "to"));
}

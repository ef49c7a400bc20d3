use std::net::IpAddr;
use std::time::Instant;

use glide_decoder::keyboard::KeyboardModel;
use glide_decoder::scoring::language::{BigramTable, UnigramTable, HEAD_SENTINEL};
use glide_decoder::template::{NullTokenizer, TemplateBank};
use glide_decoder::DecoderService;

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "hello", "world", "keyboard",
    "gesture", "stroke", "decode", "confirm", "lexicon", "template", "shape", "location", "language",
];

fn main() {
    println!("=== Decode Pipeline Benchmark ===\n");

    let keyboard = KeyboardModel::new();
    let tokenizer = NullTokenizer;
    let words: Vec<String> = WORDS.iter().map(|w| w.to_string()).collect();
    let lexicon = TemplateBank::build(&words, &keyboard, &tokenizer);
    println!("Built lexicon bank: {} templates\n", lexicon.len());

    let unigram = UnigramTable::from_entries(words.iter().map(|w| (w.clone(), 1_000)).collect());
    let bigram = BigramTable::from_map(Default::default());
    let service = DecoderService::new(keyboard.clone(), lexicon, TemplateBank::default(), unigram, bigram, None);

    let client: IpAddr = "127.0.0.1".parse().unwrap();
    let (xs, ys) = {
        let (cx, cy) = keyboard.word_polyline(b"hello").unwrap();
        (
            cx.iter().map(|&v| v.round() as i64).collect::<Vec<_>>(),
            cy.iter().map(|&v| v.round() as i64).collect::<Vec<_>>(),
        )
    };

    let iterations = 2_000;
    let mut durations = Vec::new();
    let no_undo: Vec<String> = Vec::new();

    for run in 1..=3 {
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = service.decode(client, &xs, &ys, HEAD_SENTINEL, HEAD_SENTINEL, &no_undo).unwrap();
        }
        let duration = start.elapsed();
        durations.push(duration);
        println!(
            "Run {run}/3: {iterations} decodes in {duration:?} ({:.0} decodes/sec)",
            iterations as f64 / duration.as_secs_f64()
        );
    }

    let avg_ms: f64 =
        durations.iter().map(|d| d.as_secs_f64() * 1000.0).sum::<f64>() / durations.len() as f64;
    println!("\nAverage: {:.3} ms/run, {:.3} us/decode", avg_ms, avg_ms * 1000.0 / iterations as f64);
}

//! CLI configuration, following the teacher's `clap` derive layout
//! (`main.rs`'s `Args`).

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version = env!("GIT_VERSION"), about = "Shape-writing keyboard decoder server")]
pub struct Args {
    /// TCP port the decoder listens on.
    #[arg(long, default_value_t = 10086)]
    pub decoder_port: u16,

    /// UDP port answering discovery broadcasts.
    #[arg(long, default_value_t = 9527)]
    pub discovery_port: u16,

    /// Newline-delimited lexicon word list.
    #[arg(long)]
    pub lexicon_words: PathBuf,

    /// Newline-delimited command word list.
    #[arg(long)]
    pub command_words: PathBuf,

    /// Optional prebuilt bincode snapshot of the lexicon bank, written on
    /// first use if absent.
    #[arg(long)]
    pub lexicon_snapshot: Option<PathBuf>,

    /// Optional prebuilt bincode snapshot of the command bank, written on
    /// first use if absent.
    #[arg(long)]
    pub command_snapshot: Option<PathBuf>,

    /// Unigram frequency file (`freq.txt`-style).
    #[arg(long)]
    pub unigram_file: PathBuf,

    /// Bigram successor table file.
    #[arg(long)]
    pub bigram_file: PathBuf,

    /// `tracing-subscriber` `EnvFilter` directive, e.g. "info" or
    /// "glide_decoder=debug".
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}

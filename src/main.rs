use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;

use glide_decoder::config::Args;
use glide_decoder::error::StartupError;
use glide_decoder::keyboard::KeyboardModel;
use glide_decoder::service::{DecoderListener, DiscoveryResponder};
use glide_decoder::template::NullTokenizer;
use glide_decoder::{bank_data, DecoderService};

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_new(&args.log_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "startup failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let keyboard = KeyboardModel::new();
    let tokenizer = NullTokenizer;

    tracing::info!(path = %args.lexicon_words.display(), "loading lexicon bank");
    let lexicon = bank_data::load_or_build_bank(
        &args.lexicon_words,
        args.lexicon_snapshot.as_deref(),
        &keyboard,
        &tokenizer,
    )
    .context("loading lexicon bank")?;
    tracing::info!(count = lexicon.len(), "lexicon bank ready");

    tracing::info!(path = %args.command_words.display(), "loading command bank");
    let command = bank_data::load_or_build_bank(
        &args.command_words,
        args.command_snapshot.as_deref(),
        &keyboard,
        &tokenizer,
    )
    .context("loading command bank")?;
    tracing::info!(count = command.len(), "command bank ready");

    let unigram = bank_data::load_unigram_table(&args.unigram_file).context("loading unigram table")?;
    let bigram = bank_data::load_bigram_table(&args.bigram_file).context("loading bigram table")?;

    let service = Arc::new(DecoderService::new(keyboard, lexicon, command, unigram, bigram, None));

    let decoder = DecoderListener::bind(args.decoder_port, Arc::clone(&service))
        .map_err(|source| StartupError::Bind {
            address: format!("0.0.0.0:{}", args.decoder_port),
            source,
        })
        .context("binding decoder socket")?;
    let discovery = DiscoveryResponder::bind(args.discovery_port, args.decoder_port)
        .map_err(|source| StartupError::Bind {
            address: format!("0.0.0.0:{}", args.discovery_port),
            source,
        })
        .context("binding discovery socket")?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let discovery_shutdown = Arc::clone(&shutdown);
    let discovery_thread = thread::spawn(move || discovery.serve(discovery_shutdown));

    tracing::info!(
        decoder_port = args.decoder_port,
        discovery_port = args.discovery_port,
        "serving"
    );
    decoder.serve(shutdown);

    let _ = discovery_thread.join();
    Ok(())
}

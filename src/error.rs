use std::path::PathBuf;

/// Errors raised while decoding a single request.
///
/// Per the propagation policy: these never escape the connection handler.
/// They are logged and the connection is closed without a reply.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("pruning left no candidates")]
    EmptyCandidateSet,

    #[error("callback connection to client failed: {0}")]
    TransientNetworkError(#[from] std::io::Error),
}

/// Errors that abort startup. Never caught; the process exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load lexicon snapshot from {path}: {source}")]
    LexiconSnapshot {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to read word list or snapshot from {path}: {source}")]
    WordList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load unigram frequency file from {path}: {source}")]
    UnigramFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load bigram table from {path}: {source}")]
    BigramFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

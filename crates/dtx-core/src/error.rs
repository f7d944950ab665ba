use std::path::PathBuf;

use thiserror::Error;

/// Error from encoding or decoding a step payload.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("JSON payload codec failed")]
    Json(#[from] serde_json::Error),

    #[error("binary payload codec failed")]
    Binary(#[from] bincode::Error),

    #[error("payload type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
}

/// Error from a log store operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("no log entries for transaction '{id}'")]
    NotFound { id: String },

    #[error("invalid transaction id '{id}'")]
    InvalidId { id: String },

    #[error("log store is closed")]
    Closed,

    #[error("log store I/O failed at '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt log entry at '{path}' line {line}")]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize log entry")]
    Encode(#[source] serde_json::Error),
}

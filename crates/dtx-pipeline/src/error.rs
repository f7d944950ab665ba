use std::path::PathBuf;

use dtx_core::{CodecError, StoreError, TxState};
use thiserror::Error;

/// Unrecoverable pipeline failure.
///
/// A `TxError` means a transition could not be made durable, so the in-memory
/// view and the log may have diverged. Callers should stop driving the
/// transaction and treat the error as fatal for the process. Handler failures
/// are never reported here; they are absorbed by compensation and recorded on
/// ABOUT entries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TxError {
    #[error("failed to persist {state} entry for transaction '{id}'")]
    Persist {
        id: String,
        state: TxState,
        #[source]
        source: StoreError,
    },

    #[error("failed to load history for transaction '{id}'")]
    LoadHistory {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to encode '{type_name}' payload of step '{task}'")]
    Encode {
        task: String,
        type_name: &'static str,
        #[source]
        source: CodecError,
    },
}

/// Error from loading pipeline options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pipeline options in '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid pipeline options")]
    Invalid(#[source] toml::de::Error),
}

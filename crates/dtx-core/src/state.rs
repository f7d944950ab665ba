use std::fmt;

use serde::{Deserialize, Serialize};

/// State of a transaction at the moment a log entry was written.
///
/// Serializes as the upper-case state name; this is part of the durable
/// record layout and must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxState {
    #[default]
    Unknown,
    Begin,
    Commit,
    About,
    Rollback,
    End,
}

impl TxState {
    /// Whether the transaction is unwinding (ABOUT or ROLLBACK).
    #[must_use]
    pub fn is_aborting(self) -> bool {
        matches!(self, Self::About | Self::Rollback)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Begin => "BEGIN",
            Self::Commit => "COMMIT",
            Self::About => "ABOUT",
            Self::Rollback => "ROLLBACK",
            Self::End => "END",
        }
    }
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

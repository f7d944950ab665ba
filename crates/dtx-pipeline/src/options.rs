use std::fs;
use std::path::Path;

use dtx_core::Codec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pipeline configuration, fixed at construction.
///
/// Loadable from a TOML table:
///
/// ```toml
/// debug = true
/// codec = "binary"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    debug: bool,
    codec: Codec,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit every recorded transition as an `info` event on target `dtx`.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    #[must_use]
    pub fn debug(self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn codec(self) -> Codec {
        self.codec
    }

    /// Parse options from TOML text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML, unknown keys or invalid values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Invalid)
    }

    /// Read options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

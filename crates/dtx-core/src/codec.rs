use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Encoding applied to every step payload written into a log entry.
///
/// Chosen once per pipeline. `Json` is human-readable and suits diagnostics
/// and text-based stores; `Binary` (bincode) is compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    #[serde(alias = "textual", alias = "text")]
    Json,
    Binary,
}

impl Codec {
    /// Encode a value under this codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented in this encoding.
    pub fn encode<T>(self, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + ?Sized,
    {
        match self {
            Self::Json => Ok(serde_json::to_vec(value)?),
            Self::Binary => Ok(bincode::serialize(value)?),
        }
    }

    /// Decode bytes produced by [`Codec::encode`] with the same codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid encoding of `T`.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            Self::Json => Ok(serde_json::from_slice(bytes)?),
            Self::Binary => Ok(bincode::deserialize(bytes)?),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Json => "json",
            Self::Binary => "binary",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Transfer {
        from: String,
        to: String,
        cents: u64,
    }

    fn transfer() -> Transfer {
        Transfer {
            from: "alice".to_string(),
            to: "bob".to_string(),
            cents: 1250,
        }
    }

    #[test]
    fn json_encoding_is_readable_text() -> anyhow::Result<()> {
        let bytes = Codec::Json.encode(&transfer())?;

        let text = String::from_utf8(bytes)?;

        assert_eq!(text, r#"{"from":"alice","to":"bob","cents":1250}"#);
        Ok(())
    }

    #[test]
    fn binary_encoding_is_smaller_than_json() -> anyhow::Result<()> {
        let json = Codec::Json.encode(&transfer())?;
        let binary = Codec::Binary.encode(&transfer())?;

        assert!(binary.len() < json.len());
        Ok(())
    }

    #[test]
    fn decoding_with_the_wrong_codec_fails() -> anyhow::Result<()> {
        let bytes = Codec::Binary.encode(&transfer())?;

        let result = Codec::Json.decode::<Transfer>(&bytes);

        assert!(matches!(result, Err(CodecError::Json(_))));
        Ok(())
    }

    #[test]
    fn textual_alias_selects_json() -> anyhow::Result<()> {
        assert_eq!(serde_json::from_str::<Codec>("\"textual\"")?, Codec::Json);
        assert_eq!(serde_json::from_str::<Codec>("\"binary\"")?, Codec::Binary);
        Ok(())
    }

    #[test]
    fn default_codec_is_json() {
        assert_eq!(Codec::default(), Codec::Json);
        assert_eq!(Codec::default().to_string(), "json");
    }
}

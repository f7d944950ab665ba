use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::error::CodecError;
use crate::message::Message;
use crate::state::TxState;

/// One record of a transaction state transition.
///
/// This is the durable layout every [`Store`](crate::Store) reads and writes.
/// Entries for one transaction id are totally ordered by append sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLog {
    /// Transaction id.
    pub id: String,
    /// State at the time of the write.
    pub state: TxState,
    /// Step id; empty for BEGIN and END.
    #[serde(default)]
    pub task: String,
    /// Payload type tag; empty when the entry has no payload.
    #[serde(rename = "type", default)]
    pub type_name: String,
    /// Encoded payload bytes.
    #[serde(default)]
    pub data: Vec<u8>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Error text; only set on ABOUT entries.
    #[serde(rename = "errorMessage", alias = "error_message", default)]
    pub error_message: String,
}

impl TxLog {
    /// Entry without a step or payload, as written for BEGIN and END.
    #[must_use]
    pub fn marker(id: impl Into<String>, state: TxState, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            state,
            task: String::new(),
            type_name: String::new(),
            data: Vec::new(),
            timestamp,
            error_message: String::new(),
        }
    }

    /// Entry for a step, carrying its encoded payload.
    #[must_use]
    pub fn step(
        id: impl Into<String>,
        state: TxState,
        task: impl Into<String>,
        type_name: impl Into<String>,
        data: Vec<u8>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            state,
            task: task.into(),
            type_name: type_name.into(),
            data,
            timestamp,
            error_message: String::new(),
        }
    }

    #[must_use]
    pub fn has_payload(&self) -> bool {
        !self.type_name.is_empty()
    }

    /// Decode the payload as `M`, checking the recorded type tag first.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TypeMismatch`] if the entry holds a different
    /// message type, or a codec error if the bytes do not decode.
    pub fn decode_payload<M: Message>(&self, codec: Codec) -> Result<M, CodecError> {
        if self.type_name != M::TYPE_NAME {
            return Err(CodecError::TypeMismatch {
                expected: M::TYPE_NAME,
                found: self.type_name.clone(),
            });
        }
        codec.decode(&self.data)
    }
}

impl fmt::Display for TxLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.timestamp, self.id, self.state)?;
        if !self.task.is_empty() {
            write!(f, " task={}", self.task)?;
        }
        if self.has_payload() {
            write!(f, " type={} ({} bytes)", self.type_name, self.data.len())?;
        }
        if !self.error_message.is_empty() {
            write!(f, " error=\"{}\"", self.error_message)?;
        }
        Ok(())
    }
}

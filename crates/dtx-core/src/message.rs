use std::any::Any;
use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::Codec;
use crate::error::CodecError;

/// A schema-typed payload handed to step handlers.
///
/// Every message carries a stable type tag that is recorded next to its
/// encoded bytes in the log, so readers can tell what a log entry holds
/// without guessing.
///
/// ```
/// use dtx_core::Message;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct ReserveSeat {
///     flight: String,
///     seat: String,
/// }
///
/// impl Message for ReserveSeat {
///     const TYPE_NAME: &'static str = "booking.ReserveSeat";
/// }
/// ```
pub trait Message: Serialize + DeserializeOwned + Debug + Send + Sync + 'static {
    /// Type tag written to the `type` field of log entries.
    const TYPE_NAME: &'static str;
}

/// Object-safe view of a [`Message`].
///
/// Tasks hold their commit and rollback payloads behind this trait so a
/// single registry can store steps with different message types.
pub trait Payload: Any + Debug + Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Encode the payload with the given codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded.
    fn encode(&self, codec: Codec) -> Result<Vec<u8>, CodecError>;

    /// Borrow as `Any` for downcasting to the concrete message type.
    fn as_any(&self) -> &dyn Any;
}

impl<M: Message> Payload for M {
    fn type_name(&self) -> &'static str {
        M::TYPE_NAME
    }

    fn encode(&self, codec: Codec) -> Result<Vec<u8>, CodecError> {
        codec.encode(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//! Durable log layer for dtx transaction pipelines.
//!
//! This crate defines what a pipeline writes down: the [`TxState`] of every
//! transition, the [`TxLog`] record that carries it, the [`Codec`] used to
//! encode step payloads, and the [`Store`] contract any persistence backend
//! implements. Two reference stores are included: [`MemStore`] and
//! [`FileStore`].

pub mod codec;
pub mod entry;
pub mod error;
pub mod message;
pub mod state;
pub mod store;

pub use codec::Codec;
pub use entry::TxLog;
pub use error::{CodecError, StoreError};
pub use message::{Message, Payload};
pub use state::TxState;
pub use store::{FileStore, MemStore, Store};

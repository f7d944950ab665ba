//! Saga-style transaction pipeline.
//!
//! A [`Pipeline`] runs a sequence of [`Task`]s, each pairing a forward
//! (commit) action with a compensating (rollback) action. Every transition is
//! written to a durable [`Store`]. When a commit fails, the durable history is
//! replayed newest-first and the compensation of every committed step is run,
//! leaving an ABOUT entry with the failure and one ROLLBACK entry per
//! compensated step as the audit trail.

mod context;
mod error;
mod options;
mod pipeline;
mod registry;
mod task;

pub use context::{Context, StateHandle};
pub use dtx_core::{
    Codec, CodecError, FileStore, MemStore, Message, Payload, Store, StoreError, TxLog, TxState,
};
pub use error::{ConfigError, TxError};
pub use options::Options;
pub use pipeline::{Clock, Pipeline};
pub use registry::TaskRegistry;
pub use task::{FnHandler, Handler, HandlerError, Task, handler_fn};

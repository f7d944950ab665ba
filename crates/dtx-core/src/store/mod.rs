mod file;
mod mem;

pub use file::FileStore;
pub use mem::MemStore;

use crate::entry::TxLog;
use crate::error::StoreError;

/// Append-only persistence for transaction logs, keyed by transaction id.
///
/// A store may be shared by many pipelines, so every method takes `&self`.
/// Implementations must keep appends for one id in order even when they come
/// from different pipelines.
pub trait Store: Send + Sync {
    /// Durably record one entry under `entry.id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be made durable.
    fn append(&self, entry: &TxLog) -> Result<(), StoreError>;

    /// Load all entries for `id` in append order. An unknown id has no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    fn load(&self, id: &str) -> Result<Vec<TxLog>, StoreError>;

    /// List the transaction ids that currently have entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the ids cannot be enumerated.
    fn list_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Discard every entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries could not be removed.
    fn flush(&self, id: &str) -> Result<(), StoreError>;

    /// Most recent entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` has no entries.
    fn last(&self, id: &str) -> Result<TxLog, StoreError>;

    /// Release resources held by the store.
    ///
    /// # Errors
    ///
    /// Returns an error if resources could not be released cleanly.
    fn close(&self) -> Result<(), StoreError>;
}

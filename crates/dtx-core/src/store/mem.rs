use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;

use super::Store;
use crate::entry::TxLog;
use crate::error::StoreError;

/// In-memory log store.
///
/// Ids are listed in the order they were first appended. Nothing survives
/// the process; intended for tests and single-process use.
#[derive(Debug, Default)]
pub struct MemStore {
    logs: RwLock<IndexMap<String, Vec<TxLog>>>,
    closed: AtomicBool,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Store for MemStore {
    fn append(&self, entry: &TxLog) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut logs = self.logs.write().unwrap_or_else(PoisonError::into_inner);
        logs.entry(entry.id.clone()).or_default().push(entry.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Vec<TxLog>, StoreError> {
        self.ensure_open()?;
        let logs = self.logs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(logs.get(id).cloned().unwrap_or_default())
    }

    fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        let logs = self.logs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(logs.keys().cloned().collect())
    }

    fn flush(&self, id: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut logs = self.logs.write().unwrap_or_else(PoisonError::into_inner);
        logs.shift_remove(id);
        Ok(())
    }

    fn last(&self, id: &str) -> Result<TxLog, StoreError> {
        self.ensure_open()?;
        let logs = self.logs.read().unwrap_or_else(PoisonError::into_inner);
        logs.get(id)
            .and_then(|entries| entries.last())
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        self.logs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

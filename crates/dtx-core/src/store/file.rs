use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::Store;
use crate::entry::TxLog;
use crate::error::StoreError;

const LOG_EXTENSION: &str = "jsonl";

/// Directory-backed log store.
///
/// Each transaction id gets one JSON-lines file, `<dir>/<id>.jsonl`, holding
/// one entry per line in append order. Appends are synced to disk before
/// returning.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
    closed: AtomicBool,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn log_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(StoreError::InvalidId { id: id.to_string() });
        }
        Ok(self.dir.join(format!("{id}.{LOG_EXTENSION}")))
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Store for FileStore {
    fn append(&self, entry: &TxLog) -> Result<(), StoreError> {
        self.ensure_open()?;
        let path = self.log_path(&entry.id)?;
        let mut line = serde_json::to_vec(entry).map_err(StoreError::Encode)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        file.write_all(&line).map_err(io_err)?;
        file.sync_data().map_err(io_err)?;
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Vec<TxLog>, StoreError> {
        self.ensure_open()?;
        let path = self.log_path(id)?;
        // Readers wait for in-flight appends so a partially written line is never seen.
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|source| StoreError::Decode {
                path: path.clone(),
                line: index + 1,
                source,
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        let io_err = |source| StoreError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut ids = Vec::new();
        for dir_entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = dir_entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn flush(&self, id: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let path = self.log_path(id)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(id, path = %path.display(), "flushed transaction log");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn last(&self, id: &str) -> Result<TxLog, StoreError> {
        self.load(id)?
            .pop()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

use std::io::Write;

use clap::Subcommand;
use dtx_core::{Codec, Store, StoreError};
use tracing::debug;

use crate::error::Result;
use crate::render::entry_line;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List transaction ids with recorded entries
    List,
    /// Show every entry recorded for a transaction
    Show { id: String },
    /// Show the most recent entry of a transaction
    Last { id: String },
    /// Discard every entry recorded for a transaction
    Flush { id: String },
}

impl Commands {
    pub(crate) fn execute(self, store: &dyn Store, codec: Codec, out: &mut dyn Write) -> Result<()> {
        match self {
            Self::List => {
                for id in store.list_ids()? {
                    writeln!(out, "{id}")?;
                }
            }
            Self::Show { id } => {
                let entries = store.load(&id)?;
                if entries.is_empty() {
                    return Err(StoreError::NotFound { id }.into());
                }
                debug!(id = %id, count = entries.len(), "loaded transaction log");
                for entry in &entries {
                    writeln!(out, "{}", entry_line(entry, codec))?;
                }
            }
            Self::Last { id } => {
                let entry = store.last(&id)?;
                writeln!(out, "{}", entry_line(&entry, codec))?;
            }
            Self::Flush { id } => {
                store.flush(&id)?;
                writeln!(out, "flushed {id}")?;
            }
        }
        Ok(())
    }
}

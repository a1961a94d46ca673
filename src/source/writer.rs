//! Source appender
//!
//! Appends newly learned records to a source file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::SyncStrategy;

use super::entry::format_record;

/// Appends records to a source file
///
/// Errors stay `std::io::Error` here; the owning table wraps them with
/// namespace context. One record is one `write_all`, so a crash cannot
/// interleave records; at worst it leaves a torn tail the reader drops.
/// Serialization of concurrent appends is the owning table's business.
#[derive(Debug)]
pub struct SourceAppender {
    file: File,
    hex_width: usize,
    sync: SyncStrategy,
    unsynced: usize,
}

impl SourceAppender {
    /// Open a source file for appending, creating it if needed
    pub fn open(path: &Path, hex_width: usize, sync: SyncStrategy) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            hex_width,
            sync,
            unsynced: 0,
        })
    }

    /// Append one record, syncing per the configured strategy
    pub fn append(&mut self, hash: u64, value: &str) -> std::io::Result<()> {
        let line = format_record(hash, value, self.hex_width);
        self.file.write_all(line.as_bytes())?;
        self.unsynced += 1;

        match self.sync {
            SyncStrategy::EveryWrite => self.sync_now()?,
            SyncStrategy::EveryNEntries { count } => {
                if self.unsynced >= count {
                    self.sync_now()?;
                }
            }
        }

        Ok(())
    }

    /// Force any unsynced appends to disk
    pub fn sync(&mut self) -> std::io::Result<()> {
        if self.unsynced > 0 {
            self.sync_now()?;
        }
        Ok(())
    }

    /// Appends written since the last sync
    pub fn unsynced_count(&self) -> usize {
        self.unsynced
    }

    fn sync_now(&mut self) -> std::io::Result<()> {
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }
}

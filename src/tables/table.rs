//! Hash table implementation
//!
//! A single namespace's dictionary plus the append handle for its source
//! file. Reads and writes go through the loaded-state guards below, which
//! hide the lazy-load dance from the operation code.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::config::SyncStrategy;
use crate::error::{Result, StoreError};
use crate::hashing::HashAlgorithm;
use crate::source::{SourceAppender, SourceReader};

use super::InsertOutcome;

// ============================================================================
// Hash Table
// ============================================================================

/// One namespace's hash→string dictionary
#[derive(Debug)]
pub struct HashTable {
    /// Namespace name, unique within the registry
    name: String,

    /// Backing source file
    path: PathBuf,

    /// Hash function this namespace uses
    algorithm: HashAlgorithm,

    /// Sync policy handed to the appender
    sync: SyncStrategy,

    /// Entries plus the loaded flag, guarded together
    state: RwLock<TableState>,

    /// Append handle and durability bookkeeping, serialized separately so
    /// disk writes never hold up lookups
    appender: Mutex<AppendState>,
}

#[derive(Debug, Default)]
struct TableState {
    entries: HashMap<u64, String>,
    loaded: bool,
}

#[derive(Debug, Default)]
struct AppendState {
    /// Lazily opened, dropped on unload or after a failed write
    writer: Option<SourceAppender>,

    /// Hashes whose append failed; they are in memory but not on disk, and
    /// a re-add must retry the append instead of skipping it
    pending: HashSet<u64>,
}

impl HashTable {
    /// Create an unloaded table. No file IO happens until first use.
    pub fn new(name: String, path: PathBuf, algorithm: HashAlgorithm, sync: SyncStrategy) -> Self {
        Self {
            name,
            path,
            algorithm,
            sync,
            state: RwLock::new(TableState::default()),
            appender: Mutex::new(AppendState::default()),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn source_path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    /// Entry count of the in-memory map. Zero when unloaded.
    pub fn entry_count(&self) -> usize {
        self.state.read().entries.len()
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Look up the string a hash maps to, loading the table on first use.
    ///
    /// A miss in a loaded table is definitive for this store's contents and
    /// comes back as [`StoreError::NotFound`].
    pub fn lookup(&self, hash: u64) -> Result<String> {
        let state = self.read_loaded()?;
        match state.entries.get(&hash) {
            Some(value) => Ok(value.clone()),
            None => Err(StoreError::NotFound {
                table: self.name.clone(),
                hash,
            }),
        }
    }

    /// Insert a mapping, loading the table on first use.
    ///
    /// Re-adding the exact mapping is a no-op. A different value under the
    /// same hash replaces the old one and logs the collision.
    pub fn insert(&self, hash: u64, value: &str) -> Result<InsertOutcome> {
        let mut state = self.write_loaded()?;
        let outcome = match state.entries.entry(hash) {
            Entry::Occupied(mut slot) => {
                if slot.get() == value {
                    InsertOutcome::AlreadyPresent
                } else {
                    let previous = slot.insert(value.to_string());
                    let hex = format!("{hash:x}");
                    warn!(
                        table = %self.name,
                        hash = %hex,
                        %previous,
                        new = %value,
                        "hash collision, replacing existing mapping"
                    );
                    InsertOutcome::Replaced
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                InsertOutcome::Inserted
            }
        };
        Ok(outcome)
    }

    /// Append a mapping to the source file.
    ///
    /// Called after [`insert`](Self::insert) with the outcome it returned.
    /// An `AlreadyPresent` re-add skips the append unless an earlier attempt
    /// for this hash failed, in which case this is the retry. On failure the
    /// hash is recorded as pending and the in-memory mapping stands; the
    /// caller decides whether to surface or retry.
    pub fn persist(&self, hash: u64, value: &str, outcome: InsertOutcome) -> Result<()> {
        let mut append = self.appender.lock();

        if outcome == InsertOutcome::AlreadyPresent && !append.pending.contains(&hash) {
            return Ok(());
        }

        let mut writer = match append.writer.take() {
            Some(writer) => writer,
            None => match SourceAppender::open(&self.path, self.algorithm.hex_width(), self.sync) {
                Ok(writer) => writer,
                Err(source) => {
                    append.pending.insert(hash);
                    return Err(self.persist_error(hash, outcome, source));
                }
            },
        };

        match writer.append(hash, value) {
            Ok(()) => {
                append.pending.remove(&hash);
                append.writer = Some(writer);
                Ok(())
            }
            Err(source) => {
                // Drop the handle; the next attempt reopens the file.
                append.pending.insert(hash);
                Err(self.persist_error(hash, outcome, source))
            }
        }
    }

    /// Discard the in-memory map and all append state.
    ///
    /// The table reverts to unloaded and repopulates from the source file on
    /// next use. Entries whose append failed are lost with it; that is the
    /// documented cost of unloading with writes outstanding.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let mut append = self.appender.lock();

        let dropped = append.pending.len();
        if dropped > 0 {
            warn!(
                table = %self.name,
                dropped,
                "unloading table with unpersisted entries, they will not survive the reload"
            );
        }

        state.entries = HashMap::new();
        state.loaded = false;
        append.pending.clear();
        // Drop the append handle too, so a reload observes a source file
        // that was replaced underneath us.
        append.writer = None;

        debug!(table = %self.name, "hashtable unloaded");
    }

    /// Load the table if it is not already loaded; returns the entry count.
    pub fn ensure_loaded(&self) -> Result<usize> {
        Ok(self.read_loaded()?.entries.len())
    }

    // ------------------------------------------------------------------------
    // Loaded-state guards
    // ------------------------------------------------------------------------

    /// Shared access to a loaded table. Performs the load under the write
    /// lock when needed, then downgrades so the caller holds a read guard
    /// over the very state it just populated.
    fn read_loaded(&self) -> Result<RwLockReadGuard<'_, TableState>> {
        let state = self.state.read();
        if state.loaded {
            return Ok(state);
        }
        drop(state);

        let mut state = self.state.write();
        if !state.loaded {
            self.load_into(&mut state)?;
        }
        Ok(RwLockWriteGuard::downgrade(state))
    }

    /// Exclusive access to a loaded table
    fn write_loaded(&self) -> Result<RwLockWriteGuard<'_, TableState>> {
        let mut state = self.state.write();
        if !state.loaded {
            self.load_into(&mut state)?;
        }
        Ok(state)
    }

    /// Populate the map from the source file. All-or-nothing: on failure the
    /// state is left untouched and the table stays unloaded.
    fn load_into(&self, state: &mut TableState) -> Result<()> {
        let started = Instant::now();
        let mut reader = SourceReader::open(&self.path).map_err(|e| self.load_error(e))?;

        let mut entries = HashMap::new();
        let mut superseded = 0usize;
        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => {
                    if entries.insert(entry.hash, entry.value).is_some() {
                        superseded += 1;
                    }
                }
                Ok(None) => break,
                Err(e) => return Err(self.load_error(e)),
            }
        }

        if superseded > 0 {
            debug!(
                table = %self.name,
                superseded,
                "later records superseded earlier ones for the same hash"
            );
        }
        info!(
            table = %self.name,
            entries = entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "hashtable loaded"
        );

        state.entries = entries;
        state.loaded = true;
        Ok(())
    }

    fn load_error(&self, source: StoreError) -> StoreError {
        let detail = match &source {
            StoreError::Io(e) => format!("{}: {}", self.path.display(), e),
            other => other.to_string(),
        };
        StoreError::LoadFailed {
            table: self.name.clone(),
            detail,
        }
    }

    fn persist_error(&self, hash: u64, outcome: InsertOutcome, source: std::io::Error) -> StoreError {
        StoreError::PersistFailed {
            table: self.name.clone(),
            hash,
            outcome,
            source,
        }
    }
}

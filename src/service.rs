//! Service Module
//!
//! The reversal service that coordinates all components.
//!
//! ## Responsibilities
//! - Own the table registry and the configuration
//! - Prepare the data directory on startup
//! - Expose the three public operations (get/add/unload) plus eager load
//! - Validate values before they are hashed and stored

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::tables::{InsertOutcome, TableLoad, TableRegistry};

/// The main reversal service
///
/// ## Concurrency Model: Per-Table Locking
///
/// - **Lookups** (get_string): Shared read lock on one table
///   - Many concurrent readers per table, no cross-table coordination
///   - The first access to an unloaded table takes the write lock, loads,
///     then downgrades; waiters block on the lock instead of loading twice
///
/// - **Inserts** (add_hash): Exclusive write lock on one table
///   - Held only for the in-memory insert; the disk append happens under a
///     separate per-table mutex so lookups resume while the file syncs
///
/// - **Unload** (unload_hashes): Exclusive write lock, one table at a time
///   - Never blocks operations on other tables
pub struct ReversalService {
    /// Service configuration
    config: Config,

    /// The fixed set of hashtables (internal per-table locks)
    registry: TableRegistry,
}

/// What an add produced: the computed hash and how the table changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddReceipt {
    pub hash: u64,
    pub outcome: InsertOutcome,
}

/// Per-table entry counts from an eager load
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub tables: Vec<TableLoad>,
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tables.is_empty() {
            return write!(f, "no tables configured");
        }
        for (i, load) in self.tables.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {} entries", load.name, load.entries)?;
        }
        Ok(())
    }
}

impl ReversalService {
    /// Open a service with the given config
    ///
    /// On startup:
    /// 1. Validate the table set (registry construction)
    /// 2. Create the data directory if it does not exist
    /// 3. Optionally create empty source files for tables that lack one,
    ///    so a fresh deployment can accept AddHash before any import
    ///
    /// No table is loaded here; loading happens on first use (or via
    /// [`load_hashes`](Self::load_hashes)).
    pub fn open(config: Config) -> Result<Self> {
        let registry = TableRegistry::new(&config)?;

        fs::create_dir_all(&config.data_dir)?;

        if config.create_missing_sources {
            for table in registry.tables() {
                let path = table.source_path();
                if path.exists() {
                    continue;
                }
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                // append+create never truncates a file that appeared since
                // the exists() check
                fs::OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)?;
                info!(
                    table = %table.name(),
                    path = %path.display(),
                    "created empty source file"
                );
            }
        }

        let names: Vec<&str> = registry.tables().iter().map(|t| t.name()).collect();
        info!(
            data_dir = %config.data_dir.display(),
            tables = ?names,
            "reversal service opened"
        );

        Ok(Self { config, registry })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.data_dir = path.to_path_buf();
        Self::open(config)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Look up the string a hash reverses to
    ///
    /// Errors: [`StoreError::UnknownTable`] for an unconfigured namespace,
    /// [`StoreError::LoadFailed`] when the table cannot be read from disk,
    /// [`StoreError::NotFound`] for a definitive miss.
    pub fn get_string(&self, table: &str, hash: u64) -> Result<String> {
        self.registry.get(table)?.lookup(hash)
    }

    /// Hash a string and store the mapping
    ///
    /// The value is hashed with the table's algorithm (lowercased first) and
    /// inserted, then appended to the source file. An idempotent re-add
    /// returns `AlreadyPresent` without touching disk. When the append fails
    /// the insert stands and [`StoreError::PersistFailed`] reports the
    /// computed hash; re-adding the same value later retries the append.
    pub fn add_hash(&self, table: &str, value: &str) -> Result<AddReceipt> {
        if value.contains(['\n', '\r']) {
            return Err(StoreError::InvalidValue(
                "value must not contain line breaks".to_string(),
            ));
        }

        let table = self.registry.get(table)?;
        let hash = table.algorithm().hash_str(value);
        let outcome = table.insert(hash, value)?;
        table.persist(hash, value, outcome)?;

        let hex = format!("{hash:x}");
        debug!(
            table = %table.name(),
            hash = %hex,
            outcome = ?outcome,
            "hash added"
        );
        Ok(AddReceipt { hash, outcome })
    }

    /// Drop every table's in-memory contents
    ///
    /// Tables revert to unloaded and repopulate from their source files on
    /// next use, picking up records appended externally in the meantime.
    /// Never fails: clearing memory has no error to report.
    pub fn unload_hashes(&self) {
        self.registry.unload_all();
        info!("all hashtables unloaded");
    }

    /// Eagerly load every table, typically at startup to avoid a first-hit
    /// latency spike. Stops at the first table that fails to load.
    pub fn load_hashes(&self) -> Result<LoadSummary> {
        let tables = self.registry.load_all()?;
        let summary = LoadSummary { tables };
        info!(summary = %summary, "eager load complete");
        Ok(summary)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the table registry
    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }
}

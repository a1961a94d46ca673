//! Configuration for hashdex
//!
//! Centralized configuration with sensible defaults.
//!
//! The table set is part of the configuration: namespaces are fixed and known
//! at startup, never created by requests. Besides the builder, a config can
//! be loaded from a JSON file (see [`Config::from_file`]), with absent fields
//! falling back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::hashing::HashAlgorithm;

/// Main configuration for a hashdex instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for hashtable source files. Relative table files are
    /// resolved against this directory.
    pub data_dir: PathBuf,

    /// The hashtable namespaces this store serves. Fixed at startup.
    pub tables: Vec<TableSpec>,

    /// Sync strategy: how often appended records are fsync'd
    pub sync_strategy: SyncStrategy,

    /// Create empty source files at startup for configured tables whose file
    /// does not exist yet, so a fresh deployment can accept AddHash
    pub create_missing_sources: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max queued client connections awaiting a worker
    pub max_connections: usize,

    /// Worker threads handling client connections
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

/// One hashtable namespace: its name, hash algorithm, and backing file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    /// Namespace name as it appears in requests (e.g. "game", "bin")
    pub name: String,

    /// Hash algorithm used for strings in this namespace
    pub algorithm: HashAlgorithm,

    /// Backing source file, absolute or relative to `data_dir`
    pub file: PathBuf,
}

impl TableSpec {
    pub fn new(
        name: impl Into<String>,
        algorithm: HashAlgorithm,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            algorithm,
            file: file.into(),
        }
    }
}

/// Append sync strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    /// fsync after every append (the default: appends are rare and each one
    /// is a human-discovered mapping worth keeping)
    EveryWrite,

    /// fsync after N unsynced appends (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./hashdex_data"),
            tables: vec![
                TableSpec::new("game", HashAlgorithm::Xxh64, "hashes.game.txt"),
                TableSpec::new("bin", HashAlgorithm::Fnv1a32, "hashes.binentries.txt"),
            ],
            sync_strategy: SyncStrategy::EveryWrite,
            create_missing_sources: true,
            listen_addr: "127.0.0.1:50051".to_string(),
            max_connections: 1024,
            worker_threads: 4,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a config from a JSON file
    ///
    /// Missing fields take their default values, so a minimal file only
    /// needs to list what differs from [`Config::default`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| StoreError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the table set (non-empty names, no duplicates)
    pub fn validate(&self) -> Result<()> {
        for (i, spec) in self.tables.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(StoreError::Config(format!("table #{} has an empty name", i)));
            }
            if self.tables[..i].iter().any(|other| other.name == spec.name) {
                return Err(StoreError::Config(format!(
                    "duplicate hashtable type '{}'",
                    spec.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve a table's source file against the data directory
    pub fn source_path(&self, spec: &TableSpec) -> PathBuf {
        if spec.file.is_absolute() {
            spec.file.clone()
        } else {
            self.data_dir.join(&spec.file)
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all source files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Replace the table set
    pub fn tables(mut self, tables: Vec<TableSpec>) -> Self {
        self.config.tables = tables;
        self
    }

    /// Add one table to the set
    pub fn table(mut self, spec: TableSpec) -> Self {
        self.config.tables.push(spec);
        self
    }

    /// Set the append sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set whether missing source files are created at startup
    pub fn create_missing_sources(mut self, create: bool) -> Self {
        self.config.create_missing_sources = create;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

//! Error types for hashdex
//!
//! Provides a unified error type for all operations.
//!
//! The taxonomy mirrors what the RPC boundary reports: client mistakes
//! (`UnknownTable`), definitive misses (`NotFound`), source problems that a
//! later request can retry (`LoadFailed`), and appends that failed after the
//! in-memory insert succeeded (`PersistFailed`). None of these are
//! process-fatal.

use std::path::PathBuf;

use thiserror::Error;

use crate::tables::InsertOutcome;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for hashdex operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    /// The requested hashtable type is not configured. A client error;
    /// namespaces are fixed at startup and never created by requests.
    #[error("unknown hashtable type '{0}'")]
    UnknownTable(String),

    /// A value that cannot be stored, e.g. one containing a line break that
    /// the line-oriented source format has no way to represent
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The hash is absent from a successfully loaded table. A definitive
    /// negative result, not a hint to retry.
    #[error("hash {hash:x} not found in hashtable '{table}'")]
    NotFound { table: String, hash: u64 },

    // -------------------------------------------------------------------------
    // Source Errors
    // -------------------------------------------------------------------------
    /// Loading a table's backing source failed. The table remains unloaded,
    /// so a later request retries the load.
    #[error("failed to load hashtable '{table}': {detail}")]
    LoadFailed { table: String, detail: String },

    /// A malformed record inside a source file. Wrapped into [`LoadFailed`]
    /// before it leaves the owning table.
    ///
    /// [`LoadFailed`]: StoreError::LoadFailed
    #[error("corrupt hashtable source {}:{line}: {detail}", path.display())]
    SourceCorrupt {
        path: PathBuf,
        line: u64,
        detail: String,
    },

    /// Appending a newly learned mapping failed after the in-memory insert
    /// succeeded. The insert is not rolled back; the mapping is usable this
    /// session but not yet durable. Carries the computed hash so the caller
    /// can retry without re-deriving it.
    #[error("failed to persist hash {hash:x} to hashtable '{table}': {source}")]
    PersistFailed {
        table: String,
        hash: u64,
        outcome: InsertOutcome,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

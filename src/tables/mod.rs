//! Tables Module
//!
//! The in-memory hashtables and the registry that owns them.
//!
//! ## Responsibilities
//! - One reversible hash→string dictionary per namespace
//! - Lazy wholesale load from the backing source on first use
//! - Mutation by insert (with collision handling) and by global unload
//! - Durability bookkeeping for appends that have not reached disk
//!
//! ## Concurrency
//! Each table guards its map with a `parking_lot::RwLock`: lookups share the
//! read lock, inserts and clears take the write lock, and the first access
//! that finds the table unloaded performs the load while holding the write
//! lock. That gives exactly one in-flight load per namespace, with waiters
//! blocking on the lock rather than racing to read the file twice. Appends
//! serialize on a separate per-table mutex so they never interleave in the
//! file.

mod registry;
mod table;

pub use registry::{TableLoad, TableRegistry};
pub use table::HashTable;

/// Outcome of inserting a mapping into a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The hash was absent and is now mapped
    Inserted,

    /// The hash already mapped to this exact value (idempotent re-add)
    AlreadyPresent,

    /// The hash mapped to a different value, either a genuine collision or a
    /// stale mapping. The newest value wins; the event is logged.
    Replaced,
}

impl std::fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            InsertOutcome::Inserted => "inserted",
            InsertOutcome::AlreadyPresent => "already present",
            InsertOutcome::Replaced => "replaced",
        };
        write!(f, "{}", text)
    }
}

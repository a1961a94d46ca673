//! # hashdex
//!
//! A concurrent hash-reversal store: it maps 64-bit asset hashes back to
//! the strings that produced them, with:
//! - Fixed namespaces ("hashtables"), each with its own hash algorithm
//! - Lazy wholesale loading from line-oriented source files
//! - Append-only persistence for newly learned mappings
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Reversal Service                             │
//! │          (GetString / AddHash / UnloadHashes)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Table Registry                               │
//! │              (fixed set of namespaces)                       │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!     ┌─────────────┐                ┌─────────────┐
//!     │  HashTable  │                │  HashTable  │
//!     │   "game"    │                │    "bin"    │
//!     │  (RwLock)   │                │  (RwLock)   │
//!     └──────┬──────┘                └──────┬──────┘
//!            │                              │
//!            ▼                              ▼
//!     ┌─────────────┐                ┌─────────────┐
//!     │ Source File │                │ Source File │
//!     │ load+append │                │ load+append │
//!     └─────────────┘                └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod hashing;
pub mod network;
pub mod protocol;
pub mod service;
pub mod source;
pub mod tables;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, SyncStrategy, TableSpec};
pub use error::{Result, StoreError};
pub use hashing::HashAlgorithm;
pub use service::{AddReceipt, LoadSummary, ReversalService};
pub use tables::InsertOutcome;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of hashdex
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

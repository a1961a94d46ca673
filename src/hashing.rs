//! Hash algorithms for hashtable namespaces
//!
//! Each namespace is bound to exactly one 64-bit hash algorithm through its
//! [`TableSpec`](crate::config::TableSpec); the upstream domains that produce
//! these strings use different hashing conventions, so the binding is part of
//! the configuration rather than a store-wide constant.
//!
//! Both algorithms hash the Unicode-lowercased form of the input, since the
//! asset paths these tables index are case-insensitive upstream. Values are
//! stored with their original casing; only the key derivation lowercases.

use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

/// FNV-1a 32-bit offset basis
pub const FNV1A32_OFFSET: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime
pub const FNV1A32_PRIME: u32 = 0x0100_0193;

/// Hash algorithm used by one hashtable namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// XXH64, seed 0: game asset paths (16 hex digits in source files)
    Xxh64,

    /// 32-bit FNV-1a widened to u64: bin entry paths (8 hex digits in
    /// source files)
    Fnv1a32,
}

impl HashAlgorithm {
    /// Hash a string value. Deterministic, total, and safe to call
    /// concurrently; no state, no locks.
    pub fn hash_str(&self, value: &str) -> u64 {
        let lowered = value.to_lowercase();
        match self {
            HashAlgorithm::Xxh64 => xxh64(lowered.as_bytes(), 0),
            HashAlgorithm::Fnv1a32 => u64::from(fnv1a32(lowered.as_bytes())),
        }
    }

    /// Zero-padded width of this algorithm's hashes in persisted source
    /// files, matching the conventions of existing community hashtables.
    pub fn hex_width(&self) -> usize {
        match self {
            HashAlgorithm::Xxh64 => 16,
            HashAlgorithm::Fnv1a32 => 8,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Xxh64 => f.write_str("xxh64"),
            HashAlgorithm::Fnv1a32 => f.write_str("fnv1a32"),
        }
    }
}

/// FNV-1a over 32 bits
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut hash = FNV1A32_OFFSET;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV1A32_PRIME);
    }
    hash
}

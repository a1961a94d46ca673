//! Response definitions
//!
//! Represents responses to clients. The status byte carries the error
//! taxonomy across the wire so clients can react without parsing message
//! text: a NOT_FOUND is definitive, a LOAD_FAILED invites a retry, a
//! PERSIST_FAILED means the mapping is live in memory but not on disk.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, StoreError};
use crate::tables::InsertOutcome;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
    UnknownTable = 0x03,
    LoadFailed = 0x04,
    PersistFailed = 0x05,
}

/// A response to send to client
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload; what it holds depends on the status and the
    /// command it answers (see the module docs in `protocol`)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an UNKNOWN_TABLE response carrying the offending name
    pub fn unknown_table(name: &str) -> Self {
        Self {
            status: Status::UnknownTable,
            payload: Some(name.as_bytes().to_vec()),
        }
    }

    /// Create a LOAD_FAILED response: table_len (4) + table + detail
    ///
    /// The table name travels structured so a client can rebuild the error
    /// even for commands that touch several tables.
    pub fn load_failed(table: &str, detail: &str) -> Self {
        let mut payload = BytesMut::with_capacity(4 + table.len() + detail.len());
        payload.put_u32(table.len() as u32);
        payload.put_slice(table.as_bytes());
        payload.put_slice(detail.as_bytes());
        Self {
            status: Status::LoadFailed,
            payload: Some(payload.to_vec()),
        }
    }

    /// Create an OK response to ADD_HASH: outcome byte + decimal hash
    pub fn add_ok(hash: u64, outcome: InsertOutcome) -> Self {
        Self {
            status: Status::Ok,
            payload: Some(encode_add_receipt(hash, outcome)),
        }
    }

    /// Create a PERSIST_FAILED response. Same payload shape as a successful
    /// add, since the in-memory insert did happen and the client needs the
    /// computed hash either way.
    pub fn persist_failed(hash: u64, outcome: InsertOutcome) -> Self {
        Self {
            status: Status::PersistFailed,
            payload: Some(encode_add_receipt(hash, outcome)),
        }
    }

    /// Map a service error to its wire response
    pub fn from_error(error: &StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => Self::not_found(),
            StoreError::UnknownTable(name) => Self::unknown_table(name),
            StoreError::LoadFailed { table, detail } => Self::load_failed(table, detail),
            StoreError::PersistFailed { hash, outcome, .. } => {
                Self::persist_failed(*hash, *outcome)
            }
            other => Self::error(&other.to_string()),
        }
    }
}

/// Decode a LOAD_FAILED payload back into (table, detail)
pub fn decode_load_failure(payload: &[u8]) -> Result<(String, String)> {
    if payload.len() < 4 {
        return Err(StoreError::Protocol(
            "load failure: missing table length".to_string(),
        ));
    }
    let mut prefix = &payload[..4];
    let table_len = prefix.get_u32() as usize;
    if payload.len() < 4 + table_len {
        return Err(StoreError::Protocol(
            "load failure: incomplete table name".to_string(),
        ));
    }

    let table = std::str::from_utf8(&payload[4..4 + table_len])
        .map_err(|_| StoreError::Protocol("load failure: table is not valid UTF-8".to_string()))?;
    let detail = std::str::from_utf8(&payload[4 + table_len..])
        .map_err(|_| StoreError::Protocol("load failure: detail is not valid UTF-8".to_string()))?;

    Ok((table.to_string(), detail.to_string()))
}

// =============================================================================
// Add receipt payload
// =============================================================================

/// Encode an add receipt: outcome byte followed by the hash in decimal
pub fn encode_add_receipt(hash: u64, outcome: InsertOutcome) -> Vec<u8> {
    let decimal = hash.to_string();
    let mut payload = Vec::with_capacity(1 + decimal.len());
    payload.push(outcome as u8);
    payload.extend_from_slice(decimal.as_bytes());
    payload
}

/// Decode an add receipt payload back into outcome and hash
pub fn decode_add_receipt(payload: &[u8]) -> Result<(u64, InsertOutcome)> {
    let (outcome_byte, decimal) = payload
        .split_first()
        .ok_or_else(|| StoreError::Protocol("add receipt: empty payload".to_string()))?;

    let outcome = match outcome_byte {
        0 => InsertOutcome::Inserted,
        1 => InsertOutcome::AlreadyPresent,
        2 => InsertOutcome::Replaced,
        other => {
            return Err(StoreError::Protocol(format!(
                "add receipt: unknown outcome byte 0x{:02x}",
                other
            )))
        }
    };

    let text = std::str::from_utf8(decimal)
        .map_err(|_| StoreError::Protocol("add receipt: hash is not valid UTF-8".to_string()))?;
    let hash = text
        .parse::<u64>()
        .map_err(|_| StoreError::Protocol(format!("add receipt: bad decimal hash '{}'", text)))?;

    Ok((hash, outcome))
}

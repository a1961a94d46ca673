//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: GET_STRING    - Payload: hash_len (4) + hash (decimal) + table
//! - 0x02: ADD_HASH      - Payload: value_len (4) + value + table
//! - 0x03: UNLOAD_HASHES - Payload: empty
//! - 0x04: LOAD_HASHES   - Payload: empty
//! - 0x05: PING          - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND       (definitive miss; empty payload)
//! - 0x02: ERROR           (payload: message text)
//! - 0x03: UNKNOWN_TABLE   (payload: the unconfigured table name)
//! - 0x04: LOAD_FAILED     (payload: table_len (4) + table + detail)
//! - 0x05: PERSIST_FAILED  (payload: outcome byte + decimal hash)
//!
//! ### OK Payload by Command
//! - GET_STRING:    the reversed string
//! - ADD_HASH:      outcome byte (0 inserted, 1 already present,
//!                  2 replaced) + the computed hash in decimal
//! - UNLOAD_HASHES: empty
//! - LOAD_HASHES:   per-table load summary text
//! - PING:          "PONG"

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{decode_add_receipt, decode_load_failure, encode_add_receipt, Response, Status};

//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GET_STRING:    hash_len (4 bytes) + hash (decimal text) + table name
//! - ADD_HASH:      value_len (4 bytes) + value + table name
//! - UNLOAD_HASHES: empty
//! - LOAD_HASHES:   empty
//! - PING:          empty
//!
//! Hashes travel as decimal text rather than raw u64 so that a payload is
//! printable end to end and a captured frame reads without tooling.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use super::{Command, Response, Status};
use crate::error::{Result, StoreError};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (1 MB). Values are asset paths and error details;
/// anything bigger is a malformed or hostile frame.
pub const MAX_PAYLOAD_SIZE: u32 = 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();
    match command {
        Command::GetString { table, hash } => {
            let decimal = hash.to_string();
            payload.put_u32(decimal.len() as u32);
            payload.put_slice(decimal.as_bytes());
            payload.put_slice(table.as_bytes());
        }
        Command::AddHash { table, value } => {
            payload.put_u32(value.len() as u32);
            payload.put_slice(value.as_bytes());
            payload.put_slice(table.as_bytes());
        }
        Command::UnloadHashes | Command::LoadHashes | Command::Ping => {}
    }

    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(command.command_type() as u8);
    message.put_u32(payload.len() as u32);
    message.put_slice(&payload);

    message.to_vec()
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let payload = frame_payload(bytes, "command")?;
    let cmd_type = bytes[0];

    match cmd_type {
        0x01 => decode_get_string(payload),
        0x02 => decode_add_hash(payload),
        0x03 => empty_command(payload, Command::UnloadHashes, "UNLOAD_HASHES"),
        0x04 => empty_command(payload, Command::LoadHashes, "LOAD_HASHES"),
        0x05 => empty_command(payload, Command::Ping, "PING"),
        _ => Err(StoreError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

/// Decode GET_STRING command payload
fn decode_get_string(payload: &[u8]) -> Result<Command> {
    let (hash_bytes, table_bytes) = split_length_prefixed(payload, "GET_STRING")?;
    let hash = parse_wire_hash(hash_bytes)?;
    let table = utf8_field(table_bytes, "GET_STRING", "table")?;
    Ok(Command::GetString { table, hash })
}

/// Decode ADD_HASH command payload
fn decode_add_hash(payload: &[u8]) -> Result<Command> {
    let (value_bytes, table_bytes) = split_length_prefixed(payload, "ADD_HASH")?;
    let value = utf8_field(value_bytes, "ADD_HASH", "value")?;
    let table = utf8_field(table_bytes, "ADD_HASH", "table")?;
    Ok(Command::AddHash { table, value })
}

fn empty_command(payload: &[u8], command: Command, name: &str) -> Result<Command> {
    if !payload.is_empty() {
        return Err(StoreError::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            name,
            payload.len()
        )));
    }
    Ok(command)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);

    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(response.status as u8);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);

    message.to_vec()
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let payload = frame_payload(bytes, "response")?;

    let status = match bytes[0] {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        0x03 => Status::UnknownTable,
        0x04 => Status::LoadFailed,
        0x05 => Status::PersistFailed,
        other => {
            return Err(StoreError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                other
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Frame and field helpers
// =============================================================================

/// Validate a frame's header and return its payload slice
fn frame_payload<'a>(bytes: &'a [u8], what: &str) -> Result<&'a [u8]> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[1..HEADER_SIZE];
    let payload_len = header.get_u32() as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok(&bytes[HEADER_SIZE..total_len])
}

/// Split a payload at its 4-byte length prefix: (prefixed field, rest)
fn split_length_prefixed<'a>(payload: &'a [u8], what: &str) -> Result<(&'a [u8], &'a [u8])> {
    if payload.len() < 4 {
        return Err(StoreError::Protocol(format!(
            "{} command: missing length prefix",
            what
        )));
    }

    let mut prefix = &payload[..4];
    let field_len = prefix.get_u32() as usize;

    if payload.len() < 4 + field_len {
        return Err(StoreError::Protocol(format!(
            "{} command: incomplete field (expected {}, got {})",
            what,
            field_len,
            payload.len() - 4
        )));
    }

    Ok((&payload[4..4 + field_len], &payload[4 + field_len..]))
}

fn utf8_field(bytes: &[u8], command: &str, field: &str) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| {
            StoreError::Protocol(format!("{} command: {} is not valid UTF-8", command, field))
        })
}

fn parse_wire_hash(bytes: &[u8]) -> Result<u64> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| StoreError::Protocol("hash field is not valid UTF-8".to_string()))?;
    text.parse::<u64>().map_err(|_| {
        StoreError::Protocol(format!("hash field is not a decimal u64: '{}'", text))
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let frame = read_frame(reader)?;
    decode_command(&frame)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read one length-prefixed frame (header + payload) off a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut len_bytes = &header[1..];
    let payload_len = len_bytes.get_u32() as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = vec![0u8; HEADER_SIZE + payload_len];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut frame[HEADER_SIZE..])?;
    }

    Ok(frame)
}

//! TCP Client
//!
//! Blocking client for the wire protocol. Wraps one connection and turns
//! status codes back into [`StoreError`] values, so callers see the same
//! error taxonomy whether they hold a service directly or talk over TCP.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, StoreError};
use crate::protocol::{
    decode_add_receipt, decode_load_failure, read_response, write_command, Command, Response,
    Status,
};
use crate::tables::InsertOutcome;

/// Client for a hashdex server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// What an add produced, as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddResult {
    /// The hash the server computed for the value
    pub hash: u64,

    /// How the table changed
    pub outcome: InsertOutcome,

    /// False when the server answered PERSIST_FAILED: the mapping is live
    /// in memory but did not reach the source file. Re-adding the same
    /// value retries the append.
    pub durable: bool,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| StoreError::Network(format!("connect failed: {}", e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Apply one timeout to both reads and writes
    pub fn set_timeout(&mut self, ms: u64) -> Result<()> {
        if ms > 0 {
            let stream = self.reader.get_ref();
            stream.set_read_timeout(Some(Duration::from_millis(ms)))?;
            stream.set_write_timeout(Some(Duration::from_millis(ms)))?;
        }
        Ok(())
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.round_trip(&Command::Ping)?;
        match response.status {
            Status::Ok => Ok(()),
            _ => Err(unexpected_status("PING", &response)),
        }
    }

    /// Look up the string a hash reverses to
    pub fn get_string(&mut self, table: &str, hash: u64) -> Result<String> {
        let command = Command::GetString {
            table: table.to_string(),
            hash,
        };
        let response = self.round_trip(&command)?;
        match response.status {
            Status::Ok => payload_text(&response),
            Status::NotFound => Err(StoreError::NotFound {
                table: table.to_string(),
                hash,
            }),
            Status::UnknownTable => Err(StoreError::UnknownTable(payload_text(&response)?)),
            Status::LoadFailed => Err(load_failure(&response)?),
            _ => Err(unexpected_status("GET_STRING", &response)),
        }
    }

    /// Hash a value and store the mapping
    pub fn add_hash(&mut self, table: &str, value: &str) -> Result<AddResult> {
        let command = Command::AddHash {
            table: table.to_string(),
            value: value.to_string(),
        };
        let response = self.round_trip(&command)?;
        match response.status {
            Status::Ok | Status::PersistFailed => {
                let payload = response.payload.as_deref().unwrap_or(&[]);
                let (hash, outcome) = decode_add_receipt(payload)?;
                Ok(AddResult {
                    hash,
                    outcome,
                    durable: response.status == Status::Ok,
                })
            }
            Status::UnknownTable => Err(StoreError::UnknownTable(payload_text(&response)?)),
            Status::LoadFailed => Err(load_failure(&response)?),
            _ => Err(unexpected_status("ADD_HASH", &response)),
        }
    }

    /// Drop every table's in-memory contents on the server
    pub fn unload_hashes(&mut self) -> Result<()> {
        let response = self.round_trip(&Command::UnloadHashes)?;
        match response.status {
            Status::Ok => Ok(()),
            _ => Err(unexpected_status("UNLOAD_HASHES", &response)),
        }
    }

    /// Eagerly load every table on the server; returns the summary line
    pub fn load_hashes(&mut self) -> Result<String> {
        let response = self.round_trip(&Command::LoadHashes)?;
        match response.status {
            Status::Ok => payload_text(&response),
            Status::LoadFailed => Err(load_failure(&response)?),
            _ => Err(unexpected_status("LOAD_HASHES", &response)),
        }
    }

    fn round_trip(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }
}

/// Rebuild a LoadFailed error from its structured payload
fn load_failure(response: &Response) -> Result<StoreError> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    let (table, detail) = decode_load_failure(payload)?;
    Ok(StoreError::LoadFailed { table, detail })
}

fn payload_text(response: &Response) -> Result<String> {
    match response.payload.as_deref() {
        Some(bytes) => String::from_utf8(bytes.to_vec())
            .map_err(|_| StoreError::Protocol("response payload is not valid UTF-8".to_string())),
        None => Ok(String::new()),
    }
}

fn unexpected_status(command: &str, response: &Response) -> StoreError {
    let message = response
        .payload
        .as_deref()
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .unwrap_or_default();
    if message.is_empty() {
        StoreError::Network(format!(
            "{}: unexpected status {:?}",
            command, response.status
        ))
    } else {
        StoreError::Network(format!("{}: server reported: {}", command, message))
    }
}

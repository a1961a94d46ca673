//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    GetString = 0x01,
    AddHash = 0x02,
    UnloadHashes = 0x03,
    LoadHashes = 0x04,
    Ping = 0x05,
}

/// A parsed command
#[derive(Debug, Clone)]
pub enum Command {
    /// Look up the string a hash reverses to
    GetString { table: String, hash: u64 },

    /// Hash a value and store the mapping
    AddHash { table: String, value: String },

    /// Drop every table's in-memory contents
    UnloadHashes,

    /// Eagerly load every table
    LoadHashes,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::GetString { .. } => CommandType::GetString,
            Command::AddHash { .. } => CommandType::AddHash,
            Command::UnloadHashes => CommandType::UnloadHashes,
            Command::LoadHashes => CommandType::LoadHashes,
            Command::Ping => CommandType::Ping,
        }
    }
}

//! Source record definitions
//!
//! Parsing and formatting of individual hash/value records.

/// A single parsed record from a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// The 64-bit hash key
    pub hash: u64,

    /// The string that produced the hash, original casing preserved
    pub value: String,
}

impl SourceEntry {
    pub fn new(hash: u64, value: impl Into<String>) -> Self {
        Self {
            hash,
            value: value.into(),
        }
    }

    /// Parse one line (without its terminator) into a record
    ///
    /// The first space splits hash from value; a line with no space is a
    /// hash with an empty value. On failure returns a human-readable detail
    /// for the caller to wrap with file/line context.
    pub fn parse(text: &str) -> Result<Self, String> {
        let (hash_text, value) = match text.split_once(' ') {
            Some((hash_text, value)) => (hash_text, value),
            None => (text, ""),
        };

        let hash = u64::from_str_radix(hash_text, 16)
            .map_err(|e| format!("invalid hash '{}': {}", hash_text, e))?;

        Ok(Self::new(hash, value))
    }
}

/// Format a record as a source-file line, terminator included
///
/// The hash is zero-padded to `hex_width` (the namespace algorithm's natural
/// width) to match the convention of existing files. An empty value writes
/// the hash alone, with no trailing space.
pub fn format_record(hash: u64, value: &str, hex_width: usize) -> String {
    if value.is_empty() {
        format!("{:0width$x}\n", hash, width = hex_width)
    } else {
        format!("{:0width$x} {}\n", hash, value, width = hex_width)
    }
}

//! Source reader
//!
//! Sequential record reads from a source file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

use super::SourceEntry;

/// Reads records from a source file
pub struct SourceReader {
    reader: BufReader<File>,
    path: PathBuf,
    line: String,
    line_no: u64,
    torn_tail: bool,
}

impl SourceReader {
    /// Open a source file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            line: String::new(),
            line_no: 0,
            torn_tail: false,
        })
    }

    /// Read the next record, skipping blank lines
    ///
    /// Returns `Ok(None)` at end of file. A malformed record fails with
    /// [`StoreError::SourceCorrupt`], unless it is an unterminated final
    /// line: that is the signature of an append torn by a crash, and it is
    /// dropped with a warning (the record never happened).
    pub fn next_entry(&mut self) -> Result<Option<SourceEntry>> {
        loop {
            self.line.clear();
            let read = self.reader.read_line(&mut self.line)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let terminated = self.line.ends_with('\n');
            let text = self.line.strip_suffix('\n').unwrap_or(self.line.as_str());
            let text = text.strip_suffix('\r').unwrap_or(text);
            if text.is_empty() {
                continue;
            }

            match SourceEntry::parse(text) {
                Ok(entry) => return Ok(Some(entry)),
                Err(detail) if !terminated => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = self.line_no,
                        %detail,
                        "dropping torn trailing record"
                    );
                    self.torn_tail = true;
                    return Ok(None);
                }
                Err(detail) => {
                    return Err(StoreError::SourceCorrupt {
                        path: self.path.clone(),
                        line: self.line_no,
                        detail,
                    });
                }
            }
        }
    }

    /// Whether a torn trailing record was dropped
    pub fn torn_tail(&self) -> bool {
        self.torn_tail
    }
}

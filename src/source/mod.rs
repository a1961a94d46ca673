//! Source File Module
//!
//! Reads and appends the flat-record files backing each hashtable.
//!
//! ## Responsibilities
//! - Load a namespace's records wholesale (all-or-nothing)
//! - Append newly learned mappings incrementally
//! - Detect corrupt records; recover from torn trailing appends
//!
//! ## File Format
//! One record per line, compatible with existing community hashtable files:
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ 00006fc9 Characters/Aatrox/CAC\n                   │
//! │ a7cf5b14b9b659e0 data/characters/ahri/skin33.bin\n │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! `<hash in lowercase hex, zero-padded to the algorithm's width><space>`
//! `<value = remainder of the line>`. The hash parses base-16 (any case,
//! unpadded accepted); the value may contain spaces and may be empty (a
//! record can be just the hash). Blank lines are skipped. CRLF is tolerated.
//!
//! ## Corruption Handling
//! A record whose hash field does not parse fails the whole load with a
//! line-numbered error, with one exception: the final line of the file when
//! it has no terminating newline. That is the signature of an append torn
//! by a crash, and it is dropped with a warning instead (the append never
//! happened). A torn append whose remains still parse, such as a truncated
//! value with a valid hex prefix, cannot be told apart from a legitimate
//! record in this format; that is the cost of staying interoperable with
//! the existing files.

mod entry;
mod reader;
mod writer;

pub use entry::{format_record, SourceEntry};
pub use reader::SourceReader;
pub use writer::SourceAppender;

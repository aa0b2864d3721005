//! Error types for save container operations.
//!
//! This module provides the [`Error`] enum which represents every failure
//! mode of the read/decode/patch/write pipeline, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Every
//! error is fatal for the operation that produced it: inputs are
//! deterministic byte buffers, so retrying without changing the input
//! cannot succeed.
//!
//! ```rust,no_run
//! use rdasave::{EditOptions, Error, SaveEditor};
//!
//! fn open(path: &str) -> rdasave::Result<SaveEditor> {
//!     match SaveEditor::open_path(path, EditOptions::default()) {
//!         Ok(editor) => Ok(editor),
//!         Err(Error::InvalidFormat(msg)) => {
//!             eprintln!("Not a save container: {}", msg);
//!             Err(Error::InvalidFormat(msg))
//!         }
//!         Err(e @ Error::EntryNotFound { .. }) => {
//!             eprintln!("The save has no game setup: {}", e);
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;

/// The main error type for save container operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Format | [`InvalidFormat`][Self::InvalidFormat], [`CorruptHeader`][Self::CorruptHeader] | Bad magic, truncated or inconsistent structures |
/// | Lookup | [`EntryNotFound`][Self::EntryNotFound] | Named file absent from every directory block |
/// | Integrity | [`CorruptData`][Self::CorruptData] | Payload does not inflate |
/// | Schema | [`Schema`][Self::Schema] | Expected tag/attribute missing, width mismatch |
/// | Resources | [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] | Safety limits |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing a save file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container does not start with the expected magic string.
    ///
    /// Raised before anything else is read, so no mutation can follow.
    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    /// A structure inside the container or the payload is truncated or
    /// points outside the buffer.
    ///
    /// The offset is relative to the buffer being parsed (the container for
    /// directory structures, the decompressed payload for tree records).
    #[error("Corrupt structure at offset {offset:#x}: {reason}")]
    CorruptHeader {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// The named embedded file is not listed in any directory block.
    #[error("Entry not found: {path}")]
    EntryNotFound {
        /// The file name that was searched for.
        path: String,
    },

    /// The embedded payload could not be decompressed.
    #[error("Corrupt payload data: {0}")]
    CorruptData(String),

    /// The decoded tree lacks what a patch needs, or a declared width does
    /// not match what the tree records.
    ///
    /// Never accompanied by partial output.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A resource limit was exceeded.
    ///
    /// Decompression stops once the configured maximum payload size is
    /// reached instead of inflating an unbounded blob.
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// An invalid compression level was provided.
    ///
    /// ```rust
    /// use rdasave::{EditOptions, Error};
    ///
    /// assert!(EditOptions::new().compression_level(9).is_ok());
    /// let result = EditOptions::new().compression_level(15);
    /// assert!(matches!(result, Err(Error::InvalidCompressionLevel { level: 15 })));
    /// ```
    #[error("invalid compression level {level}: must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: u32,
    },
}

impl Error {
    /// Returns `true` if the container or payload is structurally invalid.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::InvalidFormat(_) | Error::CorruptHeader { .. })
    }

    /// Returns `true` if this is a data corruption error.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::CorruptData(_) | Error::CorruptHeader { .. })
    }

    /// Returns `true` if the tree does not have the shape a patch requires.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    /// Returns the offset associated with this error, if any.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::CorruptHeader { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Creates a CorruptHeader error.
    pub fn corrupt_header(offset: impl TryInto<u64>, reason: impl Into<String>) -> Self {
        Error::CorruptHeader {
            offset: offset.try_into().unwrap_or(u64::MAX),
            reason: reason.into(),
        }
    }

    /// Creates a Schema error.
    pub fn schema(reason: impl Into<String>) -> Self {
        Error::Schema(reason.into())
    }
}

/// A specialized Result type for save container operations.
pub type Result<T> = std::result::Result<T, Error>;

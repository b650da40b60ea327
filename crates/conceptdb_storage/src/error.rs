//! Error types for snapshot serialization.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Value codec failure inside a snapshot block.
    #[error("codec error: {0}")]
    Codec(#[from] conceptdb_codec::CodecError),

    /// The rebuilt store violated a core invariant.
    #[error("core error: {0}")]
    Core(#[from] conceptdb_core::CoreError),

    /// The stream was written by an incompatible format version.
    #[error("snapshot version {found} is not supported (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the stream.
        found: i32,
        /// Version this codec supports.
        expected: i32,
    },

    /// The stream's presence marker says no database was written.
    #[error("snapshot stream contains no database")]
    MissingDatabase,

    /// A structural inconsistency in the snapshot stream.
    #[error("corrupt snapshot: {message}")]
    Corrupt {
        /// What was inconsistent.
        message: String,
    },

    /// A unique index references an attribute name no concept carries.
    #[error("unique index references unknown attribute {name:?}")]
    UnknownAttribute {
        /// The unresolvable attribute name.
        name: String,
    },
}

impl StorageError {
    /// Creates a corrupt-snapshot error.
    #[must_use]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

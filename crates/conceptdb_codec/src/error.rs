//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Underlying stream error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The decoder hit a type tag it does not know.
    #[error("unknown type tag: {tag}")]
    UnknownTag {
        /// The unrecognized tag value.
        tag: i32,
    },

    /// A chunk declared a length its bytes do not satisfy.
    #[error("truncated chunk: declared {declared} bytes, got {actual}")]
    TruncatedChunk {
        /// Length the chunk header declared.
        declared: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// A chunk's bytes were not valid UTF-8.
    #[error("invalid UTF-8 in string chunk")]
    InvalidUtf8,

    /// A decoded char code point is not a valid Unicode scalar value.
    #[error("invalid char code point: {0:#x}")]
    InvalidChar(u32),

    /// A declared length was negative or absurdly large.
    #[error("invalid length: {0}")]
    InvalidLength(i64),

    /// The structured-literal text failed to parse or print.
    #[error("structured literal error: {message}")]
    StructuredLiteral {
        /// Description of the failure.
        message: String,
    },
}

impl CodecError {
    /// Creates a structured-literal error.
    pub fn structured_literal(message: impl Into<String>) -> Self {
        Self::StructuredLiteral {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::structured_literal(err.to_string())
    }
}

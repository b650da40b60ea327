//! Error types for ConceptDB core.

use thiserror::Error;

use crate::concept::Id;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Value codec error.
    #[error("codec error: {0}")]
    Codec(#[from] conceptdb_codec::CodecError),

    /// Attempted to overwrite the identity attribute (key 0).
    #[error("identity attribute of concept {id} is immutable")]
    IdentityImmutable {
        /// The concept whose identity slot was targeted.
        id: Id,
    },

    /// An operation addressed an id that was never assigned.
    #[error("no concept with id {id}")]
    NoSuchConcept {
        /// The unassigned id.
        id: Id,
    },

    /// Parallel key/value arrays of different lengths.
    #[error("key/value length mismatch: {keys} keys, {values} values")]
    LengthMismatch {
        /// Number of keys supplied.
        keys: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// Attribute keys were not strictly ascending.
    #[error("attribute keys must be strictly ascending (offending key: {key})")]
    UnsortedKeys {
        /// The first key that broke the ordering.
        key: Id,
    },

    /// A decoded or externally built concept lacks its identity slot.
    #[error("concept {id} does not carry its identity in slot 0")]
    MissingIdentity {
        /// The id whose table slot is malformed.
        id: Id,
    },

    /// The concept table cannot grow any further.
    #[error("concept table exhausted: next id {requested} exceeds the id ceiling")]
    CapacityExhausted {
        /// The id that could not be assigned.
        requested: i64,
    },
}

impl CoreError {
    /// Creates an identity-immutable error.
    #[must_use]
    pub const fn identity_immutable(id: Id) -> Self {
        Self::IdentityImmutable { id }
    }

    /// Creates a no-such-concept error.
    #[must_use]
    pub const fn no_such_concept(id: Id) -> Self {
        Self::NoSuchConcept { id }
    }

    /// Creates a length-mismatch error.
    #[must_use]
    pub const fn length_mismatch(keys: usize, values: usize) -> Self {
        Self::LengthMismatch { keys, values }
    }
}

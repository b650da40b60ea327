//! # ConceptDB Storage
//!
//! Snapshot serialization for ConceptDB stores.
//!
//! This crate provides:
//! - The version-stamped snapshot stream format over any
//!   `io::Read`/`io::Write`
//! - File save/load helpers
//! - The [`ConceptBackend`] contract a larger-than-memory backend
//!   satisfies

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod snapshot;

pub use backend::ConceptBackend;
pub use error::{StorageError, StorageResult};
pub use snapshot::{load_from_path, read_snapshot, save_to_path, write_snapshot};

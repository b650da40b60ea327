//! # ConceptDB Core
//!
//! Concept stores and the aggregation machinery around them.
//!
//! This crate provides:
//! - The [`Concept`] record and the well-known attribute ids
//! - [`DenseDb`], the mutable single-writer array store
//! - [`PersistentDb`], the structurally shared copy-on-write store
//! - [`IndexAggregator`] and unique-index maintenance
//! - Frequency aggregation (facets) with pooled scratch bins
//! - The [`ConceptReader`]/[`ConceptWriter`] contracts an external
//!   backend must satisfy

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod concept;
pub mod config;
pub mod dense;
pub mod error;
pub mod facets;
pub mod names;
pub mod pages;
pub mod persistent;
pub mod pmap;
pub mod pool;
pub mod store;

pub use aggregator::{IndexAggregator, UniqueIndices};
pub use concept::{Concept, Id};
pub use config::Config;
pub use dense::{DenseDb, MAX_CONCEPTS};
pub use error::{CoreError, CoreResult};
pub use facets::KeyFrequency;
pub use names::{InternedNames, NameResolver};
pub use pages::PagedVec;
pub use persistent::PersistentDb;
pub use pmap::PMap;
pub use pool::{BinPool, ScratchBins};
pub use store::{ConceptReader, ConceptWriter};

//! # ConceptDB Sets
//!
//! Pure algebra over sorted, duplicate-free `i32` sequences: the
//! representation shared by attribute key arrays, id sets, and to-many
//! relation values.
//!
//! The [`scalar`] module holds the two-pointer kernels and the bounded
//! binary searches the stores splice with; [`lanes`] restates the
//! intersection gallop in fixed-width lanes with the scalar path as the
//! correctness fallback. Everything here is allocation-local and safe to
//! call from any number of threads as long as nobody mutates the inputs
//! underneath it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod lanes;
pub mod scalar;

pub use scalar::{
    binary_search, binary_search_greater, binary_search_smaller, difference, intersection,
    intersection_and_union_count, intersection_many, sets_equal, sort_dedup, union, union_item,
    union_many,
};

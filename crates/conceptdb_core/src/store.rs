//! Read and write contracts shared by the concept stores.
//!
//! [`ConceptReader`] is the id-keyed lookup surface every store variant
//! exposes, including an out-of-process backend that keeps concepts in an
//! embedded key-value store. [`ConceptWriter`] is the single-writer
//! mutation contract of the dense store; the persistent store offers the
//! same operations as value-returning methods instead.

use conceptdb_codec::Value;

use crate::aggregator::IndexAggregator;
use crate::concept::Id;
use crate::error::CoreResult;

/// Id-keyed read access to a concept table.
pub trait ConceptReader {
    /// The store's identity name.
    fn identity(&self) -> &str;

    /// Number of concepts. Ids are dense, so every id in
    /// `0..concept_count` resolves.
    fn concept_count(&self) -> usize;

    /// The sorted attribute keys of concept `id`.
    fn keys(&self, id: Id) -> Option<&[Id]>;

    /// The values of concept `id`, parallel to [`keys`](Self::keys).
    fn values(&self, id: Id) -> Option<&[Value]>;

    /// Resolves a symbolic name to the id of the concept carrying it,
    /// through the unique index of the name attribute.
    fn name_to_id(&self, name: &str) -> Option<Id>;

    /// The highest assigned id, or `None` for an empty store.
    fn max_id(&self) -> Option<Id> {
        let count = self.concept_count();
        if count == 0 {
            None
        } else {
            Some((count - 1) as Id)
        }
    }

    /// Position of `key` in the sorted key array of concept `id`.
    fn key_index(&self, id: Id, key: Id) -> Option<usize> {
        let keys = self.keys(id)?;
        conceptdb_sets::binary_search(keys, key, 0, keys.len())
    }

    /// The value of attribute `key` on concept `id`. Absence is not an
    /// error.
    fn value(&self, id: Id, key: Id) -> Option<&Value> {
        let at = self.key_index(id, key)?;
        self.values(id).map(|values| &values[at])
    }

    /// Whether concept `id` carries attribute `key`.
    fn contains_key(&self, id: Id, key: Id) -> bool {
        self.key_index(id, key).is_some()
    }

    /// Total number of triples. A to-many relation value counts once per
    /// related id.
    fn triple_count(&self) -> usize {
        let mut total = 0;
        for id in 0..self.concept_count() {
            if let Some(values) = self.values(id as Id) {
                for value in values {
                    match value {
                        Value::Ints(ids) => total += ids.len(),
                        _ => total += 1,
                    }
                }
            }
        }
        total
    }

    /// Total number of attribute keys across all concepts.
    fn key_count(&self) -> usize {
        (0..self.concept_count())
            .filter_map(|id| self.keys(id as Id))
            .map(<[Id]>::len)
            .sum()
    }

    /// Projects `keys` across `ids`: one row per id, one column per key,
    /// `None` where a concept lacks the attribute.
    fn project(&self, keys: &[Id], ids: &[Id]) -> Vec<Vec<Option<Value>>> {
        ids.iter()
            .map(|&id| {
                keys.iter()
                    .map(|&key| self.value(id, key).cloned())
                    .collect()
            })
            .collect()
    }
}

/// Single-writer mutation of a concept table.
///
/// `keys`/`values` never include the identity attribute; the store
/// prepends it. Every operation optionally records its key/id deltas into
/// an [`IndexAggregator`] so derived indices can be refreshed in bulk.
pub trait ConceptWriter: ConceptReader {
    /// Inserts a concept and returns its assigned id, always the previous
    /// max id plus one.
    fn insert(
        &mut self,
        keys: &[Id],
        values: &[Value],
        aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<Id>;

    /// Sets one attribute: replaces the value in place when the key is
    /// present, splices it in at its sorted position otherwise.
    fn update_one(
        &mut self,
        id: Id,
        key: Id,
        value: Value,
        aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<()>;

    /// Merges `keys`/`values` into the concept's existing attributes.
    /// Existing keys not mentioned keep their values.
    fn update(
        &mut self,
        id: Id,
        keys: &[Id],
        values: &[Value],
        aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<()>;

    /// Replaces the concept's attributes wholesale. Keys present before
    /// but absent after are retracted from the unique indices.
    fn replace(
        &mut self,
        id: Id,
        keys: &[Id],
        values: &[Value],
        aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<()>;
}

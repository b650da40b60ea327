//! Bulk-operation index bookkeeping.
//!
//! An [`IndexAggregator`] records which (key, id) pairs a bulk load
//! touched so derived, non-unique indices can be refreshed incrementally
//! instead of by full rescan. The free functions below are the pure
//! unique-index transitions shared by both store variants: each one takes
//! the current attribute-to-index map and returns the updated map.

use std::collections::HashMap;

use conceptdb_codec::Value;

use crate::concept::Id;
use crate::pmap::PMap;

/// Value-to-id index per unique attribute, structurally shared.
pub type UniqueIndices = PMap<Id, PMap<Value, Id>>;

/// Accumulates per-attribute membership deltas during a bulk operation.
#[derive(Debug, Default)]
pub struct IndexAggregator {
    added: HashMap<Id, Vec<Id>>,
    removed: HashMap<Id, Vec<Id>>,
}

impl IndexAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `id` gained attribute `key`.
    pub fn add(&mut self, key: Id, id: Id) {
        self.added.entry(key).or_default().push(id);
    }

    /// Records that `id` lost attribute `key`.
    pub fn remove(&mut self, key: Id, id: Id) {
        self.removed.entry(key).or_default().push(id);
    }

    /// Attribute keys with recorded additions, sorted ascending.
    #[must_use]
    pub fn keys(&self) -> Vec<Id> {
        let mut keys: Vec<Id> = self.added.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Attribute keys with recorded removals, sorted ascending.
    #[must_use]
    pub fn removed_keys(&self) -> Vec<Id> {
        let mut keys: Vec<Id> = self.removed.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// The ids that gained `key`, as a sorted duplicate-free set.
    #[must_use]
    pub fn added_ids(&self, key: Id) -> Vec<Id> {
        self.added
            .get(&key)
            .map(|ids| conceptdb_sets::sort_dedup(ids.clone()))
            .unwrap_or_default()
    }

    /// The ids that lost `key`, as a sorted duplicate-free set.
    #[must_use]
    pub fn removed_ids(&self, key: Id) -> Vec<Id> {
        self.removed
            .get(&key)
            .map(|ids| conceptdb_sets::sort_dedup(ids.clone()))
            .unwrap_or_default()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Points the unique index of `key` at `id` for `value`, dropping any
/// stale mapping for the same value first. Last write wins: a duplicate
/// unique value repoints the entry to the newer id.
#[must_use]
pub fn update_index(indices: &UniqueIndices, id: Id, key: Id, value: &Value) -> UniqueIndices {
    let index = indices.get(&key).cloned().unwrap_or_default();
    indices.assoc(key, index.without(value).assoc(value.clone(), id))
}

/// Retracts the unique-index entry of `key` for `value`.
#[must_use]
pub fn remove_from_index(indices: &UniqueIndices, key: Id, value: &Value) -> UniqueIndices {
    let index = indices.get(&key).cloned().unwrap_or_default();
    indices.assoc(key, index.without(value))
}

/// Applies [`update_index`] for every key flagged unique.
///
/// `unique` is parallel to `keys` and marks the attributes declared
/// unique; non-unique attributes pass through untouched.
#[must_use]
pub fn update_indices(
    indices: &UniqueIndices,
    id: Id,
    keys: &[Id],
    unique: &[bool],
    values: &[Value],
) -> UniqueIndices {
    let mut result = indices.clone();
    for (at, &key) in keys.iter().enumerate() {
        if unique[at] {
            result = update_index(&result, id, key, &values[at]);
        }
    }
    result
}

/// Applies [`remove_from_index`] for every key flagged unique.
#[must_use]
pub fn remove_from_indices(
    indices: &UniqueIndices,
    keys: &[Id],
    unique: &[bool],
    values: &[Value],
) -> UniqueIndices {
    let mut result = indices.clone();
    for (at, &key) in keys.iter().enumerate() {
        if unique[at] {
            result = remove_from_index(&result, key, &values[at]);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_sorted_deduped_deltas() {
        let mut agg = IndexAggregator::new();
        agg.add(5, 3);
        agg.add(5, 1);
        agg.add(5, 3);
        agg.add(2, 9);
        agg.remove(7, 4);
        assert_eq!(agg.keys(), vec![2, 5]);
        assert_eq!(agg.removed_keys(), vec![7]);
        assert_eq!(agg.added_ids(5), vec![1, 3]);
        assert_eq!(agg.added_ids(99), Vec::<Id>::new());
        assert_eq!(agg.removed_ids(7), vec![4]);
        assert!(!agg.is_empty());
    }

    #[test]
    fn update_index_points_at_latest_id() {
        let value = Value::Name("widget".into());
        let indices = UniqueIndices::new();
        let indices = update_index(&indices, 10, 1, &value);
        assert_eq!(indices.get(&1).and_then(|ix| ix.get(&value)), Some(&10));
        // A second concept with the same unique value repoints the entry.
        let indices = update_index(&indices, 11, 1, &value);
        assert_eq!(indices.get(&1).and_then(|ix| ix.get(&value)), Some(&11));
        assert_eq!(indices.get(&1).map(PMap::len), Some(1));
    }

    #[test]
    fn update_indices_respects_unique_flags() {
        let keys = [1, 2];
        let values = [Value::Name("a".into()), Value::Int(7)];
        let indices = update_indices(&UniqueIndices::new(), 3, &keys, &[true, false], &values);
        assert!(indices.get(&1).is_some());
        assert!(indices.get(&2).is_none());
    }

    #[test]
    fn remove_from_indices_retracts() {
        let value = Value::Name("a".into());
        let indices = update_index(&UniqueIndices::new(), 3, 1, &value);
        let indices = remove_from_indices(&indices, &[1], &[true], &[value.clone()]);
        assert_eq!(indices.get(&1).and_then(|ix| ix.get(&value)), None);
    }
}

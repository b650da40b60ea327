//! Frequency aggregation over id sets.
//!
//! Facet queries answer "which attributes (or relation targets) occur
//! most often across these concepts". Counting uses a dense bin per
//! assigned id, borrowed from the store's scratch pool, so a scan is one
//! pass over the ids plus one pass over the bins. Skip filtering marks
//! excluded keys with a `-1` sentinel before the frequency sort and
//! compacts them off the tail afterwards.

use conceptdb_codec::Value;

use crate::concept::{Id, TO_MANY_RELATION_TAG, TO_ONE_RELATION_TAG};
use crate::dense::DenseDb;
use crate::store::ConceptReader;

/// An attribute key and how often it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFrequency {
    /// The counted key (or relation target id).
    pub key: Id,
    /// Number of occurrences across the scanned ids.
    pub frequency: i32,
}

/// Collects non-zero bins, applies the skip list, sorts descending by
/// frequency and drops the filtered tail. `skip` must be sorted.
fn collect_sorted(bins: &[i32], skip: &[Id]) -> Vec<KeyFrequency> {
    let mut pairs: Vec<KeyFrequency> = bins
        .iter()
        .enumerate()
        .filter(|&(_, &frequency)| frequency > 0)
        .map(|(key, &frequency)| KeyFrequency {
            key: key as Id,
            frequency,
        })
        .collect();

    // Pairs are key-ordered here, so one merge scan marks the skips.
    let mut filtered = 0;
    let mut at = 0;
    for pair in &mut pairs {
        while at < skip.len() && skip[at] < pair.key {
            at += 1;
        }
        if at < skip.len() && skip[at] == pair.key {
            at += 1;
            pair.frequency = -1;
            filtered += 1;
        }
    }

    pairs.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    pairs.truncate(pairs.len() - filtered);
    pairs
}

impl DenseDb {
    /// Counts every attribute key across `ids`, most frequent first.
    /// Ties are left in key order. Keys outside the assigned id space
    /// have no attribute concept and are not counted.
    #[must_use]
    pub fn keys_by_frequency(&self, ids: &[Id]) -> Vec<KeyFrequency> {
        self.keys_by_frequency_skipping(ids, &[])
    }

    /// Like [`keys_by_frequency`](Self::keys_by_frequency), excluding the
    /// sorted `skip` keys from the result.
    #[must_use]
    pub fn keys_by_frequency_skipping(&self, ids: &[Id], skip: &[Id]) -> Vec<KeyFrequency> {
        let mut bins = self.pool.borrow(self.concepts.len());
        for &id in ids {
            if let Some(keys) = self.keys(id) {
                for &key in keys {
                    if let Some(bin) = bins.get_mut(key as usize) {
                        *bin += 1;
                    }
                }
            }
        }
        collect_sorted(&bins, skip)
    }

    /// Counts the concepts reachable through `relation_key` across `ids`,
    /// most frequent first. For a to-many relation every element of the
    /// id-array value counts; for a to-one relation the single target
    /// counts. A key that is not a relation yields an empty result, and
    /// targets outside the assigned id space are not counted.
    #[must_use]
    pub fn relations_by_frequency(&self, ids: &[Id], relation_key: Id) -> Vec<KeyFrequency> {
        self.relations_by_frequency_skipping(ids, relation_key, &[])
    }

    /// Like [`relations_by_frequency`](Self::relations_by_frequency),
    /// excluding the sorted `skip` target ids from the result.
    #[must_use]
    pub fn relations_by_frequency_skipping(
        &self,
        ids: &[Id],
        relation_key: Id,
        skip: &[Id],
    ) -> Vec<KeyFrequency> {
        let to_many = self
            .value(relation_key, TO_MANY_RELATION_TAG)
            .is_some_and(Value::is_true);
        let to_one = self
            .value(relation_key, TO_ONE_RELATION_TAG)
            .is_some_and(Value::is_true);

        let mut bins = self.pool.borrow(self.concepts.len());
        if to_many {
            for &id in ids {
                if let Some(targets) = self.value(id, relation_key).and_then(|v| v.as_ids()) {
                    for &target in targets {
                        if let Some(bin) = bins.get_mut(target as usize) {
                            *bin += 1;
                        }
                    }
                }
            }
        } else if to_one {
            for &id in ids {
                if let Some(target) = self.value(id, relation_key).and_then(|v| v.as_int()) {
                    if let Some(bin) = bins.get_mut(target as usize) {
                        *bin += 1;
                    }
                }
            }
        }
        collect_sorted(&bins, skip)
    }
}

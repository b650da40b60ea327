//! The mutable, array-backed concept store.
//!
//! Concepts live in a growable `Vec` indexed directly by id, which makes
//! every lookup an array load plus a binary search over the concept's key
//! array. Mutation is strictly single-writer: all write operations take
//! `&mut self`, and a writer must not race concurrent readers. For
//! lock-free concurrent reading use [`PersistentDb`](crate::PersistentDb)
//! and publish snapshots by reference swap.

use std::collections::HashMap;

use conceptdb_codec::Value;
use tracing::info;

use crate::aggregator::IndexAggregator;
use crate::concept::{
    validate_attributes, Concept, Id, ID, NAME, PROPERTY_TAG, TAG_TAG, UNIQUE_TAG,
};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::names::NameResolver;
use crate::pool::BinPool;
use crate::store::{ConceptReader, ConceptWriter};

/// Hard ceiling on the number of concepts; ids are `i32`.
pub const MAX_CONCEPTS: usize = i32::MAX as usize;

/// The dense mutable concept store.
pub struct DenseDb {
    pub(crate) identity: String,
    pub(crate) concepts: Vec<Concept>,
    pub(crate) unique: HashMap<Id, HashMap<Value, Id>>,
    pub(crate) pool: BinPool,
    config: Config,
}

impl std::fmt::Debug for DenseDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseDb")
            .field("identity", &self.identity)
            .field("concepts", &self.concepts.len())
            .field("unique_attributes", &self.unique.len())
            .finish_non_exhaustive()
    }
}

impl DenseDb {
    /// Creates an empty store.
    #[must_use]
    pub fn new(identity: impl Into<String>, config: Config) -> Self {
        Self {
            identity: identity.into(),
            concepts: Vec::with_capacity(config.initial_capacity.min(MAX_CONCEPTS)),
            unique: HashMap::new(),
            pool: BinPool::new(&config),
            config,
        }
    }

    /// Creates a store seeded with the built-in attribute concepts,
    /// ids 0 through 9.
    #[must_use]
    pub fn bootstrap(identity: impl Into<String>, config: Config) -> Self {
        let mut db = Self::new(identity, config);
        db.seed_builtins();
        db
    }

    /// Rebuilds a store from decoded parts, validating the identity
    /// invariant of every concept.
    pub fn from_parts(
        identity: String,
        concepts: Vec<Concept>,
        unique: HashMap<Id, HashMap<Value, Id>>,
        config: Config,
    ) -> CoreResult<Self> {
        for (at, concept) in concepts.iter().enumerate() {
            let id = at as Id;
            if concept.keys.len() != concept.values.len() {
                return Err(CoreError::length_mismatch(
                    concept.keys.len(),
                    concept.values.len(),
                ));
            }
            if concept.keys.first() != Some(&ID) || concept.values[0] != Value::Int(id) {
                return Err(CoreError::MissingIdentity { id });
            }
            validate_attributes(&concept.keys[1..], &concept.values[1..])?;
        }
        Ok(Self {
            identity,
            concepts,
            unique,
            pool: BinPool::new(&config),
            config,
        })
    }

    /// The unique value-to-id index of attribute `key`, if `key` is
    /// flagged unique and has indexed entries.
    #[must_use]
    pub fn unique_index(&self, key: Id) -> Option<&HashMap<Value, Id>> {
        self.unique.get(&key)
    }

    /// Attribute ids with a unique index, sorted ascending.
    #[must_use]
    pub fn unique_attribute_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.unique.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Resolves the id bound to `value` in the unique index of `key`.
    #[must_use]
    pub fn lookup_unique(&self, key: Id, value: &Value) -> Option<Id> {
        self.unique.get(&key)?.get(value).copied()
    }

    /// The store's configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn is_unique(&self, key: Id) -> bool {
        self.value(key, UNIQUE_TAG).is_some_and(Value::is_true)
    }

    fn unique_flags(&self, keys: &[Id]) -> Vec<bool> {
        keys.iter().map(|&key| self.is_unique(key)).collect()
    }

    fn point_unique(&mut self, key: Id, value: &Value, id: Id) {
        self.unique.entry(key).or_default().insert(value.clone(), id);
    }

    fn retract_unique(&mut self, key: Id, value: &Value) {
        if let Some(index) = self.unique.get_mut(&key) {
            index.remove(value);
        }
    }

    fn slot(&self, id: Id) -> CoreResult<usize> {
        usize::try_from(id)
            .ok()
            .filter(|&at| at < self.concepts.len())
            .ok_or(CoreError::NoSuchConcept { id })
    }

    /// Grow by half the current capacity, capped at the id ceiling.
    fn ensure_capacity(&mut self) {
        let len = self.concepts.len();
        if len < self.concepts.capacity() {
            return;
        }
        let old = self.concepts.capacity().max(1);
        let grown = (old + (old >> 1)).clamp(old + 1, MAX_CONCEPTS);
        self.concepts.reserve_exact(grown - len);
    }

    /// Rebuilds every unique index by scanning the concept table. For a
    /// duplicated unique value the highest id wins, matching the
    /// last-write-wins policy of the incremental path.
    pub(crate) fn rebuild_unique_indices(&mut self) {
        let mut entries: Vec<(Id, Value, Id)> = Vec::new();
        for concept in &self.concepts {
            let id = concept.id();
            for (at, &key) in concept.keys.iter().enumerate() {
                if key != ID && self.is_unique(key) {
                    entries.push((key, concept.values[at].clone(), id));
                }
            }
        }
        self.unique.clear();
        for (key, value, id) in entries {
            self.unique.entry(key).or_default().insert(value, id);
        }
    }

    fn seed_builtins(&mut self) {
        let property = |id: Id, name: &str| Concept {
            keys: vec![ID, NAME, PROPERTY_TAG],
            values: vec![
                Value::Int(id),
                Value::Name(name.to_owned()),
                Value::Bool(true),
            ],
        };
        let tag = |id: Id, name: &str| Concept {
            keys: vec![ID, NAME, TAG_TAG],
            values: vec![
                Value::Int(id),
                Value::Name(name.to_owned()),
                Value::Bool(true),
            ],
        };

        self.concepts.push(property(0, "id"));
        // The name attribute is itself unique.
        self.concepts.push(Concept {
            keys: vec![ID, NAME, PROPERTY_TAG, UNIQUE_TAG],
            values: vec![
                Value::Int(1),
                Value::Name("name".to_owned()),
                Value::Bool(true),
                Value::Bool(true),
            ],
        });
        self.concepts.push(property(2, "type"));
        self.concepts.push(tag(3, "property"));
        self.concepts.push(tag(4, "tag"));
        self.concepts.push(tag(5, "unique"));
        self.concepts.push(tag(6, "dont-index"));
        self.concepts.push(tag(7, "relation"));
        self.concepts.push(tag(8, "to-many-relation"));
        self.concepts.push(tag(9, "to-one-relation"));

        self.rebuild_unique_indices();
        info!(
            identity = %self.identity,
            count = self.concepts.len(),
            "seeded built-in attribute concepts"
        );
    }
}

impl ConceptReader for DenseDb {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    fn keys(&self, id: Id) -> Option<&[Id]> {
        let at = usize::try_from(id).ok()?;
        self.concepts.get(at).map(|c| c.keys.as_slice())
    }

    fn values(&self, id: Id) -> Option<&[Value]> {
        let at = usize::try_from(id).ok()?;
        self.concepts.get(at).map(|c| c.values.as_slice())
    }

    fn name_to_id(&self, name: &str) -> Option<Id> {
        self.lookup_unique(NAME, &Value::Name(name.to_owned()))
    }
}

impl NameResolver for DenseDb {
    fn resolve_name(&self, name: &str) -> Option<Id> {
        self.name_to_id(name)
    }

    fn resolve_id(&self, id: Id) -> Option<&str> {
        self.value(id, NAME).and_then(Value::as_name)
    }
}

impl ConceptWriter for DenseDb {
    fn insert(
        &mut self,
        keys: &[Id],
        values: &[Value],
        aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<Id> {
        validate_attributes(keys, values)?;
        let next = self.concepts.len();
        if next >= MAX_CONCEPTS {
            return Err(CoreError::CapacityExhausted {
                requested: next as i64,
            });
        }
        let id = next as Id;

        let mut ks = Vec::with_capacity(keys.len() + 1);
        ks.push(ID);
        ks.extend_from_slice(keys);
        let mut vs = Vec::with_capacity(values.len() + 1);
        vs.push(Value::Int(id));
        vs.extend(values.iter().cloned());

        if let Some(agg) = aggregator {
            for &key in &ks {
                agg.add(key, id);
            }
        }
        let flags = self.unique_flags(keys);
        for (at, &key) in keys.iter().enumerate() {
            if flags[at] {
                self.point_unique(key, &values[at], id);
            }
        }

        self.ensure_capacity();
        self.concepts.push(Concept {
            keys: ks,
            values: vs,
        });
        Ok(id)
    }

    fn update_one(
        &mut self,
        id: Id,
        key: Id,
        value: Value,
        aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<()> {
        if key == ID {
            return Err(CoreError::identity_immutable(id));
        }
        let slot = self.slot(id)?;
        let unique = self.is_unique(key);
        let concept = &self.concepts[slot];
        match conceptdb_sets::binary_search(&concept.keys, key, 0, concept.keys.len()) {
            Some(at) => {
                if unique {
                    self.point_unique(key, &value, id);
                }
                self.concepts[slot].values[at] = value;
            }
            None => {
                let at = conceptdb_sets::binary_search_greater(&concept.keys, key);
                if unique {
                    self.point_unique(key, &value, id);
                }
                let concept = &mut self.concepts[slot];
                concept.keys.insert(at, key);
                concept.values.insert(at, value);
                if let Some(agg) = aggregator {
                    agg.add(key, id);
                }
            }
        }
        Ok(())
    }

    fn update(
        &mut self,
        id: Id,
        keys: &[Id],
        values: &[Value],
        mut aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<()> {
        if keys.first() == Some(&ID) {
            return Err(CoreError::identity_immutable(id));
        }
        validate_attributes(keys, values)?;
        let slot = self.slot(id)?;
        let flags = self.unique_flags(keys);
        for (at, &key) in keys.iter().enumerate() {
            if flags[at] {
                self.point_unique(key, &values[at], id);
            }
        }

        let prev = &self.concepts[slot];
        let merged = conceptdb_sets::union(&prev.keys, keys);
        let mut vs = Vec::with_capacity(merged.len());
        for &key in &merged {
            match conceptdb_sets::binary_search(keys, key, 0, keys.len()) {
                Some(at) => {
                    vs.push(values[at].clone());
                    if let Some(agg) = aggregator.as_deref_mut() {
                        agg.add(key, id);
                    }
                }
                None => {
                    let at = conceptdb_sets::binary_search(&prev.keys, key, 0, prev.keys.len())
                        .expect("merged key originates from one of the inputs");
                    vs.push(prev.values[at].clone());
                }
            }
        }
        self.concepts[slot] = Concept {
            keys: merged,
            values: vs,
        };
        Ok(())
    }

    fn replace(
        &mut self,
        id: Id,
        keys: &[Id],
        values: &[Value],
        mut aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<()> {
        if keys.first() == Some(&ID) {
            return Err(CoreError::identity_immutable(id));
        }
        validate_attributes(keys, values)?;
        let slot = self.slot(id)?;

        let mut ks = Vec::with_capacity(keys.len() + 1);
        ks.push(ID);
        ks.extend_from_slice(keys);
        let mut vs = Vec::with_capacity(values.len() + 1);
        vs.push(Value::Int(id));
        vs.extend(values.iter().cloned());

        let prev = self.concepts[slot].clone();
        let removed = conceptdb_sets::difference(&prev.keys, &[ks.as_slice()]);
        let added = conceptdb_sets::difference(&ks, &[prev.keys.as_slice()]);
        if let Some(agg) = aggregator.as_deref_mut() {
            for &key in &removed {
                agg.remove(key, id);
            }
            for &key in &added {
                agg.add(key, id);
            }
        }

        let removed_flags = self.unique_flags(&removed);
        for (at, &key) in removed.iter().enumerate() {
            if removed_flags[at] {
                if let Some(old) = prev.value(key) {
                    self.retract_unique(key, old);
                }
            }
        }
        let flags = self.unique_flags(keys);
        for (at, &key) in keys.iter().enumerate() {
            if flags[at] {
                self.point_unique(key, &values[at], id);
            }
        }

        self.concepts[slot] = Concept {
            keys: ks,
            values: vs,
        };
        Ok(())
    }
}

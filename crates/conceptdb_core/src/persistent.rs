//! The persistent, structurally shared concept store.
//!
//! Every mutation returns a new [`PersistentDb`] value; the concept table
//! and the unique indices share all untouched substructure with the
//! previous version. Readers holding an older value keep a complete,
//! unchanging view, so new versions can be published with a single atomic
//! reference swap and readers never block.

use std::sync::Arc;

use conceptdb_codec::Value;

use crate::aggregator::{
    remove_from_indices, update_indices, IndexAggregator, UniqueIndices,
};
use crate::concept::{validate_attributes, Concept, Id, ID, NAME, UNIQUE_TAG};
use crate::config::Config;
use crate::dense::{DenseDb, MAX_CONCEPTS};
use crate::error::{CoreError, CoreResult};
use crate::names::NameResolver;
use crate::pages::PagedVec;
use crate::pmap::PMap;
use crate::store::ConceptReader;

/// The immutable copy-on-write concept store.
#[derive(Debug, Clone)]
pub struct PersistentDb {
    identity: Arc<str>,
    concepts: PagedVec<Arc<Concept>>,
    unique: UniqueIndices,
}

impl PersistentDb {
    /// Creates an empty store.
    #[must_use]
    pub fn new(identity: &str) -> Self {
        Self {
            identity: Arc::from(identity),
            concepts: PagedVec::new(),
            unique: UniqueIndices::new(),
        }
    }

    /// Creates a store seeded with the built-in attribute concepts.
    #[must_use]
    pub fn bootstrap(identity: &str) -> Self {
        Self::from_dense(&DenseDb::bootstrap(identity, Config::new()))
    }

    /// Copies a dense store into persistent form, indices included.
    #[must_use]
    pub fn from_dense(db: &DenseDb) -> Self {
        let mut concepts = PagedVec::new();
        for id in 0..db.concept_count() {
            if let (Some(keys), Some(values)) = (db.keys(id as Id), db.values(id as Id)) {
                concepts = concepts.push(Arc::new(Concept {
                    keys: keys.to_vec(),
                    values: values.to_vec(),
                }));
            }
        }
        let mut unique = UniqueIndices::new();
        for key in db.unique_attribute_ids() {
            let mut index = PMap::new();
            if let Some(entries) = db.unique_index(key) {
                for (value, &id) in entries {
                    index = index.assoc(value.clone(), id);
                }
            }
            unique = unique.assoc(key, index);
        }
        Self {
            identity: Arc::from(db.identity()),
            concepts,
            unique,
        }
    }

    /// Materializes this version into a dense store for bulk read access.
    #[must_use]
    pub fn compact(&self, config: Config) -> DenseDb {
        let mut dense = DenseDb::new(self.identity.as_ref(), config);
        for concept in self.concepts.iter() {
            dense.concepts.push(concept.as_ref().clone());
        }
        for (&key, index) in self.unique.iter() {
            let entries = dense.unique.entry(key).or_default();
            for (value, &id) in index.iter() {
                entries.insert(value.clone(), id);
            }
        }
        dense
    }

    /// Resolves the id bound to `value` in the unique index of `key`.
    #[must_use]
    pub fn lookup_unique(&self, key: Id, value: &Value) -> Option<Id> {
        self.unique.get(&key)?.get(value).copied()
    }

    fn is_unique(&self, key: Id) -> bool {
        self.value(key, UNIQUE_TAG).is_some_and(Value::is_true)
    }

    fn unique_flags(&self, keys: &[Id]) -> Vec<bool> {
        keys.iter().map(|&key| self.is_unique(key)).collect()
    }

    fn slot(&self, id: Id) -> CoreResult<usize> {
        usize::try_from(id)
            .ok()
            .filter(|&at| at < self.concepts.len())
            .ok_or(CoreError::NoSuchConcept { id })
    }

    fn with_concept(&self, slot: usize, concept: Concept, unique: UniqueIndices) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            concepts: self.concepts.set(slot, Arc::new(concept)),
            unique,
        }
    }

    /// Inserts a concept, returning the successor store and the assigned
    /// id, always the previous max id plus one.
    pub fn insert(
        &self,
        keys: &[Id],
        values: &[Value],
        aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<(Self, Id)> {
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
        let unique = update_indices(&self.unique, id, keys, &flags, values);

        let store = Self {
            identity: Arc::clone(&self.identity),
            concepts: self.concepts.push(Arc::new(Concept {
                keys: ks,
                values: vs,
            })),
            unique,
        };
        Ok((store, id))
    }

    /// Sets one attribute, returning the successor store.
    pub fn update_one(
        &self,
        id: Id,
        key: Id,
        value: Value,
        aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<Self> {
        if key == ID {
            return Err(CoreError::identity_immutable(id));
        }
        let slot = self.slot(id)?;
        let prev = self.concepts.get(slot).ok_or(CoreError::NoSuchConcept { id })?;
        let flags = self.unique_flags(&[key]);
        let unique = update_indices(
            &self.unique,
            id,
            &[key],
            &flags,
            std::slice::from_ref(&value),
        );

        let mut concept = prev.as_ref().clone();
        match conceptdb_sets::binary_search(&concept.keys, key, 0, concept.keys.len()) {
            Some(at) => {
                concept.values[at] = value;
            }
            None => {
                let at = conceptdb_sets::binary_search_greater(&concept.keys, key);
                concept.keys.insert(at, key);
                concept.values.insert(at, value);
                if let Some(agg) = aggregator {
                    agg.add(key, id);
                }
            }
        }
        Ok(self.with_concept(slot, concept, unique))
    }

    /// Merges `keys`/`values` into the concept, returning the successor
    /// store. Existing keys not mentioned keep their values.
    pub fn update(
        &self,
        id: Id,
        keys: &[Id],
        values: &[Value],
        mut aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<Self> {
        if keys.first() == Some(&ID) {
            return Err(CoreError::identity_immutable(id));
        }
        validate_attributes(keys, values)?;
        let slot = self.slot(id)?;
        let prev = self.concepts.get(slot).ok_or(CoreError::NoSuchConcept { id })?;

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

        let flags = self.unique_flags(keys);
        let unique = update_indices(&self.unique, id, keys, &flags, values);
        Ok(self.with_concept(
            slot,
            Concept {
                keys: merged,
                values: vs,
            },
            unique,
        ))
    }

    /// Replaces the concept's attributes wholesale, returning the
    /// successor store. Unique-index entries of dropped keys are
    /// retracted before the new entries are applied.
    pub fn replace(
        &self,
        id: Id,
        keys: &[Id],
        values: &[Value],
        mut aggregator: Option<&mut IndexAggregator>,
    ) -> CoreResult<Self> {
        if keys.first() == Some(&ID) {
            return Err(CoreError::identity_immutable(id));
        }
        validate_attributes(keys, values)?;
        let slot = self.slot(id)?;
        let prev = self.concepts.get(slot).ok_or(CoreError::NoSuchConcept { id })?;

        let mut ks = Vec::with_capacity(keys.len() + 1);
        ks.push(ID);
        ks.extend_from_slice(keys);
        let mut vs = Vec::with_capacity(values.len() + 1);
        vs.push(Value::Int(id));
        vs.extend(values.iter().cloned());

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

        // Retract dropped keys with their old values, then index the new
        // pairs.
        let removed_values: Vec<Value> = removed
            .iter()
            .map(|&key| prev.value(key).cloned().unwrap_or(Value::Null))
            .collect();
        let removed_flags = self.unique_flags(&removed);
        let unique = remove_from_indices(&self.unique, &removed, &removed_flags, &removed_values);
        let flags = self.unique_flags(keys);
        let unique = update_indices(&unique, id, keys, &flags, values);

        Ok(self.with_concept(
            slot,
            Concept {
                keys: ks,
                values: vs,
            },
            unique,
        ))
    }
}

impl ConceptReader for PersistentDb {
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

impl NameResolver for PersistentDb {
    fn resolve_name(&self, name: &str) -> Option<Id> {
        self.name_to_id(name)
    }

    fn resolve_id(&self, id: Id) -> Option<&str> {
        self.value(id, NAME).and_then(Value::as_name)
    }
}

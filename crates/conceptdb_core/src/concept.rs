//! The concept record and the well-known attribute ids.
//!
//! A concept is a pair of parallel arrays: strictly ascending attribute
//! ids in `keys` and the matching values in `values`. Slot 0 is the
//! identity attribute; `keys[0]` is always [`ID`] and `values[0]` is the
//! concept's own id. Attributes are concepts themselves, so schema lives
//! in the same table as data.

use conceptdb_codec::Value;

/// Concept identifier. Ids are assigned densely starting at 0.
pub type Id = i32;

/// Identity attribute. Every concept carries it at slot 0.
pub const ID: Id = 0;
/// Human-readable name attribute.
pub const NAME: Id = 1;
/// Type attribute.
pub const TYPE: Id = 2;
/// Marks a concept as a property definition.
pub const PROPERTY_TAG: Id = 3;
/// Marks a concept as a tag.
pub const TAG_TAG: Id = 4;
/// Property tag: values of this property are unique across concepts.
pub const UNIQUE_TAG: Id = 5;
/// Property tag: keep this property out of the value index.
pub const DONT_INDEX_TAG: Id = 6;
/// Property tag: values of this property reference other concepts.
pub const RELATION_TAG: Id = 7;
/// Relation tag: the property holds an id set.
pub const TO_MANY_RELATION_TAG: Id = 8;
/// Relation tag: the property holds a single id.
pub const TO_ONE_RELATION_TAG: Id = 9;

/// Number of ids reserved for the built-in attributes seeded at bootstrap.
pub const RESERVED_IDS: Id = 10;

/// A single concept: sorted attribute ids with their values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    /// Attribute ids, strictly ascending, `keys[0] == ID`.
    pub keys: Vec<Id>,
    /// Values parallel to `keys`, `values[0]` is the concept id.
    pub values: Vec<Value>,
}

impl Concept {
    /// Creates a concept holding only its identity attribute.
    #[must_use]
    pub fn with_identity(id: Id) -> Self {
        Self {
            keys: vec![ID],
            values: vec![Value::Int(id)],
        }
    }

    /// The concept's id, read from the identity slot.
    ///
    /// # Panics
    ///
    /// Panics if the identity slot does not hold an `Int`. Stores never
    /// construct such a concept.
    #[must_use]
    pub fn id(&self) -> Id {
        match self.values[0] {
            Value::Int(id) => id,
            _ => unreachable!("identity slot always holds Value::Int"),
        }
    }

    /// Number of attributes, the identity included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// A concept is never truly empty; it at least carries its identity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of `key` in the sorted key array, if present.
    #[must_use]
    pub fn key_index(&self, key: Id) -> Option<usize> {
        conceptdb_sets::binary_search(&self.keys, key, 0, self.keys.len())
    }

    /// Value stored under `key`, if the concept carries that attribute.
    #[must_use]
    pub fn value(&self, key: Id) -> Option<&Value> {
        self.key_index(key).map(|at| &self.values[at])
    }

    /// Whether the concept carries `key`.
    #[must_use]
    pub fn contains_key(&self, key: Id) -> bool {
        self.key_index(key).is_some()
    }
}

/// Checks that `keys` and `values` are parallel and that the keys are
/// strictly ascending non-identity attributes.
pub(crate) fn validate_attributes(keys: &[Id], values: &[Value]) -> crate::error::CoreResult<()> {
    if keys.len() != values.len() {
        return Err(crate::error::CoreError::length_mismatch(
            keys.len(),
            values.len(),
        ));
    }
    let mut prev = ID;
    for &key in keys {
        if key <= prev {
            return Err(crate::error::CoreError::UnsortedKeys { key });
        }
        prev = key;
    }
    Ok(())
}

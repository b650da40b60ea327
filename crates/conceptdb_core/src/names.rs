//! Symbolic-name resolution.
//!
//! Stores resolve names through their unique name index; callers that
//! need name resolution without a store (snapshot decoding, test
//! fixtures) can inject an [`InternedNames`] table instead.

use std::collections::HashMap;

use crate::concept::Id;

/// Two-way mapping between symbolic names and concept ids.
pub trait NameResolver {
    /// The id carrying `name`, if any concept does.
    fn resolve_name(&self, name: &str) -> Option<Id>;

    /// The name of concept `id`, if it carries one.
    fn resolve_id(&self, id: Id) -> Option<&str>;
}

/// A standalone name table with sequential id assignment.
#[derive(Debug, Default, Clone)]
pub struct InternedNames {
    by_name: HashMap<String, Id>,
    by_id: Vec<String>,
}

impl InternedNames {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id bound to `name`, interning it if new.
    pub fn intern(&mut self, name: &str) -> Id {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.by_id.len() as Id;
        self.by_name.insert(name.to_owned(), id);
        self.by_id.push(name.to_owned());
        id
    }

    /// Number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl NameResolver for InternedNames {
    fn resolve_name(&self, name: &str) -> Option<Id> {
        self.by_name.get(name).copied()
    }

    fn resolve_id(&self, id: Id) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|at| self.by_id.get(at))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut names = InternedNames::new();
        let a = names.intern("alpha");
        let b = names.intern("beta");
        assert_ne!(a, b);
        assert_eq!(names.intern("alpha"), a);
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn resolves_both_ways() {
        let mut names = InternedNames::new();
        let id = names.intern("gamma");
        assert_eq!(names.resolve_name("gamma"), Some(id));
        assert_eq!(names.resolve_id(id), Some("gamma"));
        assert_eq!(names.resolve_name("delta"), None);
        assert_eq!(names.resolve_id(-1), None);
    }
}

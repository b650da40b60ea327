//! Persistent hash map.
//!
//! A hash array mapped trie with 32-way branching and structural sharing
//! through [`Arc`]. Updates return a new map that shares every untouched
//! subtree with its parent, so keeping old snapshots alive costs one node
//! per level on the updated path. This backs the persistent store's unique
//! indices, where a snapshot must stay readable while its successors
//! accumulate changes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const BITS: u32 = 5;
const MASK: u64 = (1 << BITS) - 1;

fn hash_of<K: Hash>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
enum Node<K, V> {
    Branch {
        bitmap: u32,
        children: Vec<Arc<Node<K, V>>>,
    },
    Leaf {
        hash: u64,
        key: K,
        value: V,
    },
    Collision {
        hash: u64,
        entries: Vec<(K, V)>,
    },
}

/// A persistent hash map with copy-path updates.
///
/// [`assoc`](PMap::assoc) and [`without`](PMap::without) leave `self`
/// untouched and return the updated map. Cloning is an `Arc` bump.
#[derive(Debug)]
pub struct PMap<K, V> {
    root: Option<Arc<Node<K, V>>>,
    len: usize,
}

impl<K, V> Clone for PMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<K, V> Default for PMap<K, V> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<K, V> PMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Looks up the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut node = self.root.as_deref()?;
        let hash = hash_of(key);
        let mut shift = 0;
        loop {
            match node {
                Node::Leaf {
                    hash: leaf_hash,
                    key: leaf_key,
                    value,
                } => {
                    return (*leaf_hash == hash && leaf_key == key).then_some(value);
                }
                Node::Collision {
                    hash: node_hash,
                    entries,
                } => {
                    if *node_hash != hash {
                        return None;
                    }
                    return entries.iter().find(|(k, _)| k == key).map(|(_, v)| v);
                }
                Node::Branch { bitmap, children } => {
                    let bit = 1u32 << ((hash >> shift) & MASK);
                    if bitmap & bit == 0 {
                        return None;
                    }
                    let pos = (bitmap & (bit - 1)).count_ones() as usize;
                    node = &children[pos];
                    shift += BITS;
                }
            }
        }
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a map with `key` bound to `value`, replacing any previous
    /// binding.
    #[must_use]
    pub fn assoc(&self, key: K, value: V) -> Self {
        let hash = hash_of(&key);
        match &self.root {
            None => Self {
                root: Some(Arc::new(Node::Leaf { hash, key, value })),
                len: 1,
            },
            Some(root) => {
                let (root, added) = insert(root, 0, hash, key, value);
                Self {
                    root: Some(root),
                    len: self.len + usize::from(added),
                }
            }
        }
    }

    /// Returns a map without any binding for `key`.
    #[must_use]
    pub fn without(&self, key: &K) -> Self {
        let Some(root) = &self.root else {
            return self.clone();
        };
        match remove(root, 0, hash_of(key), key) {
            Removal::Absent => self.clone(),
            Removal::Gone => Self {
                root: None,
                len: self.len - 1,
            },
            Removal::Replaced(root) => Self {
                root: Some(root),
                len: self.len - 1,
            },
        }
    }

    /// Iterates over all entries in unspecified order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            stack: self.root.as_deref().into_iter().collect(),
            pending: None,
        }
    }
}

fn insert<K, V>(
    node: &Arc<Node<K, V>>,
    shift: u32,
    hash: u64,
    key: K,
    value: V,
) -> (Arc<Node<K, V>>, bool)
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    match node.as_ref() {
        Node::Leaf {
            hash: leaf_hash,
            key: leaf_key,
            value: leaf_value,
        } => {
            if *leaf_hash == hash && leaf_key == &key {
                return (Arc::new(Node::Leaf { hash, key, value }), false);
            }
            if *leaf_hash == hash {
                return (
                    Arc::new(Node::Collision {
                        hash,
                        entries: vec![(leaf_key.clone(), leaf_value.clone()), (key, value)],
                    }),
                    true,
                );
            }
            let new_leaf = Arc::new(Node::Leaf { hash, key, value });
            (split(node.clone(), *leaf_hash, new_leaf, hash, shift), true)
        }
        Node::Collision {
            hash: node_hash,
            entries,
        } => {
            if *node_hash == hash {
                let mut entries = entries.clone();
                if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                    return (Arc::new(Node::Collision { hash, entries }), false);
                }
                entries.push((key, value));
                return (Arc::new(Node::Collision { hash, entries }), true);
            }
            let new_leaf = Arc::new(Node::Leaf { hash, key, value });
            (split(node.clone(), *node_hash, new_leaf, hash, shift), true)
        }
        Node::Branch { bitmap, children } => {
            let bit = 1u32 << ((hash >> shift) & MASK);
            let pos = (bitmap & (bit - 1)).count_ones() as usize;
            let mut children = children.clone();
            if bitmap & bit != 0 {
                let (child, added) = insert(&children[pos], shift + BITS, hash, key, value);
                children[pos] = child;
                (
                    Arc::new(Node::Branch {
                        bitmap: *bitmap,
                        children,
                    }),
                    added,
                )
            } else {
                children.insert(pos, Arc::new(Node::Leaf { hash, key, value }));
                (
                    Arc::new(Node::Branch {
                        bitmap: bitmap | bit,
                        children,
                    }),
                    true,
                )
            }
        }
    }
}

/// Builds the branch chain that separates two nodes with different hashes.
fn split<K, V>(
    a: Arc<Node<K, V>>,
    a_hash: u64,
    b: Arc<Node<K, V>>,
    b_hash: u64,
    shift: u32,
) -> Arc<Node<K, V>> {
    let a_idx = (a_hash >> shift) & MASK;
    let b_idx = (b_hash >> shift) & MASK;
    if a_idx == b_idx {
        let child = split(a, a_hash, b, b_hash, shift + BITS);
        return Arc::new(Node::Branch {
            bitmap: 1u32 << a_idx,
            children: vec![child],
        });
    }
    let bitmap = (1u32 << a_idx) | (1u32 << b_idx);
    let children = if a_idx < b_idx { vec![a, b] } else { vec![b, a] };
    Arc::new(Node::Branch { bitmap, children })
}

enum Removal<K, V> {
    Absent,
    Gone,
    Replaced(Arc<Node<K, V>>),
}

fn remove<K, V>(node: &Arc<Node<K, V>>, shift: u32, hash: u64, key: &K) -> Removal<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    match node.as_ref() {
        Node::Leaf {
            hash: leaf_hash,
            key: leaf_key,
            ..
        } => {
            if *leaf_hash == hash && leaf_key == key {
                Removal::Gone
            } else {
                Removal::Absent
            }
        }
        Node::Collision {
            hash: node_hash,
            entries,
        } => {
            if *node_hash != hash || !entries.iter().any(|(k, _)| k == key) {
                return Removal::Absent;
            }
            let remaining: Vec<(K, V)> =
                entries.iter().filter(|(k, _)| k != key).cloned().collect();
            match remaining.len() {
                0 => Removal::Gone,
                1 => {
                    let (k, v) = remaining.into_iter().next().unwrap_or_else(|| unreachable!());
                    Removal::Replaced(Arc::new(Node::Leaf {
                        hash,
                        key: k,
                        value: v,
                    }))
                }
                _ => Removal::Replaced(Arc::new(Node::Collision {
                    hash,
                    entries: remaining,
                })),
            }
        }
        Node::Branch { bitmap, children } => {
            let bit = 1u32 << ((hash >> shift) & MASK);
            if bitmap & bit == 0 {
                return Removal::Absent;
            }
            let pos = (bitmap & (bit - 1)).count_ones() as usize;
            match remove(&children[pos], shift + BITS, hash, key) {
                Removal::Absent => Removal::Absent,
                Removal::Gone => {
                    let mut children = children.clone();
                    children.remove(pos);
                    if children.is_empty() {
                        Removal::Gone
                    } else {
                        Removal::Replaced(Arc::new(Node::Branch {
                            bitmap: bitmap & !bit,
                            children,
                        }))
                    }
                }
                Removal::Replaced(child) => {
                    let mut children = children.clone();
                    children[pos] = child;
                    Removal::Replaced(Arc::new(Node::Branch {
                        bitmap: *bitmap,
                        children,
                    }))
                }
            }
        }
    }
}

/// Iterator over map entries.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    pending: Option<std::slice::Iter<'a, (K, V)>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entries) = &mut self.pending {
                if let Some((k, v)) = entries.next() {
                    return Some((k, v));
                }
                self.pending = None;
            }
            match self.stack.pop()? {
                Node::Leaf { key, value, .. } => return Some((key, value)),
                Node::Collision { entries, .. } => self.pending = Some(entries.iter()),
                Node::Branch { children, .. } => {
                    self.stack.extend(children.iter().map(Arc::as_ref));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn empty_map() {
        let m: PMap<i32, i32> = PMap::new();
        assert!(m.is_empty());
        assert_eq!(m.get(&1), None);
        assert_eq!(m.iter().count(), 0);
    }

    #[test]
    fn assoc_get_without() {
        let m = PMap::new().assoc("a", 1).assoc("b", 2).assoc("c", 3);
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(&"b"), Some(&2));
        let m2 = m.without(&"b");
        assert_eq!(m2.len(), 2);
        assert_eq!(m2.get(&"b"), None);
        // The original is untouched.
        assert_eq!(m.get(&"b"), Some(&2));
    }

    #[test]
    fn assoc_replaces_without_growing() {
        let m = PMap::new().assoc(7, "old").assoc(7, "new");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(&7), Some(&"new"));
    }

    #[test]
    fn without_missing_key_is_identity() {
        let m = PMap::new().assoc(1, 1);
        let m2 = m.without(&2);
        assert_eq!(m2.len(), 1);
        assert_eq!(m2.get(&1), Some(&1));
    }

    #[test]
    fn snapshots_diverge_independently() {
        let base = PMap::new().assoc(1, "one");
        let left = base.assoc(2, "two");
        let right = base.assoc(3, "three");
        assert_eq!(base.len(), 1);
        assert_eq!(left.get(&2), Some(&"two"));
        assert_eq!(left.get(&3), None);
        assert_eq!(right.get(&3), Some(&"three"));
        assert_eq!(right.get(&2), None);
    }

    #[test]
    fn many_entries_survive_deep_branching() {
        let mut m = PMap::new();
        for n in 0..10_000 {
            m = m.assoc(n, n * 2);
        }
        assert_eq!(m.len(), 10_000);
        for n in (0..10_000).step_by(97) {
            assert_eq!(m.get(&n), Some(&(n * 2)));
        }
        for n in 0..5_000 {
            m = m.without(&n);
        }
        assert_eq!(m.len(), 5_000);
        assert_eq!(m.get(&100), None);
        assert_eq!(m.get(&7_500), Some(&15_000));
    }

    #[test]
    fn iter_visits_every_entry_once() {
        let mut m = PMap::new();
        for n in 0..500 {
            m = m.assoc(n, ());
        }
        let mut seen: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..500).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn behaves_like_hashmap(ops in proptest::collection::vec((0u8..2, 0i32..64, 0i32..1000), 0..200)) {
            let mut model: HashMap<i32, i32> = HashMap::new();
            let mut m = PMap::new();
            for (op, key, value) in ops {
                if op == 0 {
                    model.insert(key, value);
                    m = m.assoc(key, value);
                } else {
                    model.remove(&key);
                    m = m.without(&key);
                }
                prop_assert_eq!(m.len(), model.len());
            }
            for (k, v) in &model {
                prop_assert_eq!(m.get(k), Some(v));
            }
        }
    }
}

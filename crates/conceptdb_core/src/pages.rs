//! Persistent paged vector.
//!
//! A dense sequence stored as fixed-size pages behind [`Arc`]. Updates
//! copy only the page they touch plus the page table, so snapshots of
//! large concept tables share almost all of their storage. Lookup is two
//! indexed loads, which keeps id-to-concept access cheap enough for the
//! read path.

use std::sync::Arc;

/// Elements per page. Small enough that a copied page stays cheap, large
/// enough that the page table stays short.
const PAGE: usize = 64;

/// A persistent vector of fixed-size shared pages.
///
/// [`push`](PagedVec::push) and [`set`](PagedVec::set) return the updated
/// vector and leave `self` untouched. Cloning copies the page table only.
#[derive(Debug)]
pub struct PagedVec<T> {
    pages: Vec<Arc<Vec<T>>>,
    len: usize,
}

impl<T> Clone for PagedVec<T> {
    fn clone(&self) -> Self {
        Self {
            pages: self.pages.clone(),
            len: self.len,
        }
    }
}

impl<T> Default for PagedVec<T> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Clone> PagedVec<T> {
    /// Creates an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element at `index`, if in bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.pages[index / PAGE].get(index % PAGE)
    }

    /// Returns a vector with `value` appended.
    #[must_use]
    pub fn push(&self, value: T) -> Self {
        let mut pages = self.pages.clone();
        if self.len % PAGE == 0 {
            let mut page = Vec::with_capacity(PAGE);
            page.push(value);
            pages.push(Arc::new(page));
        } else {
            let last = pages.len() - 1;
            let mut page = pages[last].as_ref().clone();
            page.push(value);
            pages[last] = Arc::new(page);
        }
        Self {
            pages,
            len: self.len + 1,
        }
    }

    /// Returns a vector with the element at `index` replaced.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn set(&self, index: usize, value: T) -> Self {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        let mut pages = self.pages.clone();
        let mut page = pages[index / PAGE].as_ref().clone();
        page[index % PAGE] = value;
        pages[index / PAGE] = Arc::new(page);
        Self {
            pages,
            len: self.len,
        }
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get() {
        let mut v = PagedVec::new();
        for n in 0..200 {
            v = v.push(n);
        }
        assert_eq!(v.len(), 200);
        assert_eq!(v.get(0), Some(&0));
        assert_eq!(v.get(63), Some(&63));
        assert_eq!(v.get(64), Some(&64));
        assert_eq!(v.get(199), Some(&199));
        assert_eq!(v.get(200), None);
    }

    #[test]
    fn set_copies_one_page() {
        let mut v = PagedVec::new();
        for n in 0..130 {
            v = v.push(n);
        }
        let updated = v.set(70, -1);
        assert_eq!(updated.get(70), Some(&-1));
        assert_eq!(v.get(70), Some(&70));
        // Pages outside the touched one are shared.
        assert!(Arc::ptr_eq(&v.pages[0], &updated.pages[0]));
        assert!(!Arc::ptr_eq(&v.pages[1], &updated.pages[1]));
        assert!(Arc::ptr_eq(&v.pages[2], &updated.pages[2]));
    }

    #[test]
    fn push_leaves_old_snapshot_intact() {
        let mut v = PagedVec::new();
        for n in 0..64 {
            v = v.push(n);
        }
        let longer = v.push(64);
        assert_eq!(v.len(), 64);
        assert_eq!(longer.len(), 65);
        assert_eq!(v.get(64), None);
        assert_eq!(longer.get(64), Some(&64));
    }

    #[test]
    fn iter_in_order() {
        let mut v = PagedVec::new();
        for n in 0..300 {
            v = v.push(n);
        }
        let collected: Vec<i32> = v.iter().copied().collect();
        assert_eq!(collected, (0..300).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn set_out_of_bounds_panics() {
        let v: PagedVec<i32> = PagedVec::new();
        let _ = v.set(0, 1);
    }
}

//! Scalar two-pointer kernels over sorted, duplicate-free `i32` sequences.
//!
//! Every input is assumed ascending with no repeats; an empty slice is the
//! empty set. All functions allocate only their own result/scratch buffers
//! and are safe to call concurrently.

/// Merge-style intersection of two sorted sets, O(|a| + |b|).
#[must_use]
pub fn intersection(a: &[i32], b: &[i32]) -> Vec<i32> {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}

/// Intersection of many sets.
///
/// Sets are folded shortest-first so the running result shrinks as fast as
/// possible, and the fold short-circuits to empty the moment any
/// intermediate intersection is empty.
#[must_use]
pub fn intersection_many(sets: &[&[i32]]) -> Vec<i32> {
    if sets.is_empty() {
        return Vec::new();
    }
    let mut order: Vec<&[i32]> = sets.to_vec();
    order.sort_by_key(|s| s.len());
    if order[0].is_empty() {
        return Vec::new();
    }
    let mut result = order[0].to_vec();
    for set in &order[1..] {
        result = intersection(&result, set);
        if result.is_empty() {
            break;
        }
    }
    result
}

/// Merge union of two sorted sets, retaining one copy of equal elements.
#[must_use]
pub fn union(a: &[i32], b: &[i32]) -> Vec<i32> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                result.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                result.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    result
}

/// Union of many sets.
///
/// Concatenates everything into one scratch buffer sized to the sum of
/// lengths, then sorts and deduplicates once. For many small sets this does
/// fewer allocations than repeated pairwise merges.
#[must_use]
pub fn union_many(sets: &[&[i32]]) -> Vec<i32> {
    let total: usize = sets.iter().map(|s| s.len()).sum();
    let mut scratch = Vec::with_capacity(total);
    for set in sets {
        scratch.extend_from_slice(set);
    }
    sort_dedup(scratch)
}

/// Splices a single element into a sorted set.
///
/// Returns a copy of the set if the element is already present, so the
/// duplicate-free invariant holds.
#[must_use]
pub fn union_item(set: &[i32], item: i32) -> Vec<i32> {
    let idx = binary_search_greater(set, item);
    if idx < set.len() && set[idx] == item {
        return set.to_vec();
    }
    let mut result = Vec::with_capacity(set.len() + 1);
    result.extend_from_slice(&set[..idx]);
    result.push(item);
    result.extend_from_slice(&set[idx..]);
    result
}

/// Slot marker used while subtracting; ids are non-negative so the minimum
/// value can never collide with a real element.
const TOMBSTONE: i32 = i32::MIN;

/// Elements of `a` present in none of the `subtract` sets.
///
/// Matched slots are tombstoned in a scratch copy across each subtracted
/// set, then compacted out in one pass.
#[must_use]
pub fn difference(a: &[i32], subtract: &[&[i32]]) -> Vec<i32> {
    let mut scratch = a.to_vec();
    for set in subtract {
        let mut i = 0;
        let mut j = 0;
        while i < scratch.len() && j < set.len() {
            if scratch[i] == TOMBSTONE {
                i += 1;
                continue;
            }
            match scratch[i].cmp(&set[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    scratch[i] = TOMBSTONE;
                    i += 1;
                    j += 1;
                }
            }
        }
    }
    scratch.retain(|&n| n != TOMBSTONE);
    scratch
}

/// Counts `(|a ∩ b|, |a ∪ b|)` in a single merge scan without materializing
/// either set.
#[must_use]
pub fn intersection_and_union_count(a: &[i32], b: &[i32]) -> (usize, usize) {
    let mut common = 0;
    let mut total = 0;
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                total += 1;
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                total += 1;
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                common += 1;
                total += 1;
                i += 1;
                j += 1;
            }
        }
    }
    total += (a.len() - i) + (b.len() - j);
    (common, total)
}

/// Bounded binary search over `set[begin..end]`.
///
/// Returns the index of `key` within the whole slice, or `None` on a miss.
#[must_use]
pub fn binary_search(set: &[i32], key: i32, begin: usize, end: usize) -> Option<usize> {
    let mut lo = begin;
    let mut hi = end;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match set[mid].cmp(&key) {
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid,
            std::cmp::Ordering::Equal => return Some(mid),
        }
    }
    None
}

/// Index of the first element greater than or equal to `key`.
///
/// Returns `set.len()` when every element is smaller; this is the splice
/// point the stores use to insert a new attribute key.
#[must_use]
pub fn binary_search_greater(set: &[i32], key: i32) -> usize {
    let mut lo = 0;
    let mut hi = set.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if set[mid] < key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Index of the last element smaller than or equal to `key`, if any.
#[must_use]
pub fn binary_search_smaller(set: &[i32], key: i32) -> Option<usize> {
    let idx = binary_search_greater(set, key);
    if idx < set.len() && set[idx] == key {
        Some(idx)
    } else if idx == 0 {
        None
    } else {
        Some(idx - 1)
    }
}

/// Sorts a scratch buffer and drops duplicates, producing a valid set.
#[must_use]
pub fn sort_dedup(mut scratch: Vec<i32>) -> Vec<i32> {
    scratch.sort_unstable();
    scratch.dedup();
    scratch
}

/// Sequence equality including the absent/absent case.
#[must_use]
pub fn sets_equal(a: Option<&[i32]>, b: Option<&[i32]>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_basics() {
        assert_eq!(intersection(&[1, 3, 5], &[2, 3, 4, 5]), vec![3, 5]);
        assert_eq!(intersection(&[1, 2], &[]), Vec::<i32>::new());
        assert_eq!(intersection(&[], &[]), Vec::<i32>::new());
    }

    #[test]
    fn intersection_self_is_identity() {
        let a = [1, 4, 9, 16, 25];
        assert_eq!(intersection(&a, &a), a.to_vec());
    }

    #[test]
    fn intersection_many_permutation_invariant() {
        let a: &[i32] = &[1, 2, 3, 4, 5, 6];
        let b: &[i32] = &[2, 4, 6, 8];
        let c: &[i32] = &[2, 3, 4, 6, 7];
        let expected = vec![2, 4, 6];
        assert_eq!(intersection_many(&[a, b, c]), expected);
        assert_eq!(intersection_many(&[c, a, b]), expected);
        assert_eq!(intersection_many(&[b, c, a]), expected);
    }

    #[test]
    fn intersection_many_short_circuits_on_empty() {
        let a: &[i32] = &[1, 2, 3];
        let empty: &[i32] = &[];
        assert_eq!(intersection_many(&[a, empty, a]), Vec::<i32>::new());
        assert_eq!(intersection_many(&[]), Vec::<i32>::new());
    }

    #[test]
    fn union_basics() {
        assert_eq!(union(&[1, 3], &[2, 3, 4]), vec![1, 2, 3, 4]);
        assert_eq!(union(&[1, 2], &[]), vec![1, 2]);
        assert_eq!(union(&[], &[5]), vec![5]);
    }

    #[test]
    fn union_with_empty_is_identity() {
        let a = [3, 7, 11];
        assert_eq!(union(&a, &[]), a.to_vec());
        assert_eq!(union(&[], &a), a.to_vec());
    }

    #[test]
    fn union_many_dedups_across_sets() {
        let a: &[i32] = &[1, 5];
        let b: &[i32] = &[1, 2, 5];
        let c: &[i32] = &[5, 9];
        assert_eq!(union_many(&[a, b, c]), vec![1, 2, 5, 9]);
    }

    #[test]
    fn union_item_splices_and_ignores_present() {
        assert_eq!(union_item(&[1, 3, 5], 4), vec![1, 3, 4, 5]);
        assert_eq!(union_item(&[1, 3, 5], 6), vec![1, 3, 5, 6]);
        assert_eq!(union_item(&[1, 3, 5], 0), vec![0, 1, 3, 5]);
        assert_eq!(union_item(&[1, 3, 5], 3), vec![1, 3, 5]);
        assert_eq!(union_item(&[], 2), vec![2]);
    }

    #[test]
    fn difference_basics() {
        assert_eq!(difference(&[1, 2, 3, 4], &[&[2, 4]]), vec![1, 3]);
        assert_eq!(difference(&[1, 2, 3], &[&[1, 2, 3]]), Vec::<i32>::new());
        assert_eq!(difference(&[1, 2, 3], &[]), vec![1, 2, 3]);
    }

    #[test]
    fn difference_multiple_subtrahends() {
        let result = difference(&[1, 2, 3, 4, 5, 6], &[&[2, 3], &[5], &[9]]);
        assert_eq!(result, vec![1, 4, 6]);
    }

    #[test]
    fn self_difference_is_empty() {
        let a = [10, 20, 30];
        assert_eq!(difference(&a, &[&a]), Vec::<i32>::new());
    }

    #[test]
    fn counts_match_materialized_sets() {
        let a = [1, 2, 3, 5, 8];
        let b = [2, 3, 4, 8, 9];
        let (common, total) = intersection_and_union_count(&a, &b);
        assert_eq!(common, intersection(&a, &b).len());
        assert_eq!(total, union(&a, &b).len());
    }

    #[test]
    fn binary_search_hits_and_misses() {
        let set = [0, 2, 4, 6, 8];
        assert_eq!(binary_search(&set, 4, 0, set.len()), Some(2));
        assert_eq!(binary_search(&set, 5, 0, set.len()), None);
        assert_eq!(binary_search(&set, 4, 3, set.len()), None);
        assert_eq!(binary_search(&[], 1, 0, 0), None);
    }

    #[test]
    fn binary_search_greater_is_splice_point() {
        let set = [1, 3, 5];
        assert_eq!(binary_search_greater(&set, 0), 0);
        assert_eq!(binary_search_greater(&set, 3), 1);
        assert_eq!(binary_search_greater(&set, 4), 2);
        assert_eq!(binary_search_greater(&set, 9), 3);
        assert_eq!(binary_search_greater(&[], 1), 0);
    }

    #[test]
    fn binary_search_smaller_variants() {
        let set = [1, 3, 5];
        assert_eq!(binary_search_smaller(&set, 0), None);
        assert_eq!(binary_search_smaller(&set, 1), Some(0));
        assert_eq!(binary_search_smaller(&set, 4), Some(1));
        assert_eq!(binary_search_smaller(&set, 9), Some(2));
    }

    #[test]
    fn sort_dedup_builds_a_set() {
        assert_eq!(sort_dedup(vec![5, 1, 3, 1, 5, 5]), vec![1, 3, 5]);
        assert_eq!(sort_dedup(vec![]), Vec::<i32>::new());
    }

    #[test]
    fn sets_equal_covers_absent() {
        assert!(sets_equal(None, None));
        assert!(sets_equal(Some(&[1, 2]), Some(&[1, 2])));
        assert!(!sets_equal(Some(&[1]), None));
        assert!(!sets_equal(Some(&[1]), Some(&[2])));
    }
}

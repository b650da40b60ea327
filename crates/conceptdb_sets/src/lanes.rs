//! Lane-accelerated intersection.
//!
//! The scalar kernel in [`crate::scalar`] is the source of truth; this
//! module restates the gallop in fixed-width lanes so the compiler can
//! vectorize the inner compare. For the current scalar from the shorter
//! sequence we compare one lane-width chunk of the longer sequence at a
//! time: if every lane is smaller we skip a full stride, if a lane matches
//! we emit and advance both cursors past the match, otherwise only the
//! scalar cursor moves. The final partial lane always falls back to the
//! plain two-pointer scan.

use crate::scalar;

/// Lane width of the broadcast compare. Eight i32 lanes is one AVX2
/// register; narrower targets still profit from the unrolled compare.
pub const LANES: usize = 8;

/// Intersection of two sorted sets using lane-width strides.
///
/// Produces exactly the same output as [`scalar::intersection`] for every
/// input, including sets shorter than one lane.
#[must_use]
pub fn intersection(a: &[i32], b: &[i32]) -> Vec<i32> {
    // Scan scalars from the shorter side, lanes over the longer side.
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(short.len());
    let mut i = 0;
    let mut j = 0;

    while i < short.len() && j + LANES <= long.len() {
        let scalar_val = short[i];
        let chunk = &long[j..j + LANES];

        let mut eq_at = LANES;
        let mut all_less = true;
        for (lane, &candidate) in chunk.iter().enumerate() {
            if candidate == scalar_val && eq_at == LANES {
                eq_at = lane;
            }
            all_less &= candidate < scalar_val;
        }

        if eq_at < LANES {
            result.push(scalar_val);
            i += 1;
            j += eq_at + 1;
        } else if all_less {
            j += LANES;
        } else {
            i += 1;
        }
    }

    // Partial lane: finish with the two-pointer scan.
    let mut k = i;
    let mut l = j;
    while k < short.len() && l < long.len() {
        match short[k].cmp(&long[l]) {
            std::cmp::Ordering::Less => k += 1,
            std::cmp::Ordering::Greater => l += 1,
            std::cmp::Ordering::Equal => {
                result.push(short[k]);
                k += 1;
                l += 1;
            }
        }
    }
    result
}

/// Lane-accelerated intersection of many sets.
///
/// Same shortest-first fold and empty short-circuit as
/// [`scalar::intersection_many`], with the lane kernel doing the pairwise
/// work.
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

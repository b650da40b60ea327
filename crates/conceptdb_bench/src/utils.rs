//! Fixture generators shared by the benchmarks.

use rand::prelude::*;

/// Generates a sorted duplicate-free set of `len` ids drawn from
/// `0..universe`.
pub fn random_set(rng: &mut StdRng, len: usize, universe: i32) -> Vec<i32> {
    let drawn: Vec<i32> = (0..len).map(|_| rng.gen_range(0..universe)).collect();
    conceptdb_sets::sort_dedup(drawn)
}

/// Generates `count` sorted sets of roughly `len` elements each.
pub fn random_sets(seed: u64, count: usize, len: usize, universe: i32) -> Vec<Vec<i32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| random_set(&mut rng, len, universe))
        .collect()
}

//! End-to-end store behavior across both variants.

use conceptdb_codec::Value;
use conceptdb_core::concept::{ID, NAME, TYPE};
use conceptdb_core::{
    Config, ConceptReader, ConceptWriter, DenseDb, IndexAggregator, PersistentDb,
};

#[test]
fn ids_are_assigned_sequentially_and_never_reused() {
    let mut db = DenseDb::bootstrap("seq", Config::new());
    let before = db.max_id().expect("seeded store has a max id");
    let a = db.insert(&[], &[], None).expect("insert");
    assert_eq!(a, before + 1);

    // A no-op update does not mint an id.
    db.update_one(a, TYPE, Value::Int(1), None).expect("update");
    db.update_one(a, TYPE, Value::Int(1), None).expect("update");
    let b = db.insert(&[], &[], None).expect("insert");
    assert_eq!(b, a + 1);
}

#[test]
fn unique_attribute_resolves_and_repoints() {
    let mut db = DenseDb::bootstrap("uniq", Config::new());
    let first = db
        .insert(&[NAME], &[Value::Name("shared".into())], None)
        .expect("insert");
    assert_eq!(db.name_to_id("shared"), Some(first));

    // Policy: last write wins, the newer concept takes the index entry.
    let second = db
        .insert(&[NAME], &[Value::Name("shared".into())], None)
        .expect("insert");
    assert_eq!(db.name_to_id("shared"), Some(second));
}

#[test]
fn persistent_snapshots_are_isolated() {
    let s1 = PersistentDb::bootstrap("iso");
    let (s1, id) = s1
        .insert(&[NAME, TYPE], &[Value::Name("a".into()), Value::Int(1)], None)
        .expect("insert");

    let keys_before: Vec<i32> = s1.keys(id).expect("concept exists").to_vec();
    let value_before = s1.value(id, TYPE).cloned();
    let count_before = s1.concept_count();

    let (s2, _) = s1
        .insert(&[NAME], &[Value::Name("b".into())], None)
        .expect("insert");
    let s2 = s2
        .update_one(id, TYPE, Value::Int(42), None)
        .expect("update");

    // Every read against s1 is identical to before s2 existed.
    assert_eq!(s1.concept_count(), count_before);
    assert_eq!(s1.keys(id).expect("concept exists").to_vec(), keys_before);
    assert_eq!(s1.value(id, TYPE).cloned(), value_before);
    assert_eq!(s1.name_to_id("b"), None);
    assert_eq!(s2.value(id, TYPE), Some(&Value::Int(42)));
}

#[test]
fn aggregator_collects_bulk_deltas_across_operations() {
    let mut db = DenseDb::bootstrap("agg", Config::new());
    let mut agg = IndexAggregator::new();

    let a = db
        .insert(&[TYPE], &[Value::Int(1)], Some(&mut agg))
        .expect("insert");
    let b = db
        .insert(&[TYPE], &[Value::Int(2)], Some(&mut agg))
        .expect("insert");
    db.replace(b, &[50], &[Value::Bool(true)], Some(&mut agg))
        .expect("replace");

    assert_eq!(agg.added_ids(TYPE), vec![a, b]);
    assert_eq!(agg.added_ids(ID), vec![a, b]);
    assert_eq!(agg.added_ids(50), vec![b]);
    assert_eq!(agg.removed_ids(TYPE), vec![b]);
}

#[test]
fn facets_after_compaction_match_the_dense_path() {
    let s = PersistentDb::bootstrap("facade");
    let mut ids = Vec::new();
    let mut s = s;
    let key_sets: [&[i32]; 3] = [&[5, 6], &[5], &[6, 7]];
    for keys in key_sets {
        let values: Vec<Value> = keys.iter().map(|_| Value::Bool(true)).collect();
        let (next, id) = s.insert(keys, &values, None).expect("insert");
        s = next;
        ids.push(id);
    }

    let dense = s.compact(Config::new());
    let found = dense.keys_by_frequency_skipping(&ids, &[ID]);
    let pairs: Vec<(i32, i32)> = found.iter().map(|p| (p.key, p.frequency)).collect();
    assert_eq!(pairs, vec![(5, 2), (6, 2), (7, 1)]);
}

#[test]
fn projection_is_stable_across_store_variants() {
    let mut dense = DenseDb::bootstrap("proj", Config::new());
    let a = dense
        .insert(&[NAME], &[Value::Name("pa".into())], None)
        .expect("insert");
    let b = dense
        .insert(&[TYPE], &[Value::Int(3)], None)
        .expect("insert");

    let persistent = PersistentDb::from_dense(&dense);
    let keys = [NAME, TYPE];
    let ids = [a, b];
    assert_eq!(dense.project(&keys, &ids), persistent.project(&keys, &ids));
    assert_eq!(dense.triple_count(), persistent.triple_count());
    assert_eq!(dense.key_count(), persistent.key_count());
}

//! Concept store benchmarks: insert throughput, point lookups, facets.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use conceptdb_codec::Value;
use conceptdb_core::concept::NAME;
use conceptdb_core::{Config, ConceptReader, ConceptWriter, DenseDb, Id, PersistentDb};

fn populated(count: usize) -> DenseDb {
    let mut db = DenseDb::bootstrap("bench", Config::new().initial_capacity(count + 16));
    for n in 0..count {
        db.insert(
            &[NAME, 20, 21],
            &[
                Value::Name(format!("concept-{n}")),
                Value::Int(n as i32),
                Value::Ints(vec![1, 2, 3]),
            ],
            None,
        )
        .expect("insert");
    }
    db
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &count in &[1_000usize, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("dense", count), &count, |bench, &count| {
            bench.iter(|| populated(count));
        });
        group.bench_with_input(
            BenchmarkId::new("persistent", count),
            &count,
            |bench, &count| {
                bench.iter(|| {
                    let mut db = PersistentDb::bootstrap("bench");
                    for n in 0..count {
                        let (next, _) = db
                            .insert(&[20], &[Value::Int(n as i32)], None)
                            .expect("insert");
                        db = next;
                    }
                    db
                });
            },
        );
    }
    group.finish();
}

fn bench_value_lookup(c: &mut Criterion) {
    let db = populated(50_000);
    let mut rng = StdRng::seed_from_u64(3);
    let probes: Vec<Id> = (0..1_000)
        .map(|_| rng.gen_range(10..db.concept_count() as Id))
        .collect();

    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(probes.len() as u64));
    group.bench_function("value", |bench| {
        bench.iter(|| {
            for &id in &probes {
                black_box(db.value(id, 20));
            }
        });
    });
    group.bench_function("name_to_id", |bench| {
        bench.iter(|| black_box(db.name_to_id("concept-25000")));
    });
    group.finish();
}

fn bench_facets(c: &mut Criterion) {
    let db = populated(50_000);
    let ids: Vec<Id> = (10..40_010).collect();

    let mut group = c.benchmark_group("facets");
    group.throughput(Throughput::Elements(ids.len() as u64));
    group.bench_function("keys_by_frequency", |bench| {
        bench.iter(|| black_box(db.keys_by_frequency(black_box(&ids))));
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_value_lookup, bench_facets);
criterion_main!(benches);

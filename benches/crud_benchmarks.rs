use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rb_map::RBTreeMap;
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;

// ─── Key sequences ──────────────────────────────────────────────────────────

fn key_orders() -> [(&'static str, Vec<i64>); 3] {
    let ordered: Vec<i64> = (0..N as i64).collect();
    let reverse: Vec<i64> = ordered.iter().rev().copied().collect();
    let mut random = ordered.clone();
    random.shuffle(&mut StdRng::seed_from_u64(12345));
    [("ordered", ordered), ("reverse", reverse), ("random", random)]
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("map_insert_{order}"));

        group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
            b.iter(|| {
                let mut map = RBTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });

        group.finish();
    }
}

fn bench_map_get(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let rb_map: RBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let mut group = c.benchmark_group(format!("map_get_{order}"));

        group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = rb_map.get(black_box(&k)) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = bt_map.get(black_box(&k)) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.finish();
    }
}

fn bench_map_erase(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let rb_map: RBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let mut group = c.benchmark_group(format!("map_erase_{order}"));

        group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
            b.iter_batched(
                || rb_map.clone(),
                |mut map| {
                    for &k in &keys {
                        map.erase(&k);
                    }
                    map
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter_batched(
                || bt_map.clone(),
                |mut map| {
                    for &k in &keys {
                        map.remove(&k);
                    }
                    map
                },
                BatchSize::LargeInput,
            );
        });

        group.finish();
    }
}

fn bench_map_iterate(c: &mut Criterion) {
    let rb_map: RBTreeMap<i64, i64> = (0..N as i64).map(|k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = (0..N as i64).map(|k| (k, k)).collect();
    let mut group = c.benchmark_group("map_iterate");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| rb_map.values().fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("RBTreeMap cursor", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            let mut cursor = rb_map.begin();
            while let Some(&v) = cursor.value() {
                sum = sum.wrapping_add(v);
                cursor.move_next();
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| bt_map.values().fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(map_benches, bench_map_insert, bench_map_get, bench_map_erase, bench_map_iterate);

criterion_main!(map_benches);

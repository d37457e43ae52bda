//! Hit-rate workload benchmarks across policies.
//!
//! Each benchmark drives a lookup-then-insert-on-miss loop over a fixed
//! number of operations, so the measured time reflects a full cache workload
//! rather than a single operation. Run with `cargo bench --bench hit_rate`.

mod common;

use common::workload::{run_hit_rate, run_hit_rate_with, Workload, WorkloadGenerator};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use admitkit::policy::{LfuCache, LruCore, TinyLfuCache};
use admitkit::predictive::{PredictiveCache, PredictiveOptions};
use admitkit::sharded::{ShardedLru, ShardedTinyLfu};

const UNIVERSE: u64 = 10_000;
const CAPACITY: usize = 1_000;
const SHARDS: usize = 8;
const OPS: usize = 50_000;
const SEED: u64 = 123;

fn workloads() -> Vec<(&'static str, Workload)> {
    vec![
        ("uniform", Workload::Uniform),
        ("zipf_1.2", Workload::Zipfian { exponent: 1.2 }),
        ("scan", Workload::Scan),
        (
            "hotset_10_90",
            Workload::Hotset {
                hot_fraction: 0.1,
                hot_prob: 0.9,
            },
        ),
    ]
}

fn bench_single_shard_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_rate/single_shard");
    group.throughput(Throughput::Elements(OPS as u64));

    for (name, workload) in workloads() {
        group.bench_with_input(BenchmarkId::new("lru", name), &workload, |b, &workload| {
            b.iter(|| {
                let mut cache: LruCore<u64, u64> = LruCore::new(CAPACITY);
                let mut generator = WorkloadGenerator::new(UNIVERSE, workload, SEED);
                run_hit_rate(&mut cache, &mut generator, OPS)
            })
        });

        group.bench_with_input(BenchmarkId::new("lfu", name), &workload, |b, &workload| {
            b.iter(|| {
                let mut cache: LfuCache<u64, u64> = LfuCache::new(CAPACITY);
                let mut generator = WorkloadGenerator::new(UNIVERSE, workload, SEED);
                run_hit_rate(&mut cache, &mut generator, OPS)
            })
        });

        group.bench_with_input(
            BenchmarkId::new("tiny_lfu", name),
            &workload,
            |b, &workload| {
                b.iter(|| {
                    let mut cache: TinyLfuCache<u64, u64> = TinyLfuCache::new(CAPACITY, 4096, 4);
                    let mut generator = WorkloadGenerator::new(UNIVERSE, workload, SEED);
                    run_hit_rate(&mut cache, &mut generator, OPS)
                })
            },
        );
    }

    group.finish();
}

fn bench_sharded_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_rate/sharded");
    group.throughput(Throughput::Elements(OPS as u64));

    for (name, workload) in workloads() {
        group.bench_with_input(
            BenchmarkId::new("sharded_lru", name),
            &workload,
            |b, &workload| {
                b.iter(|| {
                    let cache: ShardedLru<u64, u64> = ShardedLru::new(CAPACITY, SHARDS);
                    let mut generator = WorkloadGenerator::new(UNIVERSE, workload, SEED);
                    run_hit_rate_with(
                        &mut generator,
                        OPS,
                        |key| cache.get(&key).is_some(),
                        |key| {
                            let _ = cache.insert_value(key, key);
                        },
                    )
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sharded_tiny_lfu", name),
            &workload,
            |b, &workload| {
                b.iter(|| {
                    let cache: ShardedTinyLfu<u64, u64> =
                        ShardedTinyLfu::new(CAPACITY, SHARDS, 4096, 4);
                    let mut generator = WorkloadGenerator::new(UNIVERSE, workload, SEED);
                    run_hit_rate_with(
                        &mut generator,
                        OPS,
                        |key| cache.get(&key).is_some(),
                        |key| {
                            let _ = cache.insert_value(key, key);
                        },
                    )
                })
            },
        );
    }

    group.finish();
}

fn bench_predictive(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_rate/predictive");
    group.throughput(Throughput::Elements(OPS as u64));

    for (name, workload) in workloads() {
        for (variant, enable_prefetch) in [("prefetch_on", true), ("prefetch_off", false)] {
            let id = BenchmarkId::new(variant, name);
            group.bench_with_input(id, &workload, |b, &workload| {
                b.iter(|| {
                    let opts = PredictiveOptions {
                        shards: SHARDS,
                        prefetch_topk: 2,
                        min_trans_count: 2,
                        min_trans_prob: 0.10,
                        enable_prefetch,
                        ..PredictiveOptions::default()
                    };
                    let cache: PredictiveCache<u64, u64> = PredictiveCache::new(CAPACITY, opts);
                    let mut generator = WorkloadGenerator::new(UNIVERSE, workload, SEED);
                    run_hit_rate_with(
                        &mut generator,
                        OPS,
                        |key| cache.get(&key).is_some(),
                        |key| {
                            let _ = cache.insert(key, key);
                        },
                    )
                })
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_shard_policies,
    bench_sharded_policies,
    bench_predictive
);
criterion_main!(benches);

//! Pipeline benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Stateless chains (map and filter) at several sizes
//! - Stateful stages (sorted, distinct)
//! - Short-circuiting terminals on infinite sources
//! - Compensated double summation
//!
//! Each group runs the same chain sequentially and in parallel.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pipeflow::prelude::*;
use rand::prelude::*;

// ============================================================================
// Data Generation with Reproducible RNG
// ============================================================================

fn random_ints(size: usize, bound: i32, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.gen_range(0..bound)).collect()
}

fn random_doubles(size: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.gen_range(-1e6..1e6)).collect()
}

fn mode(p: Pipeline<i32>, parallel: bool) -> Pipeline<i32> {
    if parallel {
        p.parallel()
    } else {
        p
    }
}

// ============================================================================
// Stateless Benchmarks
// ============================================================================

fn bench_map_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_filter");

    for size in [1_000, 100_000, 1_000_000] {
        let data = random_ints(size, 1_000_000, 42);
        group.throughput(Throughput::Elements(size as u64));

        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, size), &data, |b, data| {
                b.iter(|| {
                    mode(Streams::of(data.clone()), parallel)
                        .map(|x| x.wrapping_mul(31))
                        .filter(|x| x % 7 == 0)
                        .count()
                        .unwrap()
                })
            });
        }
    }

    group.finish();
}

// ============================================================================
// Stateful Benchmarks
// ============================================================================

fn bench_sorted(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted");
    group.sample_size(20);

    let size = 200_000;
    let data = random_ints(size, i32::MAX, 7);
    group.throughput(Throughput::Elements(size as u64));

    for parallel in [false, true] {
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_with_input(BenchmarkId::new(label, size), &data, |b, data| {
            b.iter(|| mode(Streams::of(data.clone()), parallel).sorted().to_vec().unwrap())
        });
    }

    group.finish();
}

fn bench_distinct(c: &mut Criterion) {
    let mut group = c.benchmark_group("distinct");
    group.sample_size(20);

    let size = 200_000;
    let data = random_ints(size, 10_000, 8);
    group.throughput(Throughput::Elements(size as u64));

    for (label, parallel, unordered) in [
        ("sequential", false, false),
        ("parallel_ordered", true, false),
        ("parallel_unordered", true, true),
    ] {
        group.bench_with_input(BenchmarkId::new(label, size), &data, |b, data| {
            b.iter(|| {
                let p = mode(Streams::of(data.clone()), parallel);
                let p = if unordered { p.unordered() } else { p };
                p.distinct().count().unwrap()
            })
        });
    }

    group.finish();
}

// ============================================================================
// Short-circuit Benchmarks
// ============================================================================

fn bench_short_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("short_circuit");

    group.bench_function("iterate_limit", |b| {
        b.iter(|| {
            Streams::iterate(1u64, |x| x.wrapping_mul(3))
                .limit(black_box(10_000))
                .unwrap()
                .count()
                .unwrap()
        })
    });

    group.bench_function("find_first_filtered", |b| {
        b.iter(|| {
            Streams::range(0, i32::MAX)
                .parallel()
                .filter(|x| x > black_box(500_000))
                .find_first()
                .unwrap()
        })
    });

    group.finish();
}

// ============================================================================
// Numeric Benchmarks
// ============================================================================

fn bench_double_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("double_sum");

    let size = 1_000_000;
    let data = random_doubles(size, 9);
    group.throughput(Throughput::Elements(size as u64));

    group.bench_with_input(BenchmarkId::new("sequential", size), &data, |b, data| {
        b.iter(|| Streams::doubles(data.clone()).sum().unwrap())
    });
    group.bench_with_input(BenchmarkId::new("parallel", size), &data, |b, data| {
        b.iter(|| Streams::doubles(data.clone()).parallel().sum().unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_map_filter,
    bench_sorted,
    bench_distinct,
    bench_short_circuit,
    bench_double_sum
);
criterion_main!(benches);

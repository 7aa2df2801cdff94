//! Tests that parallel evaluation agrees with sequential evaluation.
//!
//! Every test builds the same chain twice over seeded random data, runs one
//! copy sequentially and one in parallel, and compares the results. Ordered
//! chains must match element for element; unordered ones must match as
//! multisets.
//!
//! ## Test Organization
//!
//! 1. **Stateless Chains** - map, filter, flat_map
//! 2. **Stateful Chains** - sorted, distinct, limit, skip
//! 3. **Reductions** - reduce, count, collect

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pipeflow::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn random_ints(size: usize, bound: i32, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.gen_range(0..bound)).collect()
}

fn small_pool() -> EngineConfig {
    EngineConfig::new().parallelism(3).leaf_target_factor(2)
}

// ============================================================================
// Stateless Chain Tests
// ============================================================================

/// Test map and filter across a range of input sizes.
#[test]
fn test_map_filter_equivalence() {
    for (seed, size) in [(1, 0), (2, 1), (3, 17), (4, 1_000), (5, 50_000)] {
        let data = random_ints(size, 1_000, seed);
        let chain = |p: Pipeline<i32>| p.map(|x| x * 3 + 1).filter(|x| x % 2 == 0);

        let seq = chain(Streams::of(data.clone())).to_vec().unwrap();
        let par = chain(Streams::of(data)).parallel().to_vec().unwrap();
        assert_eq!(seq, par, "size {size}");
    }
}

/// Test flat_map expanding to variable-length output.
#[test]
fn test_flat_map_equivalence() {
    let data = random_ints(2_000, 5, 11);
    let chain = |p: Pipeline<i32>| p.flat_map(|x| Streams::of(vec![x; x as usize]));

    let seq = chain(Streams::of(data.clone())).to_vec().unwrap();
    let par = chain(Streams::of(data)).parallel().to_vec().unwrap();
    assert_eq!(seq, par);
}

/// Test that a dedicated pool gives the same answer as the global pool.
#[test]
fn test_dedicated_pool_equivalence() {
    let data = random_ints(10_000, 100, 12);
    let seq = Streams::of(data.clone()).map(|x| x - 50).to_vec().unwrap();
    let par = Streams::of(data)
        .with_config(small_pool())
        .unwrap()
        .parallel()
        .map(|x| x - 50)
        .to_vec()
        .unwrap();
    assert_eq!(seq, par);
}

// ============================================================================
// Stateful Chain Tests
// ============================================================================

/// Test sorting random data.
#[test]
fn test_sorted_equivalence() {
    let data = random_ints(20_000, 500, 21);
    let mut expected = data.clone();
    expected.sort_unstable();

    let seq = Streams::of(data.clone()).sorted().to_vec().unwrap();
    let par = Streams::of(data).parallel().sorted().to_vec().unwrap();
    assert_eq!(seq, expected);
    assert_eq!(par, expected);
}

/// Test distinct keeps first occurrences in both modes.
#[test]
fn test_distinct_equivalence() {
    let data = random_ints(20_000, 300, 22);
    let seq = Streams::of(data.clone()).distinct().to_vec().unwrap();
    let par = Streams::of(data).parallel().distinct().to_vec().unwrap();
    assert_eq!(seq.len(), 300);
    assert_eq!(seq, par);
}

/// Test unordered distinct produces the same set of values.
#[test]
fn test_unordered_distinct_equivalence() {
    let data = random_ints(20_000, 300, 23);
    let mut seq = Streams::of(data.clone()).distinct().to_vec().unwrap();
    let mut par = Streams::of(data).parallel().unordered().distinct().to_vec().unwrap();
    seq.sort_unstable();
    par.sort_unstable();
    assert_eq!(seq, par);
}

/// Test limit and skip on ordered data.
#[test]
fn test_slice_equivalence() {
    let data = random_ints(10_000, 1_000, 24);
    for (n, max) in [(0, 10), (5, 0), (100, 2_500), (9_990, 100), (20_000, 5)] {
        let chain = |p: Pipeline<i32>| p.skip(n).unwrap().limit(max).unwrap();
        let seq = chain(Streams::of(data.clone())).to_vec().unwrap();
        let par = chain(Streams::of(data.clone())).parallel().to_vec().unwrap();
        assert_eq!(seq, par, "skip {n} limit {max}");
    }
}

/// Test a chain mixing every stateful stage.
#[test]
fn test_mixed_chain_equivalence() {
    let data = random_ints(30_000, 2_000, 25);
    let chain = |p: Pipeline<i32>| {
        p.filter(|x| x % 3 != 0)
            .distinct()
            .sorted_by(reverse_order())
            .skip(10)
            .unwrap()
            .limit(500)
            .unwrap()
            .map(|x| x / 2)
    };

    let seq = chain(Streams::of(data.clone())).to_vec().unwrap();
    let par = chain(Streams::of(data)).with_config(small_pool()).unwrap().parallel().to_vec().unwrap();
    assert_eq!(seq.len(), 500);
    assert_eq!(seq, par);
}

// ============================================================================
// Reduction Tests
// ============================================================================

/// Test associative reductions.
#[test]
fn test_reduce_equivalence() {
    let data = random_ints(40_000, 1_000, 31);
    let seq = Streams::of(data.clone()).reduce(0, i32::wrapping_add).unwrap();
    let par = Streams::of(data.clone()).parallel().reduce(0, i32::wrapping_add).unwrap();
    assert_eq!(seq, par);

    let seq_max = Streams::of(data.clone()).max().unwrap();
    let par_max = Streams::of(data).parallel().max().unwrap();
    assert_eq!(seq_max, par_max);
}

/// Test counts with and without size-changing stages.
#[test]
fn test_count_equivalence() {
    let data = random_ints(25_000, 10, 32);
    let seq = Streams::of(data.clone()).filter(|x| *x < 4).count().unwrap();
    let par = Streams::of(data.clone()).parallel().filter(|x| *x < 4).count().unwrap();
    assert_eq!(seq, par);
    assert_eq!(seq, data.iter().filter(|x| **x < 4).count() as u64);
}

/// Test ordered string concatenation through a mutable container.
#[test]
fn test_collect_equivalence() {
    let data = random_ints(5_000, 10, 33);
    let chain = |p: Pipeline<i32>| {
        p.collect_with(
            String::new,
            |acc: &mut String, x| acc.push(char::from(b'0' + x as u8)),
            |acc: &mut String, later| acc.push_str(&later),
        )
    };

    let seq = chain(Streams::of(data.clone())).unwrap();
    let par = chain(Streams::of(data).with_config(small_pool()).unwrap().parallel()).unwrap();
    assert_eq!(seq.len(), 5_000);
    assert_eq!(seq, par);
}

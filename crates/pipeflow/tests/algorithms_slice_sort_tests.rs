//! Tests for skip, limit and sorting.
//!
//! ## Test Organization
//!
//! 1. **Slicing** - Sequential, sized parallel, unsized parallel, unordered
//! 2. **Argument Validation** - Negative counts
//! 3. **Sorting** - Natural and comparator sorts, stability, parallel sort

use approx::assert_relative_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pipeflow::prelude::*;

// ============================================================================
// Slicing Tests
// ============================================================================

/// Test skip then limit on a sized source.
#[test]
fn test_skip_and_limit_sequential() {
    let out = Streams::range(0, 100).skip(10).unwrap().limit(5).unwrap().to_vec().unwrap();
    assert_eq!(out, vec![10, 11, 12, 13, 14]);
}

/// Test that limit beyond the input size passes everything.
#[test]
fn test_limit_larger_than_input() {
    let out = Streams::of(vec![1, 2, 3]).limit(10).unwrap().to_vec().unwrap();
    assert_eq!(out, vec![1, 2, 3]);
    assert_eq!(Streams::of(vec![1, 2, 3]).skip(5).unwrap().count().unwrap(), 0);
    assert_eq!(Streams::of(vec![1, 2, 3]).limit(0).unwrap().count().unwrap(), 0);
}

/// Test that a limit stops pulling from an infinite source.
#[test]
fn test_limit_short_circuits_infinite_source() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let out = Streams::iterate(0u64, |x| x + 1)
        .peek(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .limit(3)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(out, vec![0, 1, 2]);
    assert_eq!(pulled.load(Ordering::Relaxed), 3);
}

/// Test that find_first pulls exactly one element sequentially.
#[test]
fn test_find_first_pulls_one_element() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let first = Streams::iterate(1u64, |x| x * 3)
        .peek(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .find_first()
        .unwrap();
    assert_eq!(first, Some(1));
    assert_eq!(pulled.load(Ordering::Relaxed), 1);
}

/// Test parallel slicing of a sized ordered source.
#[test]
fn test_parallel_slice_sized_ordered() {
    let out = Streams::range(0, 50_000)
        .parallel()
        .skip(1_000)
        .unwrap()
        .limit(2_000)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(out, (1_000..3_000).collect::<Vec<_>>());
}

/// Test parallel slicing of an unsized ordered source.
#[test]
fn test_parallel_slice_unsized_ordered() {
    let out = Streams::range(0, 10_000)
        .filter(|x| x % 2 == 0)
        .parallel()
        .skip(10)
        .unwrap()
        .limit(5)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(out, vec![20, 22, 24, 26, 28]);
}

/// Test parallel limit over an infinite ordered source terminates.
#[test]
fn test_parallel_limit_on_iterate() {
    let out = Streams::iterate(0u64, |x| x + 1)
        .parallel()
        .limit(100)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(out, (0..100).collect::<Vec<_>>());
}

/// Test that unordered parallel slicing passes exactly the requested number.
#[test]
fn test_parallel_unordered_limit_count() {
    let out = Streams::range(0, 100_000)
        .parallel()
        .boxed()
        .unordered()
        .skip(100)
        .unwrap()
        .limit(1_000)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(out.len(), 1_000);
}

/// Test that an unordered limit over a generator terminates.
#[test]
fn test_parallel_limit_on_generate() {
    let out = Streams::generate(|| 7).parallel().limit(50).unwrap().to_vec().unwrap();
    assert_eq!(out.len(), 50);
    assert!(out.iter().all(|&x| x == 7));
}

// ============================================================================
// Argument Validation Tests
// ============================================================================

/// Test that negative counts are rejected when the stage is appended.
#[test]
fn test_negative_slice_counts_rejected() {
    let limit = Streams::of(vec![1]).limit(-1);
    assert!(matches!(
        limit,
        Err(PipelineError::InvalidArgument { parameter: "max_size", value: -1 })
    ));

    let skip = Streams::of(vec![1]).skip(-3);
    assert!(matches!(skip, Err(PipelineError::InvalidArgument { value: -3, .. })));
}

// ============================================================================
// Sorting Tests
// ============================================================================

/// Test natural sort.
#[test]
fn test_sorted_natural() {
    let out = Streams::of(vec![5, 3, 9, 1]).sorted().to_vec().unwrap();
    assert_eq!(out, vec![1, 3, 5, 9]);
}

/// Test that a comparator sort is stable.
#[test]
fn test_sorted_by_is_stable() {
    let pairs = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
    let out = Streams::of(pairs)
        .sorted_by(comparing(|p: &(i32, char)| p.0))
        .to_vec()
        .unwrap();
    assert_eq!(out, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
}

/// Test that a parallel sort matches the sequential one and stays stable.
#[test]
fn test_parallel_sort_matches_sequential() {
    let input: Vec<(u32, usize)> = (0..30_000usize)
        .map(|i| ((i as u32).wrapping_mul(2_654_435_761) % 1_000, i))
        .collect();
    let sequential = Streams::of(input.clone())
        .sorted_by(comparing(|p: &(u32, usize)| p.0))
        .to_vec()
        .unwrap();
    let parallel = Streams::of(input)
        .parallel()
        .sorted_by(comparing(|p: &(u32, usize)| p.0))
        .to_vec()
        .unwrap();
    assert_eq!(parallel, sequential);
}

/// Test that a sort downstream of a limit only sees the limited prefix.
#[test]
fn test_sort_after_limit() {
    let out = Streams::of(vec![9, 8, 7, 6, 5]).limit(3).unwrap().sorted().to_vec().unwrap();
    assert_eq!(out, vec![7, 8, 9]);
}

/// Test that a limit after a sort stops the replay early.
#[test]
fn test_limit_after_sort() {
    let first_two = Streams::of(vec![4, 2, 5, 1]).sorted().limit(2).unwrap().to_vec().unwrap();
    assert_eq!(first_two, vec![1, 2]);
}

/// Test the total order used for doubles.
#[test]
fn test_double_sorted_total_order() {
    let out = Streams::doubles(vec![2.0, f64::NAN, -0.0, 0.0, -1.5]).sorted().to_vec().unwrap();
    assert_relative_eq!(out[0], -1.5);
    assert!(out[1] == 0.0 && out[1].is_sign_negative());
    assert!(out[2] == 0.0 && out[2].is_sign_positive());
    assert_relative_eq!(out[3], 2.0);
    assert!(out[4].is_nan());
}

//! Tests for deduplication.
//!
//! These tests verify the distinct stage under each strategy:
//! - Hash-based deduplication of unordered-by-value input
//! - Streaming deduplication of sorted input
//! - Pass-through on input already known distinct
//! - Ordered and unordered parallel evaluation, including absent values
//!
//! ## Test Organization
//!
//! 1. **Sequential** - Strategy selection and first-occurrence order
//! 2. **Parallel** - Ordered reduction and concurrent set
//! 3. **Absent Values** - `None` handled as an ordinary value

use std::collections::HashSet;

use pipeflow::prelude::*;

// ============================================================================
// Sequential Tests
// ============================================================================

/// Test that first occurrences survive in encounter order.
#[test]
fn test_distinct_keeps_first_occurrences() {
    let out = Streams::of(vec![3, 1, 2, 1, 3, 2]).distinct().to_vec().unwrap();
    assert_eq!(out, vec![3, 1, 2]);
}

/// Test that distinct applied twice equals distinct applied once.
#[test]
fn test_distinct_is_idempotent() {
    let once = Streams::of(vec![5, 5, 4, 4, 3]).distinct().to_vec().unwrap();
    let twice = Streams::of(vec![5, 5, 4, 4, 3]).distinct().distinct().to_vec().unwrap();
    assert_eq!(once, twice);
}

/// Test the streaming strategy on sorted input.
#[test]
fn test_distinct_on_sorted_input() {
    let out = Streams::of(vec![4, 1, 4, 2, 1, 2, 3])
        .sorted()
        .distinct()
        .to_vec()
        .unwrap();
    assert_eq!(out, vec![1, 2, 3, 4]);
}

/// Test that distinct marks the chain DISTINCT and no longer SIZED.
#[test]
fn test_distinct_flags() {
    let flags = Streams::of(vec![1, 1]).distinct().flags();
    assert!(flags.is_distinct());
    assert!(!flags.is_sized());
}

/// Test that counting after distinct traverses instead of trusting the source size.
#[test]
fn test_distinct_count() {
    assert_eq!(Streams::of(vec![1, 1, 2, 2, 2]).distinct().count().unwrap(), 2);
}

/// Test a stage that is already distinct passes everything through.
#[test]
fn test_distinct_on_range_is_pass_through() {
    let out = Streams::range(0, 6).distinct().to_vec().unwrap();
    assert_eq!(out, vec![0, 1, 2, 3, 4, 5]);
}

// ============================================================================
// Parallel Tests
// ============================================================================

/// Test that ordered parallel deduplication matches the sequential result.
#[test]
fn test_parallel_ordered_distinct_matches_sequential() {
    let input: Vec<u32> = (0..20_000).map(|i| (i * 7919) % 313).collect();
    let sequential = Streams::of(input.clone()).distinct().to_vec().unwrap();
    let parallel = Streams::of(input).parallel().distinct().to_vec().unwrap();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel.len(), 313);
}

/// Test that unordered parallel deduplication yields each value once.
#[test]
fn test_parallel_unordered_distinct_is_a_set() {
    let input: Vec<u32> = (0..20_000).map(|i| i % 97).collect();
    let out = Streams::of(input).unordered().parallel().distinct().to_vec().unwrap();

    let unique: HashSet<u32> = out.iter().copied().collect();
    assert_eq!(out.len(), 97);
    assert_eq!(unique.len(), 97);
}

/// Test a lazy unordered distinct feeding a further stage.
#[test]
fn test_parallel_unordered_distinct_then_map() {
    let input: Vec<u32> = (0..5_000).map(|i| i % 50).collect();
    let total: u64 = Streams::of(input)
        .unordered()
        .parallel()
        .distinct()
        .map(u64::from)
        .reduce(0, |a, b| a + b)
        .unwrap();
    assert_eq!(total, (0..50).sum::<u64>());
}

// ============================================================================
// Absent Value Tests
// ============================================================================

/// Test that `None` is deduplicated like any other value.
#[test]
fn test_distinct_with_absent_values_sequential() {
    let out = Streams::of(vec![Some(1), None, Some(2), None, Some(1)])
        .distinct()
        .to_vec()
        .unwrap();
    assert_eq!(out, vec![Some(1), None, Some(2)]);
}

/// Test the hashing strategy with absent values on an unordered chain.
#[test]
fn test_distinct_with_absent_values_sequential_unordered() {
    let out = Streams::of(vec![Some(1), None, Some(2), None, Some(1)])
        .unordered()
        .distinct()
        .to_vec()
        .unwrap();

    let unique: HashSet<Option<i32>> = out.iter().copied().collect();
    assert_eq!(out.len(), 3);
    assert_eq!(unique, HashSet::from([Some(1), None, Some(2)]));
}

/// Test the concurrent strategy with absent values.
#[test]
fn test_distinct_with_absent_values_parallel_unordered() {
    let mut input = Vec::new();
    for _ in 0..2_000 {
        input.extend([Some(1), Some(2), None]);
    }
    let out = Streams::of(input).unordered().parallel().distinct().to_vec().unwrap();

    let unique: HashSet<Option<i32>> = out.iter().copied().collect();
    assert_eq!(out.len(), 3);
    assert_eq!(unique, HashSet::from([Some(1), Some(2), None]));
}

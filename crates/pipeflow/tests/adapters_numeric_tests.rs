//! Tests for the `f64` and `i32` pipelines.
//!
//! These tests verify numeric terminals and the primitive-specific
//! behavior of the specialized pipelines:
//! - Compensated summation and averaging
//! - NaN propagation and signed-zero ordering in min and max
//! - Bit-pattern deduplication of doubles
//! - Wrapping integer sums and widening conversions
//!
//! ## Test Organization
//!
//! 1. **Double Sums** - Compensation, infinities, parallel merge
//! 2. **Double Extrema and Statistics**
//! 3. **Double Distinct**
//! 4. **Int Pipelines**

use approx::{assert_abs_diff_eq, assert_relative_eq};

use pipeflow::prelude::*;

// ============================================================================
// Double Sum Tests
// ============================================================================

/// Test that compensation recovers a small term between cancelling large ones.
#[test]
fn test_double_sum_is_compensated() {
    assert_eq!(Streams::doubles(vec![1e16, 1.0, -1e16]).sum().unwrap(), 1.0);
}

/// Test that summing many tenths stays close to the exact value.
#[test]
fn test_double_sum_of_tenths() {
    let sum = Streams::doubles(vec![0.1; 1_000_000]).sum().unwrap();
    assert_abs_diff_eq!(sum, 100_000.0, epsilon = 1e-9);

    let parallel = Streams::doubles(vec![0.1; 1_000_000]).parallel().sum().unwrap();
    assert_abs_diff_eq!(parallel, 100_000.0, epsilon = 1e-9);
}

/// Test that same-signed infinities sum to infinity rather than NaN.
#[test]
fn test_double_sum_of_infinities() {
    let sum = Streams::doubles(vec![f64::INFINITY, 1.0, f64::INFINITY]).sum().unwrap();
    assert_eq!(sum, f64::INFINITY);

    let mixed = Streams::doubles(vec![f64::INFINITY, f64::NEG_INFINITY]).sum().unwrap();
    assert!(mixed.is_nan());
}

/// Test sums and averages on empty input.
#[test]
fn test_double_empty_terminals() {
    assert_eq!(Streams::doubles(Vec::new()).sum().unwrap(), 0.0);
    assert_eq!(Streams::doubles(Vec::new()).average().unwrap(), None);
    assert_eq!(Streams::doubles(Vec::new()).min().unwrap(), None);
}

/// Test the compensated average.
#[test]
fn test_double_average() {
    let avg = Streams::doubles(vec![1.0, 2.0, 3.0, 4.0]).average().unwrap();
    assert_eq!(avg, Some(2.5));
}

// ============================================================================
// Double Extrema and Statistics Tests
// ============================================================================

/// Test that NaN propagates through min and max.
#[test]
fn test_double_min_max_propagate_nan() {
    let values = vec![3.0, f64::NAN, -1.0];
    assert!(Streams::doubles(values.clone()).min().unwrap().is_some_and(f64::is_nan));
    assert!(Streams::doubles(values).max().unwrap().is_some_and(f64::is_nan));
}

/// Test that -0.0 is smaller than 0.0.
#[test]
fn test_double_min_max_signed_zero() {
    let min = Streams::doubles(vec![0.0, -0.0]).min().unwrap().unwrap_or(1.0);
    let max = Streams::doubles(vec![-0.0, 0.0]).max().unwrap().unwrap_or(1.0);
    assert!(min == 0.0 && min.is_sign_negative());
    assert!(max == 0.0 && max.is_sign_positive());
}

/// Test summary statistics in both modes.
#[test]
fn test_double_summary_statistics() {
    let values: Vec<f64> = (1..=10_000).map(f64::from).collect();
    let seq = Streams::doubles(values.clone()).summary_statistics().unwrap();
    let par = Streams::doubles(values).parallel().summary_statistics().unwrap();

    for stats in [seq, par] {
        assert_eq!(stats.count(), 10_000);
        assert_relative_eq!(stats.sum(), 50_005_000.0);
        assert_relative_eq!(stats.min(), 1.0);
        assert_relative_eq!(stats.max(), 10_000.0);
        assert_relative_eq!(stats.average(), 5_000.5);
    }
}

/// Test the empty statistics and their display form.
#[test]
fn test_double_summary_statistics_empty() {
    let stats = Streams::doubles(Vec::new()).summary_statistics().unwrap();
    assert_eq!(stats.count(), 0);
    assert_eq!(stats.min(), f64::INFINITY);
    assert_eq!(stats.max(), f64::NEG_INFINITY);
    assert_eq!(stats.average(), 0.0);
    assert!(stats.to_string().starts_with("DoubleSummaryStatistics{count=0"));
}

// ============================================================================
// Double Distinct Tests
// ============================================================================

/// Test that all NaNs are one value and signed zeros are two.
#[test]
fn test_double_distinct_by_bits() {
    let other_nan = f64::from_bits(0x7ff8_0000_0000_0001);
    let out = Streams::doubles(vec![f64::NAN, 0.0, -0.0, other_nan, 0.0, 1.5])
        .distinct()
        .to_vec()
        .unwrap();

    assert_eq!(out.len(), 4);
    assert!(out[0].is_nan());
    assert!(out[1] == 0.0 && out[1].is_sign_positive());
    assert!(out[2] == 0.0 && out[2].is_sign_negative());
    assert_relative_eq!(out[3], 1.5);
}

/// Test that double distinct does not report a sorted chain.
#[test]
fn test_double_distinct_clears_sorted() {
    let p = Streams::doubles(vec![2.0, 1.0, 2.0]).sorted();
    assert!(p.flags().is_sorted());

    let p = p.distinct();
    assert!(!p.flags().is_sorted());
    assert_eq!(p.to_vec().unwrap(), vec![1.0, 2.0]);
}

// ============================================================================
// Int Pipeline Tests
// ============================================================================

/// Test that the integer sum wraps while statistics do not.
#[test]
fn test_int_sum_wraps() {
    let sum = Streams::ints(vec![i32::MAX, 1]).sum().unwrap();
    assert_eq!(sum, i32::MIN);

    let stats = Streams::ints(vec![i32::MAX, 1]).summary_statistics().unwrap();
    assert_eq!(stats.sum(), i64::from(i32::MAX) + 1);
}

/// Test the integer average accumulates without overflow.
#[test]
fn test_int_average() {
    let avg = Streams::ints(vec![i32::MAX, i32::MAX]).average().unwrap();
    assert_eq!(avg, Some(f64::from(i32::MAX)));
    assert_eq!(Streams::ints(Vec::new()).average().unwrap(), None);
}

/// Test integer ranges and their terminals.
#[test]
fn test_int_range_terminals() {
    assert_eq!(Streams::range(0, 10).count().unwrap(), 10);
    assert_eq!(Streams::range_closed(1, 10).sum().unwrap(), 55);
    assert_eq!(Streams::range(5, 5).count().unwrap(), 0);
    assert_eq!(Streams::range(0, 10).min().unwrap(), Some(0));
    assert_eq!(Streams::range(0, 10).parallel().max().unwrap(), Some(9));
}

/// Test that integer distinct keeps a sorted chain sorted.
#[test]
fn test_int_distinct_keeps_sorted() {
    let p = Streams::ints(vec![3, 1, 3, 2, 1]).sorted().distinct();
    assert!(p.flags().is_sorted());
    assert_eq!(p.to_vec().unwrap(), vec![1, 2, 3]);
}

/// Test widening conversions.
#[test]
fn test_int_widening() {
    let longs = Streams::range(0, 3).map(|x| i32::MAX - 2 + x).as_long().map(|x| x + 1).to_vec().unwrap();
    assert_eq!(longs, vec![i64::from(i32::MAX) - 1, i64::from(i32::MAX), i64::from(i32::MAX) + 1]);

    let halves = Streams::range(1, 4).as_double().map(|x| x / 2.0).to_vec().unwrap();
    assert_eq!(halves, vec![0.5, 1.0, 1.5]);
}

/// Test round trips between the pipeline shapes.
#[test]
fn test_shape_conversions() {
    let lengths = IntPipeline::from(Streams::of(vec!["a", "bbb", "cc"]).map(|s| s.len() as i32))
        .sum()
        .unwrap();
    assert_eq!(lengths, 6);

    let labels = Streams::range(1, 3).map_to_obj(|x| format!("#{x}")).to_vec().unwrap();
    assert_eq!(labels, vec!["#1", "#2"]);

    let rounded = Streams::doubles(vec![1.4, 2.6]).map_to_int(|x| x.round() as i32).to_vec().unwrap();
    assert_eq!(rounded, vec![1, 3]);
}

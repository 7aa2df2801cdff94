//! Tests for the flag algebra.
//!
//! These tests verify how stage deltas combine with upstream flags:
//! - Known-true, known-false and unknown states
//! - Clear-wins composition and the monotonic short-circuit flag
//! - Flags observed on real pipelines after each operation
//!
//! ## Test Organization
//!
//! 1. **Combination** - Delta application on raw flag values
//! 2. **Pipelines** - Flags reported by chained operations

use pipeflow::internals::primitives::flags::{FlagDelta, FlagState, StreamFlags};
use pipeflow::prelude::*;

// ============================================================================
// Combination Tests
// ============================================================================

/// Test that a source only keeps cursor-reportable flags and implies ORDERED
/// from SORTED.
#[test]
fn test_for_source_implies_ordered() {
    let flags = StreamFlags::for_source(StreamFlags::SORTED | StreamFlags::SHORT_CIRCUIT);
    assert!(flags.is_sorted());
    assert!(flags.is_ordered());
    assert!(!flags.is_short_circuit());
}

/// Test the tri-state view after a clearing delta.
#[test]
fn test_clearing_makes_flag_known_false() {
    let source = StreamFlags::for_source(StreamFlags::ORDERED | StreamFlags::SIZED);
    let filtered = source.combine(FlagDelta::clearing(StreamFlags::SIZED));

    assert_eq!(filtered.state(StreamFlags::SIZED), FlagState::KnownFalse);
    assert_eq!(filtered.state(StreamFlags::ORDERED), FlagState::KnownTrue);
    assert_eq!(filtered.state(StreamFlags::DISTINCT), FlagState::Unknown);
}

/// Test that a flag both set and cleared by one delta ends up cleared.
#[test]
fn test_clear_wins_over_set() {
    let delta = FlagDelta::new(StreamFlags::SORTED, StreamFlags::SORTED);
    let flags = StreamFlags::for_source(StreamFlags::ORDERED).combine(delta);
    assert!(!flags.is_sorted());
    assert!(flags.is_cleared(StreamFlags::SORTED));
}

/// Test that short-circuiting can be set but never cleared.
#[test]
fn test_short_circuit_is_monotonic() {
    let flags = StreamFlags::EMPTY
        .combine(FlagDelta::setting(StreamFlags::SHORT_CIRCUIT))
        .combine(FlagDelta::clearing(StreamFlags::SHORT_CIRCUIT));
    assert!(flags.is_short_circuit());
}

/// Test that `then` composes deltas in application order.
#[test]
fn test_delta_then_matches_sequential_combine() {
    let first = FlagDelta::new(StreamFlags::SORTED, StreamFlags::SIZED);
    let second = FlagDelta::clearing(StreamFlags::SORTED);
    let start = StreamFlags::for_source(StreamFlags::ORDERED | StreamFlags::SIZED);

    assert_eq!(
        start.combine(first.then(second)),
        start.combine(first).combine(second)
    );
}

// ============================================================================
// Pipeline Flag Tests
// ============================================================================

/// Test the flags reported along a typical chain.
#[test]
fn test_pipeline_flags_follow_operations() {
    let source = Streams::range(0, 10);
    let flags = source.flags();
    assert!(flags.is_ordered() && flags.is_sorted() && flags.is_distinct() && flags.is_sized());

    let mapped = Streams::of(vec![1, 2, 3]).sorted().map(|x| x + 1);
    assert!(mapped.flags().is_ordered());
    assert!(!mapped.flags().is_sorted());

    let limited = Streams::of(vec![1, 2, 3]).limit(2).unwrap();
    assert!(limited.flags().is_short_circuit());
    assert!(!limited.flags().is_sized());

    let unordered = Streams::of(vec![1, 2, 3]).unordered();
    assert!(!unordered.flags().is_ordered());
}

/// Test operations that append no stage.
#[test]
fn test_elided_operations_keep_depth() {
    let sorted = Streams::range(0, 5).boxed().sorted();
    assert_eq!(sorted.depth(), 0);

    let skipped = Streams::of(vec![1, 2]).skip(0).unwrap();
    assert_eq!(skipped.depth(), 0);

    let generated = Streams::generate(|| 1).unordered();
    assert_eq!(generated.depth(), 0);
}

/// Test that a comparator sort marks the chain ordered but not sorted.
#[test]
fn test_comparator_sort_clears_sorted() {
    let flags = Streams::range(0, 5).boxed().sorted_by(reverse_order()).flags();
    assert!(flags.is_ordered());
    assert!(flags.is_cleared(StreamFlags::SORTED));
}

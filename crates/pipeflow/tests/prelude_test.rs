//! Tests for the prelude module.
//!
//! These tests verify that the prelude exports everything needed to build
//! and run pipelines without reaching into internal modules.
//!
//! ## Test Organization
//!
//! 1. **Import Verification** - All prelude exports are accessible
//! 2. **Workflows** - Complete chains work with prelude imports

use pipeflow::prelude::*;

// ============================================================================
// Import Verification Tests
// ============================================================================

/// Test that the entry points and pipeline shapes are exported.
#[test]
fn test_prelude_imports() {
    let reference: Pipeline<i32> = Streams::of(vec![1, 2, 3]);
    let ints: IntPipeline = Streams::ints(vec![1, 2, 3]);
    let doubles: DoublePipeline = Streams::doubles(vec![1.0, 2.0]);

    assert_eq!(reference.count().unwrap(), 3);
    assert_eq!(ints.sum().unwrap(), 6);
    assert_eq!(doubles.sum().unwrap(), 3.0);
}

/// Test that configuration and statistics types are exported.
#[test]
fn test_prelude_support_types() {
    let config = EngineConfig::new().max_split_depth(8);
    assert_eq!(config.max_split_depth, 8);

    let mut sum = CompensatedSum::<f64>::new();
    sum.add(0.5);
    assert_eq!(sum.value(), 0.5);

    assert_eq!(DoubleSummaryStatistics::new().count(), 0);
    assert_eq!(IntSummaryStatistics::new().count(), 0);
}

// ============================================================================
// Workflow Tests
// ============================================================================

/// Test a chain mixing comparators and terminals from the prelude.
#[test]
fn test_prelude_workflow() -> Result<(), PipelineError> {
    let sorted = Streams::of(vec![Some(3), None, Some(1)])
        .sorted_by(nulls_last(natural_order()))
        .to_vec()?;
    assert_eq!(sorted, vec![Some(1), Some(3), None]);

    let longest = Streams::of(vec!["a", "abc", "ab"]).max_by(comparing(|s: &&str| s.len()))?;
    assert_eq!(longest, Some("abc"));
    Ok(())
}

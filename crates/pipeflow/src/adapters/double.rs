//! `f64` pipelines.
//!
//! ## Purpose
//!
//! [`DoublePipeline`] specializes a chain of `f64` values with numeric
//! terminals: compensated `sum` and `average`, NaN-aware `min` and `max`, and
//! summary statistics.
//!
//! ## Design notes
//!
//! * **Newtype**: A thin wrapper over `Pipeline<f64>`; every stage and
//!   terminal goes through the same engine.
//! * **Distinct by bits**: Values are deduplicated through a key stage mapping
//!   each value to its canonical bit pattern, so all NaNs are one value and
//!   `-0.0` differs from `0.0`. Like any map the key stage clears SORTED.
//! * **Total sort**: `sorted` uses [`double_order`] and marks the chain
//!   SORTED.
//!
//! ## Invariants
//!
//! * `sum` of an empty chain is `0.0`; `average`, `min` and `max` are `None`.

// External dependencies
use core::fmt::Display;

// Internal dependencies
use crate::adapters::int::IntPipeline;
use crate::algorithms::sorted::{SortedOp, NATURAL_SORT_FLAGS};
use crate::engine::config::EngineConfig;
use crate::engine::pipeline::Pipeline;
use crate::math::comparators::{canonical_bits, double_order};
use crate::math::statistics::{float_max, float_min, DoubleSummaryStatistics};
use crate::math::summation::CompensatedSum;
use crate::primitives::errors::PipelineResult;
use crate::primitives::flags::StreamFlags;

/// A pipeline of `f64` values.
#[derive(Debug, Clone)]
pub struct DoublePipeline(Pipeline<f64>);

impl From<Pipeline<f64>> for DoublePipeline {
    fn from(inner: Pipeline<f64>) -> Self {
        Self(inner)
    }
}

impl From<DoublePipeline> for Pipeline<f64> {
    fn from(pipeline: DoublePipeline) -> Self {
        pipeline.0
    }
}

impl DoublePipeline {
    // ========================================================================
    // Introspection and Mode
    // ========================================================================

    /// Combined flags at the tail.
    pub fn flags(&self) -> StreamFlags {
        self.0.flags()
    }

    /// Whether terminal evaluation will run in parallel.
    pub fn is_parallel(&self) -> bool {
        self.0.is_parallel()
    }

    /// Evaluate in parallel.
    pub fn parallel(self) -> Self {
        Self(self.0.parallel())
    }

    /// Evaluate sequentially.
    pub fn sequential(self) -> Self {
        Self(self.0.sequential())
    }

    /// Attach an engine configuration.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::with_config`].
    pub fn with_config(self, config: EngineConfig) -> PipelineResult<Self> {
        self.0.with_config(config).map(Self)
    }

    // ========================================================================
    // Intermediate Operations
    // ========================================================================

    /// Apply `mapper` to every value.
    pub fn map<F>(self, mapper: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self(self.0.map(mapper))
    }

    /// Keep values matching `predicate`.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(f64) -> bool + Send + Sync + 'static,
    {
        Self(self.0.filter(move |x: &f64| predicate(*x)))
    }

    /// Replace every value with the values of the pipeline `mapper` returns.
    pub fn flat_map<F>(self, mapper: F) -> Self
    where
        F: Fn(f64) -> DoublePipeline + Send + Sync + 'static,
    {
        Self(self.0.flat_map(move |x| mapper(x).0))
    }

    /// Like [`flat_map`](Self::flat_map) with a fallible mapper.
    pub fn try_flat_map<E, F>(self, mapper: F) -> Self
    where
        E: Display + 'static,
        F: Fn(f64) -> Result<DoublePipeline, E> + Send + Sync + 'static,
    {
        Self(self.0.try_flat_map(move |x| mapper(x).map(|sub| sub.0)))
    }

    /// Observe every value.
    pub fn peek<F>(self, observer: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        Self(self.0.peek(move |x: &f64| observer(*x)))
    }

    /// At most `max_size` values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `max_size` is negative.
    pub fn limit(self, max_size: i64) -> PipelineResult<Self> {
        self.0.limit(max_size).map(Self)
    }

    /// Drop the first `n` values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n` is negative.
    pub fn skip(self, n: i64) -> PipelineResult<Self> {
        self.0.skip(n).map(Self)
    }

    /// Sort ascending; `-0.0` before `0.0`, NaN last.
    pub fn sorted(self) -> Self {
        if self.flags().is_sorted() {
            return self;
        }
        Self(
            self.0
                .append_stateful("sorted", NATURAL_SORT_FLAGS, SortedOp::new(double_order)),
        )
    }

    /// Drop repeated values, comparing bit patterns.
    pub fn distinct(self) -> Self {
        Self(
            self.0
                .map(canonical_bits)
                .distinct()
                .map(|bits: i64| f64::from_bits(bits as u64)),
        )
    }

    /// Drop the encounter-order guarantee.
    pub fn unordered(self) -> Self {
        Self(self.0.unordered())
    }

    // ========================================================================
    // Shape Changes
    // ========================================================================

    /// The underlying reference pipeline.
    pub fn boxed(self) -> Pipeline<f64> {
        self.0
    }

    /// Map every value to an arbitrary type.
    pub fn map_to_obj<U, F>(self, mapper: F) -> Pipeline<U>
    where
        U: Send + 'static,
        F: Fn(f64) -> U + Send + Sync + 'static,
    {
        self.0.map(mapper)
    }

    /// Map every value to an `i32`.
    pub fn map_to_int<F>(self, mapper: F) -> IntPipeline
    where
        F: Fn(f64) -> i32 + Send + Sync + 'static,
    {
        IntPipeline::from(self.0.map(mapper))
    }

    // ========================================================================
    // Numeric Terminals
    // ========================================================================

    /// Compensated sum of all values.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn sum(self) -> PipelineResult<f64> {
        let total = self.0.collect_with(
            CompensatedSum::<f64>::new,
            |acc: &mut CompensatedSum<f64>, x| acc.add(x),
            |acc: &mut CompensatedSum<f64>, later| acc.merge(&later),
        )?;
        Ok(total.value())
    }

    /// Compensated mean, or `None` for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn average(self) -> PipelineResult<Option<f64>> {
        let (total, count) = self.0.collect_with(
            || (CompensatedSum::<f64>::new(), 0u64),
            |acc: &mut (CompensatedSum<f64>, u64), x| {
                acc.0.add(x);
                acc.1 += 1;
            },
            |acc: &mut (CompensatedSum<f64>, u64), later| {
                acc.0.merge(&later.0);
                acc.1 += later.1;
            },
        )?;
        Ok((count > 0).then(|| total.value() / count as f64))
    }

    /// Smallest value; NaN if any value is NaN.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn min(self) -> PipelineResult<Option<f64>> {
        self.0.reduce_with(float_min::<f64>)
    }

    /// Largest value; NaN if any value is NaN.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn max(self) -> PipelineResult<Option<f64>> {
        self.0.reduce_with(float_max::<f64>)
    }

    /// Count, sum, min, max and average in one pass.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn summary_statistics(self) -> PipelineResult<DoubleSummaryStatistics> {
        self.0.collect_with(
            DoubleSummaryStatistics::new,
            |stats: &mut DoubleSummaryStatistics, x| stats.accept(x),
            |stats: &mut DoubleSummaryStatistics, later| stats.combine(&later),
        )
    }

    // ========================================================================
    // General Terminals
    // ========================================================================

    /// Number of values.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn count(self) -> PipelineResult<u64> {
        self.0.count()
    }

    /// Fold from `identity` with an associative `op`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn reduce<F>(self, identity: f64, op: F) -> PipelineResult<f64>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.0.reduce(identity, op)
    }

    /// Fold with an associative `op`; `None` for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn reduce_with<F>(self, op: F) -> PipelineResult<Option<f64>>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.0.reduce_with(op)
    }

    /// Whether any value matches.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn any_match<P>(self, predicate: P) -> PipelineResult<bool>
    where
        P: Fn(f64) -> bool + Send + Sync,
    {
        self.0.any_match(|x: &f64| predicate(*x))
    }

    /// Whether every value matches.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn all_match<P>(self, predicate: P) -> PipelineResult<bool>
    where
        P: Fn(f64) -> bool + Send + Sync,
    {
        self.0.all_match(|x: &f64| predicate(*x))
    }

    /// Whether no value matches.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn none_match<P>(self, predicate: P) -> PipelineResult<bool>
    where
        P: Fn(f64) -> bool + Send + Sync,
    {
        self.0.none_match(|x: &f64| predicate(*x))
    }

    /// First value in encounter order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn find_first(self) -> PipelineResult<Option<f64>> {
        self.0.find_first()
    }

    /// Any value.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn find_any(self) -> PipelineResult<Option<f64>> {
        self.0.find_any()
    }

    /// Values in encounter order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn to_vec(self) -> PipelineResult<Vec<f64>> {
        self.0.to_vec()
    }

    /// Run `action` on every value in any order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn for_each<F>(self, action: F) -> PipelineResult<()>
    where
        F: Fn(f64) + Send + Sync,
    {
        self.0.for_each(action)
    }

    /// Run `action` on every value in encounter order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn for_each_ordered<F>(self, action: F) -> PipelineResult<()>
    where
        F: Fn(f64) + Send + Sync,
    {
        self.0.for_each_ordered(action)
    }
}

//! `i32` pipelines.
//!
//! [`IntPipeline`] wraps a `Pipeline<i32>` with integer terminals. `sum`
//! wraps on overflow like two's-complement addition; `average` and the
//! summary statistics accumulate in `i64` and do not. Unlike the `f64`
//! pipeline, `distinct` runs directly on the values, so a SORTED chain stays
//! SORTED and uses the streaming strategy.

// External dependencies
use core::fmt::Display;

// Internal dependencies
use crate::adapters::double::DoublePipeline;
use crate::engine::config::EngineConfig;
use crate::engine::pipeline::Pipeline;
use crate::math::statistics::IntSummaryStatistics;
use crate::primitives::errors::PipelineResult;
use crate::primitives::flags::StreamFlags;

/// A pipeline of `i32` values.
#[derive(Debug, Clone)]
pub struct IntPipeline(Pipeline<i32>);

impl From<Pipeline<i32>> for IntPipeline {
    fn from(inner: Pipeline<i32>) -> Self {
        Self(inner)
    }
}

impl From<IntPipeline> for Pipeline<i32> {
    fn from(pipeline: IntPipeline) -> Self {
        pipeline.0
    }
}

impl IntPipeline {
    /// Combined flags at the tail.
    pub fn flags(&self) -> StreamFlags {
        self.0.flags()
    }

    /// Distance of the tail from the source.
    pub fn depth(&self) -> usize {
        self.0.depth()
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
        F: Fn(i32) -> i32 + Send + Sync + 'static,
    {
        Self(self.0.map(mapper))
    }

    /// Keep values matching `predicate`.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(i32) -> bool + Send + Sync + 'static,
    {
        Self(self.0.filter(move |x: &i32| predicate(*x)))
    }

    /// Replace every value with the values of the pipeline `mapper` returns.
    pub fn flat_map<F>(self, mapper: F) -> Self
    where
        F: Fn(i32) -> IntPipeline + Send + Sync + 'static,
    {
        Self(self.0.flat_map(move |x| mapper(x).0))
    }

    /// Like [`flat_map`](Self::flat_map) with a fallible mapper.
    pub fn try_flat_map<E, F>(self, mapper: F) -> Self
    where
        E: Display + 'static,
        F: Fn(i32) -> Result<IntPipeline, E> + Send + Sync + 'static,
    {
        Self(self.0.try_flat_map(move |x| mapper(x).map(|sub| sub.0)))
    }

    /// Observe every value.
    pub fn peek<F>(self, observer: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        Self(self.0.peek(move |x: &i32| observer(*x)))
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

    /// Sort ascending.
    pub fn sorted(self) -> Self {
        Self(self.0.sorted())
    }

    /// Drop repeated values.
    pub fn distinct(self) -> Self {
        Self(self.0.distinct())
    }

    /// Drop the encounter-order guarantee.
    pub fn unordered(self) -> Self {
        Self(self.0.unordered())
    }

    // ========================================================================
    // Shape Changes
    // ========================================================================

    /// The underlying reference pipeline.
    pub fn boxed(self) -> Pipeline<i32> {
        self.0
    }

    /// Map every value to an arbitrary type.
    pub fn map_to_obj<U, F>(self, mapper: F) -> Pipeline<U>
    where
        U: Send + 'static,
        F: Fn(i32) -> U + Send + Sync + 'static,
    {
        self.0.map(mapper)
    }

    /// Map every value to an `f64`.
    pub fn map_to_double<F>(self, mapper: F) -> DoublePipeline
    where
        F: Fn(i32) -> f64 + Send + Sync + 'static,
    {
        DoublePipeline::from(self.0.map(mapper))
    }

    /// Widen every value to `f64`.
    pub fn as_double(self) -> DoublePipeline {
        DoublePipeline::from(self.0.map(f64::from))
    }

    /// Widen every value to `i64`.
    pub fn as_long(self) -> Pipeline<i64> {
        self.0.map(i64::from)
    }

    // ========================================================================
    // Numeric Terminals
    // ========================================================================

    /// Sum, wrapping on overflow.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn sum(self) -> PipelineResult<i32> {
        self.0.reduce(0, i32::wrapping_add)
    }

    /// Arithmetic mean, or `None` for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn average(self) -> PipelineResult<Option<f64>> {
        let (sum, count) = self.0.collect_with(
            || (0i64, 0u64),
            |acc: &mut (i64, u64), x| {
                acc.0 = acc.0.wrapping_add(i64::from(x));
                acc.1 += 1;
            },
            |acc: &mut (i64, u64), later| {
                acc.0 = acc.0.wrapping_add(later.0);
                acc.1 += later.1;
            },
        )?;
        Ok((count > 0).then(|| sum as f64 / count as f64))
    }

    /// Smallest value.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn min(self) -> PipelineResult<Option<i32>> {
        self.0.reduce_with(i32::min)
    }

    /// Largest value.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn max(self) -> PipelineResult<Option<i32>> {
        self.0.reduce_with(i32::max)
    }

    /// Count, sum, min, max and average in one pass.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn summary_statistics(self) -> PipelineResult<IntSummaryStatistics> {
        self.0.collect_with(
            IntSummaryStatistics::new,
            |stats: &mut IntSummaryStatistics, x| stats.accept(x),
            |stats: &mut IntSummaryStatistics, later| stats.combine(&later),
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
    pub fn reduce<F>(self, identity: i32, op: F) -> PipelineResult<i32>
    where
        F: Fn(i32, i32) -> i32 + Send + Sync + 'static,
    {
        self.0.reduce(identity, op)
    }

    /// Fold with an associative `op`; `None` for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn reduce_with<F>(self, op: F) -> PipelineResult<Option<i32>>
    where
        F: Fn(i32, i32) -> i32 + Send + Sync + 'static,
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
        P: Fn(i32) -> bool + Send + Sync,
    {
        self.0.any_match(|x: &i32| predicate(*x))
    }

    /// Whether every value matches.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn all_match<P>(self, predicate: P) -> PipelineResult<bool>
    where
        P: Fn(i32) -> bool + Send + Sync,
    {
        self.0.all_match(|x: &i32| predicate(*x))
    }

    /// Whether no value matches.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn none_match<P>(self, predicate: P) -> PipelineResult<bool>
    where
        P: Fn(i32) -> bool + Send + Sync,
    {
        self.0.none_match(|x: &i32| predicate(*x))
    }

    /// First value in encounter order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn find_first(self) -> PipelineResult<Option<i32>> {
        self.0.find_first()
    }

    /// Any value.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn find_any(self) -> PipelineResult<Option<i32>> {
        self.0.find_any()
    }

    /// Values in encounter order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn to_vec(self) -> PipelineResult<Vec<i32>> {
        self.0.to_vec()
    }

    /// Run `action` on every value in any order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn for_each<F>(self, action: F) -> PipelineResult<()>
    where
        F: Fn(i32) + Send + Sync,
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
        F: Fn(i32) + Send + Sync,
    {
        self.0.for_each_ordered(action)
    }
}

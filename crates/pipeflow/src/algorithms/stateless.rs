//! Stateless intermediate operations.
//!
//! ## Purpose
//!
//! Element-at-a-time stages: map, filter, flat-map (sub-pipeline and iterator
//! forms), the fallible flat-map, peek, and the pass-through used to drop
//! ORDERED.
//!
//! ## Design notes
//!
//! * **Sink decorators**: Each operation contributes a sink that transforms
//!   and forwards; lifecycle calls and cancellation polls pass straight through.
//! * **Nested traversal**: A flat-map drives each sub-pipeline sequentially
//!   into the already-begun downstream, stopping when the downstream cancels.
//! * **Failures**: Errors from sub-pipelines or a fallible mapper go to the
//!   evaluation's error slot. Both flat-maps then report the failure as a
//!   cancellation request, halting the source loop.
//!
//! ## Key concepts
//!
//! * **Flag deltas**: map clears SORTED and DISTINCT; filter clears SIZED;
//!   flat-map clears all three; peek preserves everything; unordered clears
//!   ORDERED.

// External dependencies
use core::fmt::Display;
use std::sync::Arc;

// Internal dependencies
use crate::engine::partition::{ErrorSlot, SinkContext, StageOp};
use crate::engine::pipeline::Pipeline;
use crate::primitives::errors::PipelineError;
use crate::primitives::flags::{FlagDelta, StreamFlags};
use crate::primitives::sink::{Sink, Splice};

// ============================================================================
// Flag Deltas
// ============================================================================

/// Delta of a map stage.
pub const MAP_FLAGS: FlagDelta = FlagDelta::clearing(StreamFlags::SORTED.union(StreamFlags::DISTINCT));

/// Delta of a filter stage.
pub const FILTER_FLAGS: FlagDelta = FlagDelta::clearing(StreamFlags::SIZED);

/// Delta of a flat-map stage.
pub const FLAT_MAP_FLAGS: FlagDelta = FlagDelta::clearing(
    StreamFlags::SORTED
        .union(StreamFlags::DISTINCT)
        .union(StreamFlags::SIZED),
);

/// Delta of a fallible flat-map stage.
pub const TRY_FLAT_MAP_FLAGS: FlagDelta = FlagDelta::new(
    StreamFlags::SHORT_CIRCUIT,
    StreamFlags::SORTED
        .union(StreamFlags::DISTINCT)
        .union(StreamFlags::SIZED),
);

/// Delta of a stage dropping the ordering guarantee.
pub const UNORDERED_FLAGS: FlagDelta = FlagDelta::clearing(StreamFlags::ORDERED);

// ============================================================================
// Map
// ============================================================================

/// Apply a function to every element.
pub struct MapOp<F>(pub F);

struct MapSink<'a, F, U> {
    mapper: &'a F,
    downstream: Box<dyn Sink<U> + 'a>,
}

impl<T, U, F: Fn(T) -> U> Sink<T> for MapSink<'_, F, U> {
    fn begin(&mut self, size: Option<u64>) {
        self.downstream.begin(size);
    }

    #[inline]
    fn accept(&mut self, item: T) {
        self.downstream.accept((self.mapper)(item));
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

impl<T, U, F> StageOp<T, U> for MapOp<F>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> U + Send + Sync,
{
    fn wrap_sink<'a>(&'a self, _ctx: &SinkContext, downstream: Box<dyn Sink<U> + 'a>) -> Box<dyn Sink<T> + 'a> {
        Box::new(MapSink {
            mapper: &self.0,
            downstream,
        })
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Keep elements matching a predicate.
pub struct FilterOp<P>(pub P);

struct FilterSink<'a, P, T> {
    predicate: &'a P,
    downstream: Box<dyn Sink<T> + 'a>,
}

impl<T, P: Fn(&T) -> bool> Sink<T> for FilterSink<'_, P, T> {
    fn begin(&mut self, _size: Option<u64>) {
        self.downstream.begin(None);
    }

    #[inline]
    fn accept(&mut self, item: T) {
        if (self.predicate)(&item) {
            self.downstream.accept(item);
        }
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

impl<T, P> StageOp<T, T> for FilterOp<P>
where
    T: 'static,
    P: Fn(&T) -> bool + Send + Sync,
{
    fn wrap_sink<'a>(&'a self, _ctx: &SinkContext, downstream: Box<dyn Sink<T> + 'a>) -> Box<dyn Sink<T> + 'a> {
        Box::new(FilterSink {
            predicate: &self.0,
            downstream,
        })
    }
}

// ============================================================================
// Flat Map
// ============================================================================

/// Replace every element with the elements of a sub-pipeline.
pub struct FlatMapOp<F>(pub F);

struct FlatMapSink<'a, F, U> {
    mapper: &'a F,
    errors: Arc<ErrorSlot>,
    downstream: Box<dyn Sink<U> + 'a>,
}

impl<T, U, F> Sink<T> for FlatMapSink<'_, F, U>
where
    U: Send + 'static,
    F: Fn(T) -> Pipeline<U>,
{
    fn begin(&mut self, _size: Option<u64>) {
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        if self.errors.is_failed() {
            return;
        }
        let sub = (self.mapper)(item);
        if let Err(error) = sub.drive_into(&mut Splice::new(&mut *self.downstream)) {
            self.errors.record(error);
        }
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.errors.is_failed() || self.downstream.cancellation_requested()
    }
}

impl<T, U, F> StageOp<T, U> for FlatMapOp<F>
where
    T: 'static,
    U: Send + 'static,
    F: Fn(T) -> Pipeline<U> + Send + Sync,
{
    fn wrap_sink<'a>(&'a self, ctx: &SinkContext, downstream: Box<dyn Sink<U> + 'a>) -> Box<dyn Sink<T> + 'a> {
        Box::new(FlatMapSink {
            mapper: &self.0,
            errors: Arc::clone(&ctx.errors),
            downstream,
        })
    }

    fn may_fail(&self) -> bool {
        true
    }
}

/// Replace every element with the items of an iterator.
pub struct FlatMapIterOp<F>(pub F);

struct FlatMapIterSink<'a, F, U> {
    mapper: &'a F,
    downstream: Box<dyn Sink<U> + 'a>,
}

impl<T, U, I, F> Sink<T> for FlatMapIterSink<'_, F, U>
where
    I: IntoIterator<Item = U>,
    F: Fn(T) -> I,
{
    fn begin(&mut self, _size: Option<u64>) {
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        for sub in (self.mapper)(item) {
            if self.downstream.cancellation_requested() {
                break;
            }
            self.downstream.accept(sub);
        }
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

impl<T, U, I, F> StageOp<T, U> for FlatMapIterOp<F>
where
    T: 'static,
    U: 'static,
    I: IntoIterator<Item = U>,
    F: Fn(T) -> I + Send + Sync,
{
    fn wrap_sink<'a>(&'a self, _ctx: &SinkContext, downstream: Box<dyn Sink<U> + 'a>) -> Box<dyn Sink<T> + 'a> {
        Box::new(FlatMapIterSink {
            mapper: &self.0,
            downstream,
        })
    }
}

/// Flat-map whose mapper may fail; the first failure aborts the evaluation.
pub struct TryFlatMapOp<F>(pub F);

struct TryFlatMapSink<'a, F, U> {
    mapper: &'a F,
    errors: Arc<ErrorSlot>,
    downstream: Box<dyn Sink<U> + 'a>,
}

impl<T, U, E, F> Sink<T> for TryFlatMapSink<'_, F, U>
where
    U: Send + 'static,
    E: Display,
    F: Fn(T) -> Result<Pipeline<U>, E>,
{
    fn begin(&mut self, _size: Option<u64>) {
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        if self.errors.is_failed() {
            return;
        }
        let outcome = match (self.mapper)(item) {
            Ok(sub) => sub.drive_into(&mut Splice::new(&mut *self.downstream)),
            Err(error) => Err(PipelineError::element("try_flat_map", error.to_string())),
        };
        if let Err(error) = outcome {
            self.errors.record(error);
        }
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.errors.is_failed() || self.downstream.cancellation_requested()
    }
}

impl<T, U, E, F> StageOp<T, U> for TryFlatMapOp<F>
where
    T: 'static,
    U: Send + 'static,
    E: Display,
    F: Fn(T) -> Result<Pipeline<U>, E> + Send + Sync,
{
    fn wrap_sink<'a>(&'a self, ctx: &SinkContext, downstream: Box<dyn Sink<U> + 'a>) -> Box<dyn Sink<T> + 'a> {
        Box::new(TryFlatMapSink {
            mapper: &self.0,
            errors: Arc::clone(&ctx.errors),
            downstream,
        })
    }

    fn may_fail(&self) -> bool {
        true
    }
}

// ============================================================================
// Peek
// ============================================================================

/// Observe every element without changing it.
pub struct PeekOp<F>(pub F);

struct PeekSink<'a, F, T> {
    observer: &'a F,
    downstream: Box<dyn Sink<T> + 'a>,
}

impl<T, F: Fn(&T)> Sink<T> for PeekSink<'_, F, T> {
    fn begin(&mut self, size: Option<u64>) {
        self.downstream.begin(size);
    }

    #[inline]
    fn accept(&mut self, item: T) {
        (self.observer)(&item);
        self.downstream.accept(item);
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

impl<T, F> StageOp<T, T> for PeekOp<F>
where
    T: 'static,
    F: Fn(&T) + Send + Sync,
{
    fn wrap_sink<'a>(&'a self, _ctx: &SinkContext, downstream: Box<dyn Sink<T> + 'a>) -> Box<dyn Sink<T> + 'a> {
        Box::new(PeekSink {
            observer: &self.0,
            downstream,
        })
    }
}

// ============================================================================
// Pass-through
// ============================================================================

/// Stage that forwards elements unchanged; only its flag delta matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassOp;

impl<T: 'static> StageOp<T, T> for PassOp {
    fn wrap_sink<'a>(&'a self, _ctx: &SinkContext, downstream: Box<dyn Sink<T> + 'a>) -> Box<dyn Sink<T> + 'a> {
        downstream
    }
}

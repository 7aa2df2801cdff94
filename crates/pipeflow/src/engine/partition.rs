//! Partitions: splittable, drivable views of a stage chain.
//!
//! ## Purpose
//!
//! A [`Partition`] is what evaluation actually operates on. It pairs a piece
//! of the source cursor with the stage decorators that sit between it and the
//! terminal. Sequential evaluation drives one partition; parallel evaluation
//! splits it into a task tree and drives each leaf with a fresh consumer.
//!
//! ## Design notes
//!
//! * **Wrapping**: [`WrappedPartition`] applies one [`StageOp`] by wrapping the
//!   downstream sink at drive time, so splits share the op and never its state.
//! * **Barriers**: A [`StatefulOp`] replaces the upstream partition in parallel
//!   mode, either with a materialized buffer tree or with a lazy partition.
//! * **Error slot**: Element failures are recorded in a first-wins
//!   [`ErrorSlot`] shared by all tasks of one evaluation.
//!
//! ## Key concepts
//!
//! * **Short-circuit drive**: When requested, or when a stage may fail, the
//!   source loop polls `cancellation_requested` before each element.
//! * **Evaluation plan**: [`EvalPlan`] carries the execution mode, the error
//!   slot, the configuration and the optional dedicated pool.
//!
//! ## Invariants
//!
//! * `begin` is called once before and `end` once after each drive.
//! * Once an error is recorded, it is never replaced.

// External dependencies
use rayon::ThreadPool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

// Internal dependencies
use crate::engine::config::EngineConfig;
use crate::primitives::cursor::Cursor;
use crate::primitives::errors::PipelineError;
use crate::primitives::flags::StreamFlags;
use crate::primitives::node::Node;
use crate::primitives::sink::Sink;

// ============================================================================
// Error Slot
// ============================================================================

/// First-wins store for an element failure raised during evaluation.
#[derive(Debug, Default)]
pub struct ErrorSlot {
    failed: AtomicBool,
    error: Mutex<Option<PipelineError>>,
}

impl ErrorSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` unless an earlier error was already recorded.
    pub fn record(&self, error: PipelineError) {
        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            log::debug!("evaluation failed: {error}");
            *slot = Some(error);
            self.failed.store(true, Ordering::Release);
        }
    }

    /// Whether any error was recorded.
    #[inline]
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Remove the recorded error.
    pub fn take(&self) -> Option<PipelineError> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

// ============================================================================
// Evaluation Plan
// ============================================================================

/// Everything an evaluation needs besides the chain itself.
#[derive(Debug, Clone)]
pub struct EvalPlan {
    parallel: bool,
    errors: Arc<ErrorSlot>,
    config: EngineConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl EvalPlan {
    /// A plan with a fresh error slot.
    pub fn new(parallel: bool, config: EngineConfig, pool: Option<Arc<ThreadPool>>) -> Self {
        Self {
            parallel,
            errors: Arc::new(ErrorSlot::new()),
            config,
            pool,
        }
    }

    /// A sequential plan with the default configuration.
    pub fn sequential() -> Self {
        Self::new(false, EngineConfig::default(), None)
    }

    /// Whether stages and the terminal evaluate in parallel.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Error slot shared by every task of this evaluation.
    pub fn errors(&self) -> &Arc<ErrorSlot> {
        &self.errors
    }

    /// Engine configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `f` inside the dedicated pool when one is configured.
    pub fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match (&self.pool, self.parallel) {
            (Some(pool), true) => pool.install(f),
            _ => f(),
        }
    }

    /// Sink context for a stage with the given input and output flags.
    pub fn context(&self, input: StreamFlags, output: StreamFlags) -> SinkContext {
        SinkContext {
            input,
            output,
            errors: Arc::clone(&self.errors),
        }
    }
}

/// Per-stage information available when wrapping a sink.
#[derive(Debug, Clone)]
pub struct SinkContext {
    /// Flags known at the stage's input.
    pub input: StreamFlags,
    /// Flags known at the stage's output.
    pub output: StreamFlags,
    /// Error slot of the running evaluation.
    pub errors: Arc<ErrorSlot>,
}

// ============================================================================
// Stage Operations
// ============================================================================

/// Sink decorator contributed by one intermediate stage.
pub trait StageOp<In, Out>: Send + Sync {
    /// Wrap `downstream` in a sink applying this stage's transformation.
    fn wrap_sink<'a>(
        &'a self,
        ctx: &SinkContext,
        downstream: Box<dyn Sink<Out> + 'a>,
    ) -> Box<dyn Sink<In> + 'a>;

    /// Whether this stage can record an element failure, in which case the
    /// source loop polls for cancellation before every element.
    fn may_fail(&self) -> bool {
        false
    }
}

/// A stage whose output may depend on the whole upstream sequence.
pub trait StatefulOp<T: Send + 'static>: StageOp<T, T> {
    /// Materialize the stage's output from `upstream` in parallel.
    fn evaluate_parallel(
        &self,
        upstream: Box<dyn Partition<T>>,
        ctx: &SinkContext,
        plan: &EvalPlan,
    ) -> Node<T>;

    /// Replace `upstream` with a partition of this stage's output, without
    /// full materialization where possible.
    fn evaluate_parallel_lazy(
        &self,
        upstream: Box<dyn Partition<T>>,
        ctx: &SinkContext,
        plan: &EvalPlan,
    ) -> Box<dyn Partition<T>> {
        let node = self.evaluate_parallel(upstream, ctx, plan);
        Box::new(SourcePartition::from_node(node, ctx.output))
    }
}

// ============================================================================
// Partitions
// ============================================================================

/// A splittable, drivable piece of a stage chain.
pub trait Partition<T>: Send {
    /// Split off a prefix of the remaining elements.
    fn try_split(&mut self) -> Option<Box<dyn Partition<T>>>;

    /// Estimated number of source elements remaining.
    fn estimated_size(&self) -> Option<u64>;

    /// Exact number of output elements, when known without traversal.
    fn exact_size(&self) -> Option<u64>;

    /// Push every element into `sink` following the sink lifecycle.
    fn drive(self: Box<Self>, sink: &mut dyn Sink<T>, short_circuit: bool);
}

/// Partition reading straight from a cursor.
pub struct SourcePartition<T> {
    cursor: Box<dyn Cursor<T>>,
}

impl<T> SourcePartition<T> {
    /// Partition over `cursor`.
    pub fn new(cursor: Box<dyn Cursor<T>>) -> Self {
        Self { cursor }
    }
}

impl<T: Send + 'static> SourcePartition<T> {
    /// Partition over a materialized buffer tree reporting `flags`.
    pub fn from_node(node: Node<T>, flags: StreamFlags) -> Self {
        let characteristics = StreamFlags::for_source(flags);
        Self::new(Box::new(node.cursor(characteristics)))
    }
}

impl<T: Send + 'static> Partition<T> for SourcePartition<T> {
    fn try_split(&mut self) -> Option<Box<dyn Partition<T>>> {
        let prefix = self.cursor.try_split()?;
        Some(Box::new(SourcePartition::new(prefix)))
    }

    fn estimated_size(&self) -> Option<u64> {
        self.cursor.estimated_size()
    }

    fn exact_size(&self) -> Option<u64> {
        self.cursor.exact_size()
    }

    fn drive(self: Box<Self>, sink: &mut dyn Sink<T>, short_circuit: bool) {
        let mut cursor = self.cursor;
        sink.begin(cursor.exact_size());
        if short_circuit {
            while !sink.cancellation_requested() && cursor.try_advance(&mut |item| sink.accept(item)) {}
        } else {
            cursor.for_each_remaining(&mut |item| sink.accept(item));
        }
        sink.end();
    }
}

/// Partition applying one stage operation on top of an upstream partition.
pub struct WrappedPartition<In, Out, O: ?Sized> {
    inner: Box<dyn Partition<In>>,
    op: Arc<O>,
    ctx: SinkContext,
    _marker: core::marker::PhantomData<fn() -> Out>,
}

impl<In, Out, O: ?Sized> WrappedPartition<In, Out, O> {
    /// Wrap `inner` with `op`.
    pub fn new(inner: Box<dyn Partition<In>>, op: Arc<O>, ctx: SinkContext) -> Self {
        Self {
            inner,
            op,
            ctx,
            _marker: core::marker::PhantomData,
        }
    }
}

impl<In, Out, O> Partition<Out> for WrappedPartition<In, Out, O>
where
    In: Send + 'static,
    Out: Send + 'static,
    O: StageOp<In, Out> + ?Sized + 'static,
{
    fn try_split(&mut self) -> Option<Box<dyn Partition<Out>>> {
        let prefix = self.inner.try_split()?;
        Some(Box::new(WrappedPartition::<In, Out, O>::new(
            prefix,
            Arc::clone(&self.op),
            self.ctx.clone(),
        )))
    }

    fn estimated_size(&self) -> Option<u64> {
        self.inner.estimated_size()
    }

    fn exact_size(&self) -> Option<u64> {
        if self.ctx.output.is_sized() {
            self.inner.exact_size()
        } else {
            None
        }
    }

    fn drive(self: Box<Self>, sink: &mut dyn Sink<Out>, short_circuit: bool) {
        let WrappedPartition { inner, op, ctx, .. } = *self;
        let poll = short_circuit || ctx.output.is_short_circuit() || op.may_fail();
        let mut wrapped = op.wrap_sink(&ctx, Box::new(sink));
        inner.drive(&mut *wrapped, poll);
    }
}

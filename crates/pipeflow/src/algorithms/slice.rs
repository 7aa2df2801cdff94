//! Skip and limit.
//!
//! ## Purpose
//!
//! [`SliceOp`] drops the first `skip` elements and passes at most `limit` of
//! the rest. A limit makes the chain short-circuiting.
//!
//! ## Design notes
//!
//! * **Sequential**: A counting sink that requests cancellation once the limit
//!   is reached.
//! * **Parallel, ordered and sized**: Collect the upstream in parallel, then
//!   slice the materialized buffer.
//! * **Parallel, ordered, unsized**: Drive the upstream sequentially with
//!   short-circuiting, since positions are unknown until traversal.
//! * **Parallel, unordered**: A lazy partition whose splits share atomic
//!   skip and limit permits; which elements survive is unspecified.
//!
//! ## Invariants
//!
//! * Exactly `min(limit, max(n - skip, 0))` elements pass for an input of `n`.

// External dependencies
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition, SinkContext, SourcePartition, StageOp, StatefulOp};
use crate::engine::terminal::TerminalOp;
use crate::evaluation::collect::{collect_node, CollectOp};
use crate::primitives::flags::{FlagDelta, StreamFlags};
use crate::primitives::node::Node;
use crate::primitives::sink::{Sink, TerminalSink, VecSink};

// ============================================================================
// Slice Operation
// ============================================================================

/// Skip `skip` elements, then pass at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceOp {
    skip: u64,
    limit: Option<u64>,
}

impl SliceOp {
    /// Slice skipping `skip` elements and passing at most `limit`.
    pub fn new(skip: u64, limit: Option<u64>) -> Self {
        Self { skip, limit }
    }

    /// Flag delta of this slice.
    pub fn flag_delta(&self) -> FlagDelta {
        if self.limit.is_some() {
            FlagDelta::new(StreamFlags::SHORT_CIRCUIT, StreamFlags::SIZED)
        } else {
            FlagDelta::clearing(StreamFlags::SIZED)
        }
    }

    fn output_size(&self, size: u64) -> u64 {
        let rest = size.saturating_sub(self.skip);
        self.limit.map_or(rest, |limit| rest.min(limit))
    }

    fn slice_node<T>(&self, node: Node<T>) -> Node<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        Node::from(node.flatten().into_iter().skip(skip).take(take).collect::<Vec<_>>())
    }
}

struct SliceSink<'a, T> {
    skip: u64,
    remaining: u64,
    op: &'a SliceOp,
    downstream: Box<dyn Sink<T> + 'a>,
}

impl<T> Sink<T> for SliceSink<'_, T> {
    fn begin(&mut self, size: Option<u64>) {
        self.downstream.begin(size.map(|n| self.op.output_size(n)));
    }

    #[inline]
    fn accept(&mut self, item: T) {
        if self.skip > 0 {
            self.skip -= 1;
        } else if self.remaining > 0 {
            self.remaining -= 1;
            self.downstream.accept(item);
        }
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.remaining == 0 || self.downstream.cancellation_requested()
    }
}

impl<T: 'static> StageOp<T, T> for SliceOp {
    fn wrap_sink<'a>(&'a self, _ctx: &SinkContext, downstream: Box<dyn Sink<T> + 'a>) -> Box<dyn Sink<T> + 'a> {
        Box::new(SliceSink {
            skip: self.skip,
            remaining: self.limit.unwrap_or(u64::MAX),
            op: self,
            downstream,
        })
    }
}

impl<T: Send + 'static> StatefulOp<T> for SliceOp {
    fn evaluate_parallel(&self, upstream: Box<dyn Partition<T>>, ctx: &SinkContext, plan: &EvalPlan) -> Node<T> {
        if ctx.input.is_ordered() {
            if ctx.input.is_sized() {
                log::debug!("slice: parallel collect then slice");
                return self.slice_node(collect_node(upstream, ctx.input, plan));
            }
            log::debug!("slice: sequential short-circuiting drive of unsized ordered input");
            let mut collector = VecSink::new();
            {
                let mut sink = StageOp::<T, T>::wrap_sink(self, ctx, Box::new(&mut collector));
                upstream.drive(&mut *sink, true);
            }
            return Node::from(collector.finish());
        }
        log::debug!("slice: unordered permits");
        let lazy = self.evaluate_parallel_lazy(upstream, ctx, plan);
        CollectOp.evaluate_parallel(lazy, ctx.output, plan)
    }

    fn evaluate_parallel_lazy(
        &self,
        upstream: Box<dyn Partition<T>>,
        ctx: &SinkContext,
        plan: &EvalPlan,
    ) -> Box<dyn Partition<T>> {
        if ctx.input.is_ordered() {
            let node = self.evaluate_parallel(upstream, ctx, plan);
            return Box::new(SourcePartition::from_node(node, ctx.output));
        }
        Box::new(PermitPartition {
            inner: upstream,
            permits: Arc::new(SlicePermits::new(self.skip, self.limit)),
        })
    }
}

// ============================================================================
// Unordered Slicing
// ============================================================================

/// Atomic skip and limit budgets shared by the splits of one partition.
#[derive(Debug)]
pub struct SlicePermits {
    skip: AtomicU64,
    remaining: AtomicU64,
    limited: bool,
}

impl SlicePermits {
    /// Budgets for skipping `skip` and passing at most `limit` elements.
    pub fn new(skip: u64, limit: Option<u64>) -> Self {
        Self {
            skip: AtomicU64::new(skip),
            remaining: AtomicU64::new(limit.unwrap_or(u64::MAX)),
            limited: limit.is_some(),
        }
    }

    /// Claim the right to pass one element.
    pub fn admit(&self) -> bool {
        let decrement = |n: u64| n.checked_sub(1);
        if self.skip.load(Ordering::Acquire) > 0
            && self
                .skip
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, decrement)
                .is_ok()
        {
            return false;
        }
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, decrement)
            .is_ok()
    }

    /// Whether the limit budget is spent.
    pub fn exhausted(&self) -> bool {
        self.remaining.load(Ordering::Acquire) == 0
    }
}

struct PermitPartition<T> {
    inner: Box<dyn Partition<T>>,
    permits: Arc<SlicePermits>,
}

struct PermitSink<'a, T> {
    permits: &'a SlicePermits,
    downstream: &'a mut dyn Sink<T>,
}

impl<T> Sink<T> for PermitSink<'_, T> {
    fn begin(&mut self, _size: Option<u64>) {
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        if self.permits.admit() {
            self.downstream.accept(item);
        }
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.permits.exhausted() || self.downstream.cancellation_requested()
    }
}

impl<T: Send + 'static> Partition<T> for PermitPartition<T> {
    fn try_split(&mut self) -> Option<Box<dyn Partition<T>>> {
        if self.permits.exhausted() {
            return None;
        }
        let prefix = self.inner.try_split()?;
        Some(Box::new(PermitPartition {
            inner: prefix,
            permits: Arc::clone(&self.permits),
        }))
    }

    fn estimated_size(&self) -> Option<u64> {
        self.inner.estimated_size()
    }

    fn exact_size(&self) -> Option<u64> {
        None
    }

    fn drive(self: Box<Self>, sink: &mut dyn Sink<T>, short_circuit: bool) {
        let PermitPartition { inner, permits } = *self;
        let mut gate = PermitSink {
            permits: &permits,
            downstream: sink,
        };
        inner.drive(&mut gate, short_circuit || permits.limited);
    }
}

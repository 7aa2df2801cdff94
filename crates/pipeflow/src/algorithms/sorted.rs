//! Sorting.
//!
//! [`SortedOp`] buffers every element, sorts stably with its comparator, and
//! replays the sorted buffer downstream, stopping early if the downstream
//! cancels. In parallel the upstream is collected into a buffer tree and
//! sorted with a rayon parallel stable sort.
//!
//! A natural-order sort sets SORTED and ORDERED and is elided entirely when
//! the input is already SORTED. A custom-comparator sort sets ORDERED and
//! clears SORTED, since SORTED always means natural order.

// External dependencies
use core::cmp::Ordering;
use core::mem;
use rayon::slice::ParallelSliceMut;

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition, SinkContext, StageOp, StatefulOp};
use crate::evaluation::collect::collect_node;
use crate::primitives::flags::{FlagDelta, StreamFlags};
use crate::primitives::node::Node;
use crate::primitives::sink::{presize, Sink};

/// Delta of a natural-order sort.
pub const NATURAL_SORT_FLAGS: FlagDelta = FlagDelta::setting(StreamFlags::SORTED.union(StreamFlags::ORDERED));

/// Delta of a comparator sort.
pub const COMPARATOR_SORT_FLAGS: FlagDelta = FlagDelta::new(StreamFlags::ORDERED, StreamFlags::SORTED);

/// Stable sort with a comparator.
pub struct SortedOp<C> {
    cmp: C,
}

impl<C> SortedOp<C> {
    /// Sort using `cmp`.
    pub fn new(cmp: C) -> Self {
        Self { cmp }
    }
}

struct SortedSink<'a, T, C> {
    buffer: Vec<T>,
    cmp: &'a C,
    downstream: Box<dyn Sink<T> + 'a>,
}

impl<T, C: Fn(&T, &T) -> Ordering> Sink<T> for SortedSink<'_, T, C> {
    fn begin(&mut self, size: Option<u64>) {
        if let Some(n) = size {
            self.buffer.reserve(presize(n));
        }
    }

    #[inline]
    fn accept(&mut self, item: T) {
        self.buffer.push(item);
    }

    fn end(&mut self) {
        let mut items = mem::take(&mut self.buffer);
        items.sort_by(|a, b| (self.cmp)(a, b));
        self.downstream.begin(Some(items.len() as u64));
        for item in items {
            if self.downstream.cancellation_requested() {
                break;
            }
            self.downstream.accept(item);
        }
        self.downstream.end();
    }
}

impl<T, C> StageOp<T, T> for SortedOp<C>
where
    T: 'static,
    C: Fn(&T, &T) -> Ordering + Send + Sync,
{
    fn wrap_sink<'a>(&'a self, _ctx: &SinkContext, downstream: Box<dyn Sink<T> + 'a>) -> Box<dyn Sink<T> + 'a> {
        Box::new(SortedSink {
            buffer: Vec::new(),
            cmp: &self.cmp,
            downstream,
        })
    }
}

impl<T, C> StatefulOp<T> for SortedOp<C>
where
    T: Send + 'static,
    C: Fn(&T, &T) -> Ordering + Send + Sync,
{
    fn evaluate_parallel(&self, upstream: Box<dyn Partition<T>>, ctx: &SinkContext, plan: &EvalPlan) -> Node<T> {
        let mut items = collect_node(upstream, ctx.input, plan).flatten();
        log::debug!("sorting {} elements in parallel", items.len());
        items.par_sort_by(|a, b| (self.cmp)(a, b));
        Node::from(items)
    }
}

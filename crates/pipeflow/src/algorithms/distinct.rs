//! Deduplication.
//!
//! ## Purpose
//!
//! [`DistinctOp`] passes the first occurrence of every value and drops later
//! duplicates. Absent values (see [`Nullable`]) are legal and deduplicated
//! like any other value.
//!
//! ## Design notes
//!
//! The strategy is chosen from the input flags:
//!
//! * **Already DISTINCT**: The stage is a pass-through.
//! * **SORTED**: Equal values are adjacent, so only the last emitted value is
//!   remembered.
//! * **Otherwise**: A hash set of every value seen so far.
//!
//! In parallel an ORDERED input is reduced through insertion-ordered sets
//! merged left to right, which keeps the first occurrence in encounter order.
//! An unordered input shares one concurrent set across all tasks; which of
//! several equal values survives is unspecified.
//!
//! ## Invariants
//!
//! * Output never contains two equal values.
//! * On ORDERED input the output keeps encounter order of first occurrences.

// External dependencies
use core::hash::Hash;
use hashbrown::HashSet;
use std::sync::Arc;

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition, SinkContext, SourcePartition, StageOp, StatefulOp};
use crate::engine::terminal::TerminalOp;
use crate::evaluation::collect::collect_node;
use crate::evaluation::for_each::ForEachOp;
use crate::evaluation::reduce::ReduceOp;
use crate::primitives::concurrent::{ConcurrentSet, OrderedSet};
use crate::primitives::flags::{FlagDelta, StreamFlags};
use crate::primitives::node::Node;
use crate::primitives::nullable::Nullable;
use crate::primitives::sink::Sink;

/// Delta of a distinct stage.
pub const DISTINCT_FLAGS: FlagDelta = FlagDelta::new(StreamFlags::DISTINCT, StreamFlags::SIZED);

/// Drop repeated values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctOp;

// ============================================================================
// Sequential Sinks
// ============================================================================

struct SortedDistinctSink<'a, T> {
    last: Option<T>,
    seen_null: bool,
    downstream: Box<dyn Sink<T> + 'a>,
}

impl<T: PartialEq + Clone + Nullable> Sink<T> for SortedDistinctSink<'_, T> {
    fn begin(&mut self, _size: Option<u64>) {
        self.last = None;
        self.seen_null = false;
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        if item.is_null() {
            if !self.seen_null {
                self.seen_null = true;
                self.last = None;
                self.downstream.accept(item);
            }
        } else if self.last.as_ref() != Some(&item) {
            self.last = Some(item.clone());
            self.downstream.accept(item);
        }
    }

    fn end(&mut self) {
        self.last = None;
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

struct HashDistinctSink<'a, T> {
    seen: HashSet<T>,
    seen_null: bool,
    downstream: Box<dyn Sink<T> + 'a>,
}

impl<T: Hash + Eq + Clone + Nullable> Sink<T> for HashDistinctSink<'_, T> {
    fn begin(&mut self, _size: Option<u64>) {
        self.seen = HashSet::new();
        self.seen_null = false;
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        let fresh = if item.is_null() {
            !core::mem::replace(&mut self.seen_null, true)
        } else {
            self.seen.insert(item.clone())
        };
        if fresh {
            self.downstream.accept(item);
        }
    }

    fn end(&mut self) {
        self.seen = HashSet::new();
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

impl<T> StageOp<T, T> for DistinctOp
where
    T: Hash + Eq + Clone + Nullable + Send + Sync + 'static,
{
    fn wrap_sink<'a>(&'a self, ctx: &SinkContext, downstream: Box<dyn Sink<T> + 'a>) -> Box<dyn Sink<T> + 'a> {
        if ctx.input.is_distinct() {
            downstream
        } else if ctx.input.is_sorted() {
            Box::new(SortedDistinctSink {
                last: None,
                seen_null: false,
                downstream,
            })
        } else {
            Box::new(HashDistinctSink {
                seen: HashSet::new(),
                seen_null: false,
                downstream,
            })
        }
    }
}

// ============================================================================
// Parallel Evaluation
// ============================================================================

impl<T> StatefulOp<T> for DistinctOp
where
    T: Hash + Eq + Clone + Nullable + Send + Sync + 'static,
{
    fn evaluate_parallel(&self, upstream: Box<dyn Partition<T>>, ctx: &SinkContext, plan: &EvalPlan) -> Node<T> {
        if ctx.input.is_distinct() {
            return collect_node(upstream, ctx.input, plan);
        }
        if ctx.input.is_ordered() {
            log::debug!("distinct: ordered reduction of insertion-ordered sets");
            let reduce = ReduceOp::new(
                OrderedSet::new,
                |set: &mut OrderedSet<T>, item| {
                    set.insert(item);
                },
                |set: &mut OrderedSet<T>, later| set.merge(later),
            );
            return Node::from(reduce.evaluate_parallel(upstream, ctx.input, plan).into_vec());
        }
        log::debug!("distinct: shared concurrent set");
        let set = ConcurrentSet::new();
        ForEachOp::unordered(|item: T| {
            set.insert(item);
        })
        .evaluate_parallel(upstream, ctx.input, plan);
        Node::from(set.into_vec())
    }

    fn evaluate_parallel_lazy(
        &self,
        upstream: Box<dyn Partition<T>>,
        ctx: &SinkContext,
        plan: &EvalPlan,
    ) -> Box<dyn Partition<T>> {
        if ctx.input.is_distinct() {
            return upstream;
        }
        if ctx.input.is_ordered() {
            let node = self.evaluate_parallel(upstream, ctx, plan);
            return Box::new(SourcePartition::from_node(node, ctx.output));
        }
        Box::new(DistinctPartition {
            inner: upstream,
            seen: Arc::new(ConcurrentSet::new()),
        })
    }
}

/// Partition filtering out values already seen by any of its splits.
struct DistinctPartition<T> {
    inner: Box<dyn Partition<T>>,
    seen: Arc<ConcurrentSet<T>>,
}

struct FirstSightingSink<'a, T> {
    seen: &'a ConcurrentSet<T>,
    downstream: &'a mut dyn Sink<T>,
}

impl<T: Hash + Eq + Clone + Nullable> Sink<T> for FirstSightingSink<'_, T> {
    fn begin(&mut self, _size: Option<u64>) {
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        if self.seen.first_sighting(&item) {
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

impl<T> Partition<T> for DistinctPartition<T>
where
    T: Hash + Eq + Clone + Nullable + Send + Sync + 'static,
{
    fn try_split(&mut self) -> Option<Box<dyn Partition<T>>> {
        let prefix = self.inner.try_split()?;
        Some(Box::new(DistinctPartition {
            inner: prefix,
            seen: Arc::clone(&self.seen),
        }))
    }

    fn estimated_size(&self) -> Option<u64> {
        self.inner.estimated_size()
    }

    fn exact_size(&self) -> Option<u64> {
        None
    }

    fn drive(self: Box<Self>, sink: &mut dyn Sink<T>, short_circuit: bool) {
        let DistinctPartition { inner, seen } = *self;
        let mut filter = FirstSightingSink { seen: &seen, downstream: sink };
        inner.drive(&mut filter, short_circuit);
    }
}

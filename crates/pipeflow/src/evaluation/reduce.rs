//! Reduction terminals.
//!
//! ## Purpose
//!
//! [`ReduceOp`] folds elements into a mutable accumulator: sequentially with
//! one accumulator, or in parallel with one accumulator per leaf merged
//! left-to-right. [`CountOp`] counts elements, answering from the exact size
//! when the chain is SIZED.
//!
//! ## Key concepts
//!
//! * **Supplier / accumulator / combiner**: The mutable-reduction triple. The
//!   combiner folds a later partial result into an earlier one.
//! * **Order**: Parallel combination preserves encounter order, so a
//!   non-commutative but associative combiner is still correct.

// External dependencies
use std::sync::Arc;

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition};
use crate::engine::terminal::TerminalOp;
use crate::evaluation::task::{TaskNode, TaskTree};
use crate::primitives::flags::StreamFlags;
use crate::primitives::sink::{Sink, TerminalSink};

// ============================================================================
// Mutable Reduction
// ============================================================================

type Supplier<A> = Box<dyn Fn() -> A + Send + Sync>;
type Accumulator<A, T> = Box<dyn Fn(&mut A, T) + Send + Sync>;
type Combiner<A> = Box<dyn Fn(&mut A, A) + Send + Sync>;

/// Terminal folding elements into an accumulator of type `A`.
pub struct ReduceOp<T, A> {
    supplier: Supplier<A>,
    accumulator: Accumulator<A, T>,
    combiner: Combiner<A>,
}

impl<T, A> ReduceOp<T, A> {
    /// Reduction from its supplier, accumulator and combiner.
    pub fn new<S, F, C>(supplier: S, accumulator: F, combiner: C) -> Self
    where
        S: Fn() -> A + Send + Sync + 'static,
        F: Fn(&mut A, T) + Send + Sync + 'static,
        C: Fn(&mut A, A) + Send + Sync + 'static,
    {
        Self {
            supplier: Box::new(supplier),
            accumulator: Box::new(accumulator),
            combiner: Box::new(combiner),
        }
    }

    fn fold(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags) -> A {
        let mut sink = ReduceSink {
            state: (self.supplier)(),
            accumulator: &*self.accumulator,
        };
        partition.drive(&mut sink, flags.is_short_circuit());
        sink.finish()
    }
}

impl<T: Send + 'static> ReduceOp<T, Option<T>> {
    /// Reduction with a binary operator and no identity. Empty input yields `None`.
    pub fn optional<F>(op: F) -> Self
    where
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let op = Arc::new(op);
        let merge = Arc::clone(&op);
        Self::new(
            || None,
            move |acc: &mut Option<T>, item| {
                *acc = Some(match acc.take() {
                    Some(prev) => op(prev, item),
                    None => item,
                });
            },
            move |acc: &mut Option<T>, later| {
                *acc = match (acc.take(), later) {
                    (Some(a), Some(b)) => Some(merge(a, b)),
                    (a, b) => a.or(b),
                };
            },
        )
    }

    /// Reduction starting every partial result from `identity`.
    pub fn with_identity<F>(identity: T, op: F) -> Self
    where
        T: Clone + Sync,
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let op = Arc::new(op);
        let merge = Arc::clone(&op);
        Self::new(
            move || Some(identity.clone()),
            move |acc: &mut Option<T>, item| {
                *acc = acc.take().map(|prev| op(prev, item));
            },
            move |acc: &mut Option<T>, later| {
                *acc = match (acc.take(), later) {
                    (Some(a), Some(b)) => Some(merge(a, b)),
                    (a, b) => a.or(b),
                };
            },
        )
    }
}

struct ReduceSink<'a, T, A> {
    state: A,
    accumulator: &'a (dyn Fn(&mut A, T) + Send + Sync),
}

impl<T, A> Sink<T> for ReduceSink<'_, T, A> {
    #[inline]
    fn accept(&mut self, item: T) {
        (self.accumulator)(&mut self.state, item)
    }
}

impl<T, A> TerminalSink<T> for ReduceSink<'_, T, A> {
    type Output = A;

    fn finish(self) -> A {
        self.state
    }
}

impl<T: Send + 'static, A: Send> TerminalOp<T> for ReduceOp<T, A> {
    type Output = A;

    fn evaluate_sequential(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, _plan: &EvalPlan) -> A {
        self.fold(partition, flags)
    }

    fn evaluate_parallel(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, plan: &EvalPlan) -> A {
        let tree = TaskTree::new(plan, partition.estimated_size());
        tree.run(
            partition,
            |leaf, _: &Arc<TaskNode>| self.fold(leaf, flags),
            |mut left, right| {
                (self.combiner)(&mut left, right);
                left
            },
        )
    }
}

// ============================================================================
// Count
// ============================================================================

/// Terminal counting elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountOp;

struct CountSink(u64);

impl<T> Sink<T> for CountSink {
    #[inline]
    fn accept(&mut self, _item: T) {
        self.0 += 1;
    }
}

impl CountOp {
    fn count<T: Send + 'static>(partition: Box<dyn Partition<T>>, flags: StreamFlags) -> u64 {
        let mut sink = CountSink(0);
        partition.drive(&mut sink, flags.is_short_circuit());
        sink.0
    }
}

impl<T: Send + 'static> TerminalOp<T> for CountOp {
    type Output = u64;

    fn evaluate_sequential(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, _plan: &EvalPlan) -> u64 {
        if flags.is_sized() {
            if let Some(size) = partition.exact_size() {
                return size;
            }
        }
        Self::count(partition, flags)
    }

    fn evaluate_parallel(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, plan: &EvalPlan) -> u64 {
        if flags.is_sized() {
            if let Some(size) = partition.exact_size() {
                return size;
            }
        }
        let tree = TaskTree::new(plan, partition.estimated_size());
        tree.run(
            partition,
            |leaf, _: &Arc<TaskNode>| Self::count(leaf, flags),
            |left, right| left + right,
        )
    }
}

//! Find-first and find-any terminals.
//!
//! ## Purpose
//!
//! [`FindOp`] returns one element of the chain, stopping as soon as it has it.
//!
//! ## Design notes
//!
//! * **Ordered find-first**: When the chain is ORDERED, leaves combine with a
//!   left bias, and a leaf that finds an element cancels only the tasks later
//!   in encounter order. Earlier tasks keep running because they may still
//!   produce the true first element.
//! * **Unordered find**: The first leaf to find an element claims a shared
//!   slot and cancels the whole task tree.

// External dependencies
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition};
use crate::engine::terminal::TerminalOp;
use crate::evaluation::task::{TaskNode, TaskTree};
use crate::primitives::flags::{FlagDelta, StreamFlags};
use crate::primitives::sink::{Sink, TerminalSink};

/// Terminal returning the first (or any) element.
#[derive(Debug, Clone, Copy)]
pub struct FindOp {
    first: bool,
}

impl FindOp {
    /// Find the first element in encounter order.
    pub const fn first() -> Self {
        Self { first: true }
    }

    /// Find any element.
    pub const fn any() -> Self {
        Self { first: false }
    }
}

struct FindSink<'a, T> {
    found: Option<T>,
    stop: &'a (dyn Fn() -> bool + Sync),
}

impl<T> Sink<T> for FindSink<'_, T> {
    fn accept(&mut self, item: T) {
        if self.found.is_none() {
            self.found = Some(item);
        }
    }

    fn cancellation_requested(&self) -> bool {
        self.found.is_some() || (self.stop)()
    }
}

impl<T> TerminalSink<T> for FindSink<'_, T> {
    type Output = Option<T>;

    fn finish(self) -> Option<T> {
        self.found
    }
}

fn find_in<T: Send + 'static>(
    partition: Box<dyn Partition<T>>,
    flags: StreamFlags,
    stop: &(dyn Fn() -> bool + Sync),
) -> Option<T> {
    let mut sink = FindSink { found: None, stop };
    partition.drive(&mut sink, flags.is_short_circuit());
    sink.finish()
}

impl<T: Send + 'static> TerminalOp<T> for FindOp {
    type Output = Option<T>;

    fn op_flags(&self) -> FlagDelta {
        if self.first {
            FlagDelta::setting(StreamFlags::SHORT_CIRCUIT)
        } else {
            FlagDelta::new(StreamFlags::SHORT_CIRCUIT, StreamFlags::ORDERED)
        }
    }

    fn evaluate_sequential(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, _plan: &EvalPlan) -> Option<T> {
        find_in(partition, flags, &|| false)
    }

    fn evaluate_parallel(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, plan: &EvalPlan) -> Option<T> {
        let tree = TaskTree::new(plan, partition.estimated_size());
        if self.first && flags.is_ordered() {
            return tree.run(
                partition,
                |leaf, node: &Arc<TaskNode>| {
                    if node.is_canceled() {
                        return None;
                    }
                    let found = find_in(leaf, flags, &|| node.is_canceled());
                    if found.is_some() {
                        node.cancel_later_nodes();
                    }
                    found
                },
                |left, right| left.or(right),
            );
        }

        let claimed = AtomicBool::new(false);
        let slot: Mutex<Option<T>> = Mutex::new(None);
        tree.run(
            partition,
            |leaf, node: &Arc<TaskNode>| {
                if claimed.load(Ordering::Acquire) || node.is_canceled() {
                    return;
                }
                if let Some(item) = find_in(leaf, flags, &|| claimed.load(Ordering::Acquire)) {
                    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    if slot.is_none() {
                        *slot = Some(item);
                        claimed.store(true, Ordering::Release);
                    }
                    node.cancel_all();
                }
            },
            |(), ()| (),
        );
        slot.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

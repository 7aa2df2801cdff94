//! For-each terminals.
//!
//! [`ForEachOp`] hands every element to an action. The unordered variant lets
//! parallel leaves call the action concurrently in any order. The ordered
//! variant, when the chain is ORDERED, collects a buffer tree in parallel
//! first and then runs the action in encounter order on the calling thread.

// External dependencies
use std::sync::Arc;

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition};
use crate::engine::terminal::TerminalOp;
use crate::evaluation::collect::CollectOp;
use crate::evaluation::task::{TaskNode, TaskTree};
use crate::primitives::flags::{FlagDelta, StreamFlags};
use crate::primitives::sink::FnSink;

/// Terminal applying an action to every element.
pub struct ForEachOp<F> {
    action: F,
    ordered: bool,
}

impl<F> ForEachOp<F> {
    /// Action invoked in any order.
    pub fn unordered(action: F) -> Self {
        Self {
            action,
            ordered: false,
        }
    }

    /// Action invoked in encounter order when the chain is ORDERED.
    pub fn ordered(action: F) -> Self {
        Self {
            action,
            ordered: true,
        }
    }
}

impl<T, F> TerminalOp<T> for ForEachOp<F>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync,
{
    type Output = ();

    fn op_flags(&self) -> FlagDelta {
        if self.ordered {
            FlagDelta::NONE
        } else {
            FlagDelta::clearing(StreamFlags::ORDERED)
        }
    }

    fn evaluate_sequential(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, _plan: &EvalPlan) {
        partition.drive(&mut FnSink(|item: T| (self.action)(item)), flags.is_short_circuit());
    }

    fn evaluate_parallel(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, plan: &EvalPlan) {
        if self.ordered && flags.is_ordered() {
            log::debug!("ordered for-each: collecting before in-order traversal");
            let node = CollectOp.evaluate_parallel(partition, flags, plan);
            node.for_each(|item| (self.action)(item));
            return;
        }
        let tree = TaskTree::new(plan, partition.estimated_size());
        tree.run(
            partition,
            |leaf, _: &Arc<TaskNode>| {
                leaf.drive(&mut FnSink(|item: T| (self.action)(item)), flags.is_short_circuit());
            },
            |(), ()| (),
        );
    }
}

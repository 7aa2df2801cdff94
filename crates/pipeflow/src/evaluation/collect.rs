//! Collection into buffer trees.
//!
//! [`CollectOp`] materializes a chain into a [`Node`]. In parallel each leaf
//! fills its own vector and siblings are concatenated without copying, so the
//! tree preserves encounter order. Stateful stages use [`collect_node`] as
//! their materialization barrier.

// External dependencies
use std::sync::Arc;

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition};
use crate::engine::terminal::TerminalOp;
use crate::evaluation::task::{TaskNode, TaskTree};
use crate::primitives::flags::StreamFlags;
use crate::primitives::node::Node;
use crate::primitives::sink::{TerminalSink, VecSink};

/// Terminal materializing every element into a buffer tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOp;

fn collect_leaf<T: Send + 'static>(partition: Box<dyn Partition<T>>, flags: StreamFlags) -> Node<T> {
    let mut sink = VecSink::new();
    partition.drive(&mut sink, flags.is_short_circuit());
    Node::from(sink.finish())
}

impl<T: Send + 'static> TerminalOp<T> for CollectOp {
    type Output = Node<T>;

    fn evaluate_sequential(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, _plan: &EvalPlan) -> Node<T> {
        collect_leaf(partition, flags)
    }

    fn evaluate_parallel(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, plan: &EvalPlan) -> Node<T> {
        let tree = TaskTree::new(plan, partition.estimated_size());
        tree.run(
            partition,
            |leaf, _: &Arc<TaskNode>| collect_leaf(leaf, flags),
            Node::conc,
        )
    }
}

/// Materialize `partition` following the plan's execution mode.
pub fn collect_node<T: Send + 'static>(
    partition: Box<dyn Partition<T>>,
    flags: StreamFlags,
    plan: &EvalPlan,
) -> Node<T> {
    if plan.is_parallel() {
        CollectOp.evaluate_parallel(partition, flags, plan)
    } else {
        CollectOp.evaluate_sequential(partition, flags, plan)
    }
}

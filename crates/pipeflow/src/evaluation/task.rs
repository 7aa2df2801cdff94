//! Fork/join task tree for parallel evaluation.
//!
//! ## Purpose
//!
//! [`TaskTree`] recursively splits a partition into a balanced binary tree of
//! tasks, evaluates each leaf sequentially, and combines sibling results on
//! the way back up. [`TaskNode`] gives short-circuiting terminals a handle for
//! cancelling the rest of the tree, or only the part later in encounter order.
//!
//! ## Design notes
//!
//! * **Prefix left**: The prefix returned by a split becomes the left child,
//!   so left-to-right combination preserves encounter order.
//! * **Leaf target**: Splitting stops once the estimated size falls to the
//!   configured leaf target, at the depth bound, or once the evaluation has
//!   failed or the node was cancelled.
//! * **Work stealing**: Children run under `rayon::join`.
//!
//! ## Invariants
//!
//! * Every element of the partition is driven by exactly one leaf.
//! * `combine(left, right)` always receives the earlier result first.

// External dependencies
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition};

// ============================================================================
// Task Nodes
// ============================================================================

/// Cancellation state of one node of the task tree.
#[derive(Debug, Default)]
pub struct TaskNode {
    canceled: AtomicBool,
    parent: Option<Arc<TaskNode>>,
    later_sibling: Option<Arc<TaskNode>>,
}

impl TaskNode {
    /// Root node of a new tree.
    pub fn root() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create the left and right children of `parent`.
    pub fn children(parent: &Arc<Self>) -> (Arc<Self>, Arc<Self>) {
        let right = Arc::new(Self {
            canceled: AtomicBool::new(false),
            parent: Some(Arc::clone(parent)),
            later_sibling: None,
        });
        let left = Arc::new(Self {
            canceled: AtomicBool::new(false),
            parent: Some(Arc::clone(parent)),
            later_sibling: Some(Arc::clone(&right)),
        });
        (left, right)
    }

    /// Cancel this node and, transitively, its descendants.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    /// Whether this node or any ancestor was cancelled.
    pub fn is_canceled(&self) -> bool {
        let mut node = Some(self);
        while let Some(current) = node {
            if current.canceled.load(Ordering::Acquire) {
                return true;
            }
            node = current.parent.as_deref();
        }
        false
    }

    /// Cancel the whole tree this node belongs to.
    pub fn cancel_all(&self) {
        let mut node = self;
        while let Some(parent) = node.parent.as_deref() {
            node = parent;
        }
        node.cancel();
    }

    /// Cancel every node later than this one in encounter order.
    pub fn cancel_later_nodes(&self) {
        let mut node = Some(self);
        while let Some(current) = node {
            if let Some(later) = &current.later_sibling {
                later.cancel();
            }
            node = current.parent.as_deref();
        }
    }
}

// ============================================================================
// Task Tree
// ============================================================================

/// Recursive decomposition of one partition.
pub struct TaskTree<'p> {
    plan: &'p EvalPlan,
    leaf_target: u64,
    max_depth: usize,
}

impl<'p> TaskTree<'p> {
    /// Tree sized for a source of `estimated_size` elements.
    pub fn new(plan: &'p EvalPlan, estimated_size: Option<u64>) -> Self {
        let config = plan.config();
        Self {
            plan,
            leaf_target: config.leaf_target(estimated_size),
            max_depth: config.max_split_depth,
        }
    }

    /// Leaf size below which partitions are not split.
    pub fn leaf_target(&self) -> u64 {
        self.leaf_target
    }

    /// Evaluate `partition`, calling `leaf` on each leaf and `combine` on each
    /// pair of sibling results.
    pub fn run<T, R, L, C>(&self, partition: Box<dyn Partition<T>>, leaf: L, combine: C) -> R
    where
        R: Send,
        L: Fn(Box<dyn Partition<T>>, &Arc<TaskNode>) -> R + Sync,
        C: Fn(R, R) -> R + Sync,
    {
        self.fork(partition, TaskNode::root(), 0, &leaf, &combine)
    }

    fn fork<T, R, L, C>(
        &self,
        mut partition: Box<dyn Partition<T>>,
        node: Arc<TaskNode>,
        depth: usize,
        leaf: &L,
        combine: &C,
    ) -> R
    where
        R: Send,
        L: Fn(Box<dyn Partition<T>>, &Arc<TaskNode>) -> R + Sync,
        C: Fn(R, R) -> R + Sync,
    {
        let large = partition
            .estimated_size()
            .map_or(true, |size| size > self.leaf_target);
        if large && depth < self.max_depth && !node.is_canceled() && !self.plan.errors().is_failed() {
            if let Some(prefix) = partition.try_split() {
                let (left, right) = TaskNode::children(&node);
                let (l, r) = rayon::join(
                    || self.fork(prefix, left, depth + 1, leaf, combine),
                    || self.fork(partition, right, depth + 1, leaf, combine),
                );
                return combine(l, r);
            }
        }
        log::trace!(
            "task leaf at depth {depth} with estimated size {:?}",
            partition.estimated_size()
        );
        leaf(partition, &node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_later_nodes_spares_earlier_ones() {
        let root = TaskNode::root();
        let (left, right) = TaskNode::children(&root);
        let (left_left, left_right) = TaskNode::children(&left);
        left_right.cancel_later_nodes();
        assert!(right.is_canceled());
        assert!(!left_left.is_canceled());
        assert!(!left_right.is_canceled());
        assert!(!root.is_canceled());
    }

    #[test]
    fn test_cancel_all_reaches_every_node() {
        let root = TaskNode::root();
        let (left, right) = TaskNode::children(&root);
        let (left_left, _) = TaskNode::children(&left);
        left_left.cancel_all();
        assert!(root.is_canceled());
        assert!(right.is_canceled());
        assert!(left.is_canceled());
    }
}

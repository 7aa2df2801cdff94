//! Materialized buffer trees.
//!
//! ## Purpose
//!
//! A [`Node`] is an immutable snapshot of elements produced when a stage cannot
//! stream losslessly (sorting, ordered distinct, parallel collection). Parallel
//! tasks each produce a node and internal task nodes concatenate them without
//! copying.
//!
//! ## Invariants
//!
//! * `Conc` never holds an empty child; [`Node::conc`] collapses them.
//! * Traversal order is left subtree, then right subtree.

// External dependencies
use std::collections::VecDeque;

// Internal dependencies
use crate::primitives::cursor::{Cursor, VecCursor};
use crate::primitives::flags::StreamFlags;
use crate::primitives::sink::presize;

// ============================================================================
// Buffer Tree
// ============================================================================

/// Hierarchical, immutable element buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T> {
    /// No elements.
    Empty,
    /// A contiguous run of elements.
    Leaf(Vec<T>),
    /// Concatenation of two non-empty subtrees.
    Conc {
        /// Earlier elements.
        left: Box<Node<T>>,
        /// Later elements.
        right: Box<Node<T>>,
        /// Total number of elements in both subtrees.
        count: u64,
    },
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Node::Empty
    }
}

impl<T> From<Vec<T>> for Node<T> {
    fn from(items: Vec<T>) -> Self {
        if items.is_empty() {
            Node::Empty
        } else {
            Node::Leaf(items)
        }
    }
}

impl<T> Node<T> {
    /// Concatenate `left` before `right`.
    pub fn conc(left: Node<T>, right: Node<T>) -> Node<T> {
        match (left.is_empty(), right.is_empty()) {
            (true, _) => right,
            (_, true) => left,
            _ => {
                let count = left.count() + right.count();
                Node::Conc {
                    left: Box::new(left),
                    right: Box::new(right),
                    count,
                }
            }
        }
    }

    /// Number of elements held.
    pub fn count(&self) -> u64 {
        match self {
            Node::Empty => 0,
            Node::Leaf(items) => items.len() as u64,
            Node::Conc { count, .. } => *count,
        }
    }

    /// Whether the tree holds no elements.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Visit every element in encounter order.
    pub fn for_each(self, mut action: impl FnMut(T)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Empty => {}
                Node::Leaf(items) => items.into_iter().for_each(&mut action),
                Node::Conc { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
    }

    /// Copy the tree out into a single vector.
    pub fn flatten(self) -> Vec<T> {
        match self {
            Node::Empty => Vec::new(),
            Node::Leaf(items) => items,
            conc => {
                let mut out = Vec::with_capacity(presize(conc.count()));
                conc.for_each(|item| out.push(item));
                out
            }
        }
    }

    /// Cursor over the tree reporting `flags` (SIZED is implied).
    pub fn cursor(self, flags: StreamFlags) -> NodeCursor<T> {
        NodeCursor::new(self, flags)
    }
}

// ============================================================================
// Node Cursor
// ============================================================================

/// Cursor traversing a buffer tree, splitting along its structure.
#[derive(Debug)]
pub struct NodeCursor<T> {
    pending: VecDeque<Node<T>>,
    active: std::vec::IntoIter<T>,
    remaining: u64,
    flags: StreamFlags,
}

impl<T> NodeCursor<T> {
    /// Cursor over `node`.
    pub fn new(node: Node<T>, flags: StreamFlags) -> Self {
        let remaining = node.count();
        let mut pending = VecDeque::new();
        pending.push_back(node);
        Self {
            pending,
            active: Vec::new().into_iter(),
            remaining,
            flags: flags | StreamFlags::SIZED,
        }
    }

    /// Move the next leaf into `active`. Returns `false` when none remain.
    fn load_next_leaf(&mut self) -> bool {
        while let Some(node) = self.pending.pop_front() {
            match node {
                Node::Empty => continue,
                Node::Leaf(items) => {
                    self.active = items.into_iter();
                    return true;
                }
                Node::Conc { left, right, .. } => {
                    self.pending.push_front(*right);
                    self.pending.push_front(*left);
                }
            }
        }
        false
    }

    fn split_active(&mut self, take: usize) -> Box<dyn Cursor<T>>
    where
        T: Send + 'static,
    {
        let prefix: Vec<T> = self.active.by_ref().take(take).collect();
        self.remaining -= prefix.len() as u64;
        Box::new(VecCursor::with_flags(prefix, self.flags))
    }
}

impl<T: Send + 'static> Cursor<T> for NodeCursor<T> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        loop {
            if let Some(item) = self.active.next() {
                self.remaining -= 1;
                action(item);
                return true;
            }
            if !self.load_next_leaf() {
                return false;
            }
        }
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        loop {
            for item in self.active.by_ref() {
                action(item);
            }
            if !self.load_next_leaf() {
                break;
            }
        }
        self.remaining = 0;
    }

    fn try_split(&mut self) -> Option<Box<dyn Cursor<T>>> {
        let active_len = self.active.len();
        let pending_len = self.remaining - active_len as u64;
        if active_len > 0 {
            if pending_len > 0 {
                return Some(self.split_active(active_len));
            }
            if active_len < 2 {
                return None;
            }
            return Some(self.split_active(active_len / 2));
        }
        match self.pending.pop_front()? {
            Node::Empty => self.try_split(),
            Node::Leaf(items) => {
                self.active = items.into_iter();
                self.try_split()
            }
            Node::Conc { left, right, .. } => {
                self.pending.push_front(*right);
                self.remaining -= left.count();
                Some(Box::new(NodeCursor::new(*left, self.flags)))
            }
        }
    }

    fn estimated_size(&self) -> Option<u64> {
        Some(self.remaining)
    }

    fn characteristics(&self) -> StreamFlags {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node<i32> {
        Node::conc(
            Node::conc(Node::from(vec![1, 2]), Node::Empty),
            Node::conc(Node::from(vec![3]), Node::from(vec![4, 5, 6])),
        )
    }

    #[test]
    fn test_conc_collapses_empty_children() {
        let node = Node::conc(Node::Empty, Node::from(vec![7]));
        assert_eq!(node, Node::Leaf(vec![7]));
        assert_eq!(sample().count(), 6);
    }

    #[test]
    fn test_flatten_preserves_encounter_order() {
        assert_eq!(sample().flatten(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_cursor_splits_keep_prefix_order() {
        let mut cursor = sample().cursor(StreamFlags::ORDERED);
        let mut prefix = cursor.try_split().unwrap_or_else(|| Box::new(VecCursor::new(Vec::new())));
        let mut seen = Vec::new();
        prefix.for_each_remaining(&mut |x| seen.push(x));
        cursor.for_each_remaining(&mut |x| seen.push(x));
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(cursor.estimated_size(), Some(0));
    }
}

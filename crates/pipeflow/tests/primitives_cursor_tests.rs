//! Tests for cursors and buffer trees.
//!
//! These tests verify the splittable sources parallel evaluation relies on:
//! - Prefix splits preserve encounter order
//! - Exact sizes and characteristics
//! - Batch splitting of iterators with unknown size
//!
//! ## Test Organization
//!
//! 1. **Vector and Range Cursors**
//! 2. **Iterator Cursor**
//! 3. **Buffer Trees**

use pipeflow::internals::primitives::cursor::{Cursor, IteratorCursor, RangeCursor, VecCursor, BATCH_UNIT};
use pipeflow::internals::primitives::flags::StreamFlags;
use pipeflow::internals::primitives::node::Node;

fn drain<T>(cursor: &mut dyn Cursor<T>) -> Vec<T> {
    let mut out = Vec::new();
    cursor.for_each_remaining(&mut |item| out.push(item));
    out
}

// ============================================================================
// Vector and Range Cursor Tests
// ============================================================================

/// Test that a split hands off the front half.
#[test]
fn test_vec_cursor_split_is_prefix() {
    let mut cursor = VecCursor::new((0..10).collect::<Vec<_>>());
    let mut prefix = cursor.try_split().expect("ten elements split");

    let mut rejoined = drain(&mut *prefix);
    rejoined.extend(drain(&mut cursor));
    assert_eq!(rejoined, (0..10).collect::<Vec<_>>());
    assert!(cursor.characteristics().is_sized());
}

/// Test that a single element cannot be split further.
#[test]
fn test_vec_cursor_single_element_does_not_split() {
    let mut cursor = VecCursor::new(vec![42]);
    assert!(cursor.try_split().is_none());
    assert_eq!(cursor.exact_size(), Some(1));
}

/// Test range sizes, including the closed form reaching the type bound.
#[test]
fn test_range_cursor_sizes() {
    let half_open = RangeCursor::new(3, 8);
    assert_eq!(half_open.exact_size(), Some(5));

    let empty = RangeCursor::new(8, 3);
    assert_eq!(empty.exact_size(), Some(0));

    let mut closed = RangeCursor::closed(i32::MAX - 2, i32::MAX);
    assert_eq!(drain(&mut closed), vec![i32::MAX - 2, i32::MAX - 1, i32::MAX]);
}

/// Test that range splits partition the range exactly.
#[test]
fn test_range_cursor_split_partitions() {
    let mut cursor = RangeCursor::new(0i64, 100);
    let mut prefix = cursor.try_split().expect("range splits");
    let front = drain(&mut *prefix);
    let back = drain(&mut cursor);

    assert_eq!(front.len() + back.len(), 100);
    assert_eq!(front.last().map(|x| x + 1), back.first().copied());
    let flags = cursor.characteristics();
    assert!(flags.is_sorted() && flags.is_distinct());
}

// ============================================================================
// Iterator Cursor Tests
// ============================================================================

/// Test that an infinite iterator splits off growing, finite batches.
#[test]
fn test_iterator_cursor_batches_infinite_source() {
    let mut cursor = IteratorCursor::new(0u64.., StreamFlags::ORDERED);
    assert_eq!(Cursor::<u64>::estimated_size(&cursor), None);

    let mut first = cursor.try_split().expect("infinite source splits");
    let mut second = cursor.try_split().expect("infinite source splits");
    assert_eq!(first.exact_size(), Some(BATCH_UNIT as u64));
    assert_eq!(second.exact_size(), Some(2 * BATCH_UNIT as u64));

    let batch = drain(&mut *first);
    assert_eq!(batch[0], 0);
    assert_eq!(drain(&mut *second)[0], BATCH_UNIT as u64);
    let mut next = None;
    cursor.try_advance(&mut |x| next = Some(x));
    assert_eq!(next, Some(3 * BATCH_UNIT as u64));
}

/// Test that an exact size hint makes the cursor sized.
#[test]
fn test_iterator_cursor_exact_hint_is_sized() {
    let cursor = IteratorCursor::new(vec![1, 2, 3].into_iter(), StreamFlags::ORDERED);
    assert!(Cursor::<i32>::characteristics(&cursor).is_sized());
    assert_eq!(Cursor::<i32>::exact_size(&cursor), Some(3));
}

// ============================================================================
// Buffer Tree Tests
// ============================================================================

/// Test that concatenation preserves order and skips empty sides.
#[test]
fn test_node_conc_preserves_order() {
    let node = Node::conc(
        Node::conc(Node::from(vec![1, 2]), Node::Empty),
        Node::from(vec![3, 4, 5]),
    );
    assert_eq!(node.count(), 5);
    assert_eq!(node.flatten(), vec![1, 2, 3, 4, 5]);
}

/// Test that a node cursor splits along the tree and keeps order.
#[test]
fn test_node_cursor_split_keeps_order() {
    let node = Node::conc(Node::from(vec![1, 2, 3]), Node::from(vec![4, 5, 6]));
    let mut cursor = node.cursor(StreamFlags::ORDERED);
    let mut prefix = cursor.try_split().expect("concatenation splits");
    let mut all = drain(&mut *prefix);
    all.extend(drain(&mut cursor));
    assert_eq!(all, vec![1, 2, 3, 4, 5, 6]);
}

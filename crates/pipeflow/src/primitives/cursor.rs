//! Splittable cursors supplying pipeline elements.
//!
//! ## Purpose
//!
//! A [`Cursor`] is the external iteration and partitioning abstraction behind
//! every pipeline source. It yields elements one at a time or in bulk, may
//! report its size, and may split off a disjoint prefix for parallel
//! decomposition.
//!
//! ## Design notes
//!
//! * **Object-safe**: Cursors travel as `Box<dyn Cursor<T>>` so sources of any
//!   concrete type can head a chain.
//! * **Prefix splits**: `try_split` hands back the earlier part of the
//!   remaining elements and keeps the later part, so encounter order is
//!   recoverable by a left-to-right combine.
//! * **Batching**: Cursors over plain iterators split by pulling a growing
//!   batch into a vector.
//!
//! ## Key concepts
//!
//! * **Characteristics**: A subset of ORDERED, SORTED, DISTINCT, SIZED.
//! * **Estimated size**: `None` when unknown or infinite.
//!
//! ## Non-goals
//!
//! * This module does not define how an external source obtains elements.

// External dependencies
use num_traits::PrimInt;

// Internal dependencies
use crate::primitives::flags::StreamFlags;

// ============================================================================
// Cursor Contract
// ============================================================================

/// A possibly-infinite, possibly-sized, possibly-splittable element source.
pub trait Cursor<T>: Send {
    /// Feed the next element to `action`. Returns `false` once exhausted.
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool;

    /// Feed every remaining element to `action`.
    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        while self.try_advance(action) {}
    }

    /// Split off a disjoint prefix of the remaining elements.
    fn try_split(&mut self) -> Option<Box<dyn Cursor<T>>>;

    /// Number of remaining elements, when known.
    fn estimated_size(&self) -> Option<u64>;

    /// Properties of the elements this cursor yields.
    fn characteristics(&self) -> StreamFlags;

    /// Remaining element count if the cursor is SIZED.
    fn exact_size(&self) -> Option<u64> {
        if self.characteristics().is_sized() {
            self.estimated_size()
        } else {
            None
        }
    }
}

impl<T, C: Cursor<T> + ?Sized> Cursor<T> for Box<C> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        (**self).try_advance(action)
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        (**self).for_each_remaining(action)
    }

    fn try_split(&mut self) -> Option<Box<dyn Cursor<T>>> {
        (**self).try_split()
    }

    fn estimated_size(&self) -> Option<u64> {
        (**self).estimated_size()
    }

    fn characteristics(&self) -> StreamFlags {
        (**self).characteristics()
    }
}

// ============================================================================
// Vector Cursor
// ============================================================================

/// Cursor owning a vector of elements. Always SIZED.
#[derive(Debug)]
pub struct VecCursor<T> {
    items: std::vec::IntoIter<T>,
    flags: StreamFlags,
}

impl<T> VecCursor<T> {
    /// Ordered, sized cursor over `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self::with_flags(items, StreamFlags::ORDERED)
    }

    /// Cursor over `items` with the given characteristics (SIZED is implied).
    pub fn with_flags(items: Vec<T>, flags: StreamFlags) -> Self {
        Self {
            items: items.into_iter(),
            flags: flags | StreamFlags::SIZED,
        }
    }
}

impl<T: Send + 'static> Cursor<T> for VecCursor<T> {
    #[inline]
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        match self.items.next() {
            Some(item) => {
                action(item);
                true
            }
            None => false,
        }
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        for item in self.items.by_ref() {
            action(item);
        }
    }

    fn try_split(&mut self) -> Option<Box<dyn Cursor<T>>> {
        let len = self.items.len();
        if len < 2 {
            return None;
        }
        let prefix: Vec<T> = self.items.by_ref().take(len / 2).collect();
        Some(Box::new(VecCursor::with_flags(prefix, self.flags)))
    }

    fn estimated_size(&self) -> Option<u64> {
        Some(self.items.len() as u64)
    }

    fn characteristics(&self) -> StreamFlags {
        self.flags
    }
}

// ============================================================================
// Range Cursor
// ============================================================================

/// Cursor over a half-open integer range.
#[derive(Debug, Clone)]
pub struct RangeCursor<T> {
    next: i128,
    end: i128,
    _marker: core::marker::PhantomData<fn() -> T>,
}

impl<T: PrimInt> RangeCursor<T> {
    /// Elements `start, start + 1, ..., end - 1`.
    pub fn new(start: T, end: T) -> Self {
        let next = start.to_i128().unwrap_or(0);
        let end = end.to_i128().unwrap_or(next).max(next);
        Self {
            next,
            end,
            _marker: core::marker::PhantomData,
        }
    }

    /// Elements `start, ..., end` inclusive.
    pub fn closed(start: T, end: T) -> Self {
        let mut cursor = Self::new(start, end);
        if end >= start {
            cursor.end = end.to_i128().map_or(cursor.end, |e| e + 1);
        }
        cursor
    }
}

impl<T: PrimInt + Send + 'static> Cursor<T> for RangeCursor<T> {
    #[inline]
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        if self.next >= self.end {
            return false;
        }
        match T::from(self.next) {
            Some(value) => {
                self.next += 1;
                action(value);
                true
            }
            None => {
                self.next = self.end;
                false
            }
        }
    }

    fn try_split(&mut self) -> Option<Box<dyn Cursor<T>>> {
        let len = self.end - self.next;
        if len < 2 {
            return None;
        }
        let mid = self.next + len / 2;
        let prefix = Self {
            next: self.next,
            end: mid,
            _marker: core::marker::PhantomData,
        };
        self.next = mid;
        Some(Box::new(prefix))
    }

    fn estimated_size(&self) -> Option<u64> {
        u64::try_from(self.end - self.next).ok()
    }

    fn characteristics(&self) -> StreamFlags {
        StreamFlags::ORDERED | StreamFlags::SORTED | StreamFlags::DISTINCT | StreamFlags::SIZED
    }
}

// ============================================================================
// Iterator Cursor
// ============================================================================

/// Batch growth step for iterator splits.
pub const BATCH_UNIT: usize = 1 << 10;

/// Largest batch an iterator split pulls at once.
pub const MAX_BATCH: usize = 1 << 25;

/// Cursor adapting any iterator, possibly infinite.
///
/// Splits pull the next batch (1024, 2048, ... elements) into a [`VecCursor`]
/// prefix, which lets parallel evaluation make progress on sources that
/// cannot split natively.
#[derive(Debug)]
pub struct IteratorCursor<I> {
    iter: I,
    batch: usize,
    flags: StreamFlags,
}

impl<I: Iterator> IteratorCursor<I> {
    /// Wrap `iter`, reporting `flags` (SIZED is added when the size hint is exact).
    pub fn new(iter: I, flags: StreamFlags) -> Self {
        Self {
            iter,
            batch: 0,
            flags,
        }
    }

    fn exact_hint(&self) -> Option<u64> {
        match self.iter.size_hint() {
            (lo, Some(hi)) if lo == hi => Some(lo as u64),
            _ => None,
        }
    }
}

impl<T, I> Cursor<T> for IteratorCursor<I>
where
    T: Send + 'static,
    I: Iterator<Item = T> + Send,
{
    #[inline]
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        match self.iter.next() {
            Some(item) => {
                action(item);
                true
            }
            None => false,
        }
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        for item in self.iter.by_ref() {
            action(item);
        }
    }

    fn try_split(&mut self) -> Option<Box<dyn Cursor<T>>> {
        let remaining = self.exact_hint().map_or(usize::MAX, |n| n as usize);
        if remaining < 2 {
            return None;
        }
        self.batch = (self.batch + BATCH_UNIT).min(MAX_BATCH);
        let take = self.batch.min(remaining);
        let prefix: Vec<T> = self.iter.by_ref().take(take).collect();
        if prefix.is_empty() {
            return None;
        }
        Some(Box::new(VecCursor::with_flags(prefix, self.flags)))
    }

    fn estimated_size(&self) -> Option<u64> {
        self.exact_hint()
    }

    fn characteristics(&self) -> StreamFlags {
        if self.exact_hint().is_some() {
            self.flags | StreamFlags::SIZED
        } else {
            self.flags
        }
    }
}

// ============================================================================
// Empty Cursor
// ============================================================================

/// Cursor with no elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCursor;

impl<T: Send + 'static> Cursor<T> for EmptyCursor {
    fn try_advance(&mut self, _action: &mut dyn FnMut(T)) -> bool {
        false
    }

    fn try_split(&mut self) -> Option<Box<dyn Cursor<T>>> {
        None
    }

    fn estimated_size(&self) -> Option<u64> {
        Some(0)
    }

    fn characteristics(&self) -> StreamFlags {
        StreamFlags::ORDERED | StreamFlags::SIZED | StreamFlags::SORTED | StreamFlags::DISTINCT
    }
}

//! Push-consumer protocol shared by every stage.
//!
//! ## Purpose
//!
//! A [`Sink`] is the begin/accept/end/cancel protocol that drives sequential
//! consumption. Each intermediate stage wraps its downstream sink in a
//! decorator that applies the stage's transformation before forwarding.
//!
//! ## Key concepts
//!
//! * **Lifecycle**: `begin` once before traversal, `accept` zero or more times,
//!   `end` exactly once after traversal completes or short-circuits.
//! * **Cancellation**: `cancellation_requested` is polled before each element
//!   when the chain is short-circuiting. It defaults to `false`.
//! * **Terminal sinks**: A [`TerminalSink`] additionally yields a result once
//!   the traversal is finished.

/// Per-stage consumer of elements.
pub trait Sink<T> {
    /// Prepare for traversal. `size` is the exact element count when known.
    fn begin(&mut self, _size: Option<u64>) {}

    /// Consume one element.
    fn accept(&mut self, item: T);

    /// Traversal is finished.
    fn end(&mut self) {}

    /// Whether the consumer wants no further elements.
    fn cancellation_requested(&self) -> bool {
        false
    }
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for &mut S {
    #[inline]
    fn begin(&mut self, size: Option<u64>) {
        (**self).begin(size)
    }

    #[inline]
    fn accept(&mut self, item: T) {
        (**self).accept(item)
    }

    #[inline]
    fn end(&mut self) {
        (**self).end()
    }

    #[inline]
    fn cancellation_requested(&self) -> bool {
        (**self).cancellation_requested()
    }
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for Box<S> {
    #[inline]
    fn begin(&mut self, size: Option<u64>) {
        (**self).begin(size)
    }

    #[inline]
    fn accept(&mut self, item: T) {
        (**self).accept(item)
    }

    #[inline]
    fn end(&mut self) {
        (**self).end()
    }

    #[inline]
    fn cancellation_requested(&self) -> bool {
        (**self).cancellation_requested()
    }
}

/// A sink that accumulates a result.
pub trait TerminalSink<T>: Sink<T> {
    /// The accumulated result type.
    type Output;

    /// Consume the sink and return its result.
    fn finish(self) -> Self::Output;
}

/// Capacity to reserve for a reported size (at most 2^24 elements).
pub(crate) fn presize(size: u64) -> usize {
    const MAX_PRESIZE: u64 = 1 << 24;
    size.min(MAX_PRESIZE) as usize
}

// ============================================================================
// Helper Sinks
// ============================================================================

/// Sink that forwards each element to a closure.
pub struct FnSink<F>(pub F);

impl<T, F: FnMut(T)> Sink<T> for FnSink<F> {
    #[inline]
    fn accept(&mut self, item: T) {
        (self.0)(item)
    }
}

/// Forwards elements into `downstream` without relaying `begin`/`end`.
///
/// Used to splice a nested traversal into an outer one that already began.
pub struct Splice<'a, T> {
    downstream: &'a mut dyn Sink<T>,
}

impl<'a, T> Splice<'a, T> {
    /// Wrap an already-begun sink.
    pub fn new(downstream: &'a mut dyn Sink<T>) -> Self {
        Self { downstream }
    }
}

impl<T> Sink<T> for Splice<'_, T> {
    #[inline]
    fn accept(&mut self, item: T) {
        self.downstream.accept(item)
    }

    #[inline]
    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

/// Sink collecting elements into a vector.
#[derive(Debug)]
pub struct VecSink<T> {
    items: Vec<T>,
}

impl<T> Default for VecSink<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> VecSink<T> {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> Sink<T> for VecSink<T> {
    fn begin(&mut self, size: Option<u64>) {
        if let Some(n) = size {
            self.items.reserve(presize(n));
        }
    }

    #[inline]
    fn accept(&mut self, item: T) {
        self.items.push(item);
    }
}

impl<T> TerminalSink<T> for VecSink<T> {
    type Output = Vec<T>;

    fn finish(self) -> Vec<T> {
        self.items
    }
}

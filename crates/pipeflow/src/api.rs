//! High-level API for building pipelines.
//!
//! ## Purpose
//!
//! This module provides the entry points that start a pipeline from a
//! source: vectors, iterators, custom cursors, seeded and generated infinite
//! sequences, and integer ranges.
//!
//! ## Design notes
//!
//! * **Lazy**: Nothing is read from a source until a terminal operation runs.
//! * **Characteristics**: Every source reports its own flags. Vectors and
//!   ranges are SIZED and ORDERED; ranges are also SORTED and DISTINCT;
//!   `iterate` is ORDERED; `generate` reports nothing.
//!
//! ### Building a Pipeline
//!
//! 1. Start from a source (`Streams::of`, `Streams::range`, ...).
//! 2. Chain intermediate operations (`.map()`, `.filter()`, `.sorted()`, ...).
//! 3. Optionally switch mode with `.parallel()`.
//! 4. Finish with a terminal operation (`.to_vec()`, `.count()`, ...).

// External dependencies
use core::iter;

// Internal dependencies
use crate::adapters::double::DoublePipeline;
use crate::adapters::int::IntPipeline;
use crate::primitives::cursor::{Cursor, EmptyCursor, IteratorCursor, RangeCursor, VecCursor};
use crate::primitives::flags::StreamFlags;

// Publicly re-exported types
pub use crate::engine::config::EngineConfig;
pub use crate::engine::pipeline::Pipeline;
pub use crate::math::comparators::{
    comparing, double_order, natural_order, nulls_first, nulls_last, reverse_order, reversed, then_comparing,
};
pub use crate::math::statistics::{DoubleSummaryStatistics, IntSummaryStatistics};
pub use crate::math::summation::CompensatedSum;
pub use crate::primitives::errors::{PipelineError, PipelineResult};
pub use crate::primitives::nullable::Nullable;

/// Pipeline entry points.
#[derive(Debug, Clone, Copy)]
pub struct Streams;

impl Streams {
    /// Pipeline over the elements of `items`.
    pub fn of<T: Send + 'static>(items: Vec<T>) -> Pipeline<T> {
        Pipeline::from_cursor(Box::new(VecCursor::new(items)))
    }

    /// Ordered pipeline over the items of `iter`.
    pub fn from_iter<I>(iter: I) -> Pipeline<I::Item>
    where
        I: IntoIterator,
        I::IntoIter: Send + 'static,
        I::Item: Send + 'static,
    {
        Pipeline::from_cursor(Box::new(IteratorCursor::new(iter.into_iter(), StreamFlags::ORDERED)))
    }

    /// Pipeline over a custom cursor.
    pub fn from_cursor<T: Send + 'static>(cursor: Box<dyn Cursor<T>>) -> Pipeline<T> {
        Pipeline::from_cursor(cursor)
    }

    /// Infinite ordered pipeline `seed, f(seed), f(f(seed)), ...`.
    pub fn iterate<T, F>(seed: T, mut f: F) -> Pipeline<T>
    where
        T: Send + 'static,
        F: FnMut(&T) -> T + Send + 'static,
    {
        let values = iter::successors(Some(seed), move |prev| Some(f(prev)));
        Pipeline::from_cursor(Box::new(IteratorCursor::new(values, StreamFlags::ORDERED)))
    }

    /// Infinite unordered pipeline of values produced by `f`.
    pub fn generate<T, F>(f: F) -> Pipeline<T>
    where
        T: Send + 'static,
        F: FnMut() -> T + Send + 'static,
    {
        Pipeline::from_cursor(Box::new(IteratorCursor::new(iter::repeat_with(f), StreamFlags::EMPTY)))
    }

    /// Pipeline with no elements.
    pub fn empty<T: Send + 'static>() -> Pipeline<T> {
        Pipeline::from_cursor(Box::new(EmptyCursor))
    }

    /// Integers `start..end`.
    pub fn range(start: i32, end: i32) -> IntPipeline {
        IntPipeline::from(Pipeline::from_cursor(Box::new(RangeCursor::new(start, end))))
    }

    /// Integers `start..=end`.
    pub fn range_closed(start: i32, end: i32) -> IntPipeline {
        IntPipeline::from(Pipeline::from_cursor(Box::new(RangeCursor::closed(start, end))))
    }

    /// `f64` pipeline over `values`.
    pub fn doubles(values: Vec<f64>) -> DoublePipeline {
        DoublePipeline::from(Self::of(values))
    }

    /// `i32` pipeline over `values`.
    pub fn ints(values: Vec<i32>) -> IntPipeline {
        IntPipeline::from(Self::of(values))
    }
}

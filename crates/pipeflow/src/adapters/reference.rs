//! Fluent operations on reference pipelines.
//!
//! ## Purpose
//!
//! This module gives [`Pipeline`] its user-facing vocabulary: the
//! intermediate operations that append stages and the terminal operations
//! that evaluate the chain.
//!
//! ## Design notes
//!
//! * **By value**: Every method consumes the handle. Intermediate operations
//!   return the new tail; terminal operations return a `Result`.
//! * **Fail-fast arguments**: `limit` and `skip` reject negative counts
//!   before a stage is appended.
//! * **Elision**: `sorted` on a SORTED chain, `unordered` on an unordered
//!   chain, and `skip(0)` append nothing.
//!
//! ## Key concepts
//!
//! * **Ties**: `min_by` and `max_by` both keep the earlier of two equal
//!   elements.
//!
//! ## Invariants
//!
//! * A terminal operation runs at most once per chain.

// External dependencies
use core::cmp::Ordering;
use core::fmt::Display;
use core::hash::Hash;

// Internal dependencies
use crate::algorithms::distinct::{DistinctOp, DISTINCT_FLAGS};
use crate::algorithms::slice::SliceOp;
use crate::algorithms::sorted::{SortedOp, COMPARATOR_SORT_FLAGS, NATURAL_SORT_FLAGS};
use crate::algorithms::stateless::{
    FilterOp, FlatMapIterOp, FlatMapOp, MapOp, PassOp, PeekOp, TryFlatMapOp, FILTER_FLAGS, FLAT_MAP_FLAGS, MAP_FLAGS,
    TRY_FLAT_MAP_FLAGS, UNORDERED_FLAGS,
};
use crate::engine::pipeline::Pipeline;
use crate::engine::validator::Validator;
use crate::evaluation::collect::CollectOp;
use crate::evaluation::find::FindOp;
use crate::evaluation::for_each::ForEachOp;
use crate::evaluation::matching::{MatchKind, MatchOp};
use crate::evaluation::reduce::{CountOp, ReduceOp};
use crate::math::comparators::natural_order;
use crate::primitives::errors::PipelineResult;
use crate::primitives::flags::FlagDelta;
use crate::primitives::nullable::Nullable;

impl<T: Send + 'static> Pipeline<T> {
    // ========================================================================
    // Stateless Operations
    // ========================================================================

    /// Apply `mapper` to every element.
    pub fn map<U, F>(self, mapper: F) -> Pipeline<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.append_stateless("map", MAP_FLAGS, MapOp(mapper))
    }

    /// Keep the elements matching `predicate`.
    pub fn filter<P>(self, predicate: P) -> Pipeline<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.append_stateless("filter", FILTER_FLAGS, FilterOp(predicate))
    }

    /// Replace every element with the elements of the pipeline `mapper` returns.
    ///
    /// Each sub-pipeline is evaluated sequentially into this chain and stops
    /// early once the downstream has enough.
    pub fn flat_map<U, F>(self, mapper: F) -> Pipeline<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Pipeline<U> + Send + Sync + 'static,
    {
        self.append_stateless("flat_map", FLAT_MAP_FLAGS, FlatMapOp(mapper))
    }

    /// Replace every element with the items of the iterator `mapper` returns.
    pub fn flat_map_iter<U, I, F>(self, mapper: F) -> Pipeline<U>
    where
        U: Send + 'static,
        I: IntoIterator<Item = U> + 'static,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        self.append_stateless("flat_map_iter", FLAT_MAP_FLAGS, FlatMapIterOp(mapper))
    }

    /// Like [`flat_map`](Self::flat_map), but the mapper may fail. The first
    /// failure stops the evaluation and is returned by the terminal.
    pub fn try_flat_map<U, E, F>(self, mapper: F) -> Pipeline<U>
    where
        U: Send + 'static,
        E: Display + 'static,
        F: Fn(T) -> Result<Pipeline<U>, E> + Send + Sync + 'static,
    {
        self.append_stateless("try_flat_map", TRY_FLAT_MAP_FLAGS, TryFlatMapOp(mapper))
    }

    /// Observe every element as it passes.
    pub fn peek<F>(self, observer: F) -> Pipeline<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.append_stateless("peek", FlagDelta::NONE, PeekOp(observer))
    }

    /// Drop the encounter-order guarantee.
    pub fn unordered(self) -> Pipeline<T> {
        if !self.flags().is_ordered() {
            return self;
        }
        self.append_stateless("unordered", UNORDERED_FLAGS, PassOp)
    }

    // ========================================================================
    // Stateful Operations
    // ========================================================================

    /// Pass at most `max_size` elements.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `max_size` is negative.
    pub fn limit(self, max_size: i64) -> PipelineResult<Pipeline<T>> {
        let limit = Validator::validate_slice_count("max_size", max_size)?;
        let op = SliceOp::new(0, Some(limit));
        Ok(self.append_stateful("limit", op.flag_delta(), op))
    }

    /// Drop the first `n` elements.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n` is negative.
    pub fn skip(self, n: i64) -> PipelineResult<Pipeline<T>> {
        let skip = Validator::validate_slice_count("n", n)?;
        if skip == 0 {
            return Ok(self);
        }
        let op = SliceOp::new(skip, None);
        Ok(self.append_stateful("skip", op.flag_delta(), op))
    }

    /// Sort in natural order. Stable.
    pub fn sorted(self) -> Pipeline<T>
    where
        T: Ord,
    {
        if self.flags().is_sorted() {
            log::trace!("sorted elided on an already sorted chain");
            return self;
        }
        self.append_stateful("sorted", NATURAL_SORT_FLAGS, SortedOp::new(natural_order::<T>()))
    }

    /// Sort with `cmp`. Stable.
    pub fn sorted_by<C>(self, cmp: C) -> Pipeline<T>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.append_stateful("sorted_by", COMPARATOR_SORT_FLAGS, SortedOp::new(cmp))
    }

    /// Drop repeated elements, keeping first occurrences.
    pub fn distinct(self) -> Pipeline<T>
    where
        T: Hash + Eq + Clone + Nullable + Sync,
    {
        self.append_stateful("distinct", DISTINCT_FLAGS, DistinctOp)
    }

    // ========================================================================
    // Terminal Operations
    // ========================================================================

    /// Run `action` on every element, in any order and possibly concurrently.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn for_each<F>(self, action: F) -> PipelineResult<()>
    where
        F: Fn(T) + Send + Sync,
    {
        self.evaluate(&ForEachOp::unordered(action))
    }

    /// Run `action` on every element in encounter order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn for_each_ordered<F>(self, action: F) -> PipelineResult<()>
    where
        F: Fn(T) + Send + Sync,
    {
        self.evaluate(&ForEachOp::ordered(action))
    }

    /// Fold with an associative `op` starting from `identity`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn reduce<F>(self, identity: T, op: F) -> PipelineResult<T>
    where
        T: Clone + Sync,
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let fallback = identity.clone();
        let folded = self.evaluate(&ReduceOp::with_identity(identity, op))?;
        Ok(folded.unwrap_or(fallback))
    }

    /// Fold with an associative `op`; `None` for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn reduce_with<F>(self, op: F) -> PipelineResult<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        self.evaluate(&ReduceOp::optional(op))
    }

    /// Mutable reduction into containers made by `supplier`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn collect_with<A, S, F, C>(self, supplier: S, accumulator: F, combiner: C) -> PipelineResult<A>
    where
        A: Send + 'static,
        S: Fn() -> A + Send + Sync + 'static,
        F: Fn(&mut A, T) + Send + Sync + 'static,
        C: Fn(&mut A, A) + Send + Sync + 'static,
    {
        self.evaluate(&ReduceOp::new(supplier, accumulator, combiner))
    }

    /// Collect into a vector in encounter order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn to_vec(self) -> PipelineResult<Vec<T>> {
        Ok(self.evaluate(&CollectOp)?.flatten())
    }

    /// Number of elements.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn count(self) -> PipelineResult<u64> {
        self.evaluate(&CountOp)
    }

    /// Smallest element under `cmp`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn min_by<C>(self, cmp: C) -> PipelineResult<Option<T>>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.reduce_with(move |a, b| if cmp(&a, &b) != Ordering::Greater { a } else { b })
    }

    /// Largest element under `cmp`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn max_by<C>(self, cmp: C) -> PipelineResult<Option<T>>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.reduce_with(move |a, b| if cmp(&a, &b) != Ordering::Less { a } else { b })
    }

    /// Smallest element in natural order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn min(self) -> PipelineResult<Option<T>>
    where
        T: Ord,
    {
        self.min_by(natural_order::<T>())
    }

    /// Largest element in natural order.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn max(self) -> PipelineResult<Option<T>>
    where
        T: Ord,
    {
        self.max_by(natural_order::<T>())
    }

    /// Whether any element matches. `false` for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn any_match<P>(self, predicate: P) -> PipelineResult<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.evaluate(&MatchOp::new(MatchKind::Any, predicate))
    }

    /// Whether every element matches. `true` for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn all_match<P>(self, predicate: P) -> PipelineResult<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.evaluate(&MatchOp::new(MatchKind::All, predicate))
    }

    /// Whether no element matches. `true` for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn none_match<P>(self, predicate: P) -> PipelineResult<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.evaluate(&MatchOp::new(MatchKind::None, predicate))
    }

    /// First element in encounter order, or any element if the chain is
    /// unordered.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn find_first(self) -> PipelineResult<Option<T>> {
        self.evaluate(&FindOp::first())
    }

    /// Any element.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure.
    pub fn find_any(self) -> PipelineResult<Option<T>> {
        self.evaluate(&FindOp::any())
    }
}

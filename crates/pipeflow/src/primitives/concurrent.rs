//! Unique-element collections used by deduplication.
//!
//! ## Purpose
//!
//! [`ConcurrentSet`] supports safe concurrent insert-if-absent from parallel
//! tasks. [`OrderedSet`] is its sequential, insertion-ordered counterpart used
//! as a reduce accumulator.
//!
//! ## Design notes
//!
//! * **Sharding**: The concurrent set spreads keys over independently locked
//!   `hashbrown` shards chosen by hash, so unrelated inserts rarely contend.
//! * **Absent values**: A value reporting [`Nullable::is_null`] is never used as
//!   a key. It occupies a one-shot slot instead.
//!
//! ## Invariants
//!
//! * Inserts never fail.
//! * At most one absent value is retained.
//! * `OrderedSet` keeps the first occurrence of every value in arrival order.

// External dependencies
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use hashbrown::HashSet;
use std::sync::{Mutex, OnceLock, PoisonError};

// Internal dependencies
use crate::primitives::nullable::Nullable;

// ============================================================================
// Concurrent Set
// ============================================================================

const DEFAULT_SHARDS: usize = 16;

/// Sharded set with concurrent insert-if-absent.
#[derive(Debug)]
pub struct ConcurrentSet<T> {
    shards: Vec<Mutex<HashSet<T>>>,
    router: DefaultHashBuilder,
    absent: OnceLock<T>,
}

impl<T: Hash + Eq + Nullable> Default for ConcurrentSet<T> {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

impl<T: Hash + Eq + Nullable> ConcurrentSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with `shards` independently locked shards.
    pub fn with_shards(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| Mutex::new(HashSet::new())).collect(),
            router: DefaultHashBuilder::default(),
            absent: OnceLock::new(),
        }
    }

    fn shard(&self, item: &T) -> &Mutex<HashSet<T>> {
        let index = (self.router.hash_one(item) as usize) % self.shards.len();
        &self.shards[index]
    }

    /// Insert `item`. Returns `true` if it was not already present.
    pub fn insert(&self, item: T) -> bool {
        if item.is_null() {
            return self.absent.set(item).is_ok();
        }
        self.shard(&item)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(item)
    }

    /// Record a clone of `item` if absent. Returns `true` on first sighting.
    pub fn first_sighting(&self, item: &T) -> bool
    where
        T: Clone,
    {
        if item.is_null() {
            return self.absent.get().is_none() && self.absent.set(item.clone()).is_ok();
        }
        let mut shard = self.shard(item).lock().unwrap_or_else(PoisonError::into_inner);
        if shard.contains(item) {
            false
        } else {
            shard.insert(item.clone());
            true
        }
    }

    /// Whether an absent value has been observed.
    pub fn saw_absent(&self) -> bool {
        self.absent.get().is_some()
    }

    /// Number of distinct values held, counting the absent value once.
    pub fn len(&self) -> usize {
        let keyed: usize = self
            .shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum();
        keyed + usize::from(self.saw_absent())
    }

    /// Whether no value has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain into a vector in unspecified order. The absent value, if
    /// observed, is appended once.
    pub fn into_vec(self) -> Vec<T> {
        let mut out: Vec<T> = self
            .shards
            .into_iter()
            .flat_map(|s| s.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect();
        if let Some(absent) = self.absent.into_inner() {
            out.push(absent);
        }
        out
    }
}

// ============================================================================
// Ordered Set
// ============================================================================

/// Insertion-ordered set: the first occurrence of each value wins.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    seen: HashSet<T>,
    items: Vec<T>,
    saw_absent: bool,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
            saw_absent: false,
        }
    }
}

impl<T: Hash + Eq + Clone + Nullable> OrderedSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless an equal value was already inserted.
    pub fn insert(&mut self, item: T) -> bool {
        if item.is_null() {
            if self.saw_absent {
                return false;
            }
            self.saw_absent = true;
        } else if !self.seen.insert(item.clone()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Append every element of `later` not already present, keeping its order.
    pub fn merge(&mut self, later: OrderedSet<T>) {
        for item in later.items {
            self.insert(item);
        }
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no value has been inserted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Values in first-occurrence order.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_set_tracks_absent_once() {
        let set = ConcurrentSet::new();
        assert!(set.insert(Some(1)));
        assert!(set.insert(None));
        assert!(!set.insert(None));
        assert!(!set.first_sighting(&Some(1)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_ordered_set_merge_keeps_first_occurrence() {
        let mut left = OrderedSet::new();
        for x in [3, 1, 3] {
            left.insert(x);
        }
        let mut right = OrderedSet::new();
        for x in [2, 1, 2] {
            right.insert(x);
        }
        left.merge(right);
        assert_eq!(left.into_vec(), vec![3, 1, 2]);
    }
}

//! Layer 5: Algorithms
//!
//! # Purpose
//!
//! This layer implements the intermediate operations:
//! - Stateless transforms (map, filter, flat-map, peek, unordered)
//! - Skip and limit
//! - Sorting
//! - Deduplication
//!
//! Each operation is a sink decorator for sequential traversal; the stateful
//! ones also provide a parallel evaluation that acts as a barrier.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Adapters
//!   ↓
//! Layer 5: Algorithms ← You are here
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Stateless intermediate operations.
pub mod stateless;

/// Skip and limit.
pub mod slice;

/// Sorting.
pub mod sorted;

/// Deduplication.
pub mod distinct;

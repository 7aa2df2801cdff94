//! Layer 4: Evaluation
//!
//! # Purpose
//!
//! This layer provides the terminal operations and the fork/join machinery
//! they share:
//! - Task tree with left-biased combination and node cancellation
//! - Reduce and count
//! - For-each (unordered and encounter-ordered)
//! - Any/all/none match
//! - Find-first and find-any
//! - Collection into buffer trees
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Adapters
//!   ↓
//! Layer 5: Algorithms
//!   ↓
//! Layer 4: Evaluation ← You are here
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Fork/join task tree.
pub mod task;

/// Reduce and count terminals.
pub mod reduce;

/// For-each terminals.
pub mod for_each;

/// Match terminals.
pub mod matching;

/// Find terminals.
pub mod find;

/// Collection into buffer trees.
pub mod collect;

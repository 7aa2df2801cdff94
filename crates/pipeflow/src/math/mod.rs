//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides pure numeric and ordering building blocks used by the
//! pipelines:
//! - Compensated floating-point summation
//! - Summary statistics with NaN-propagating float extrema
//! - Comparator combinators
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
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Compensated summation.
pub mod summation;

/// Summary statistics.
pub mod statistics;

/// Comparator combinators.
pub mod comparators;

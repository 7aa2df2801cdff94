//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the primitive abstractions used throughout the crate:
//! the flag algebra, the push-consumer protocol, splittable cursors, buffer
//! trees and unique-element sets. It has zero internal dependencies within
//! the crate.
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
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Shared error types.
pub mod errors;

/// Pipeline property flags.
pub mod flags;

/// Push-consumer protocol.
pub mod sink;

/// Splittable cursors.
pub mod cursor;

/// Materialized buffer trees.
pub mod node;

/// Absent-value detection.
pub mod nullable;

/// Unique-element sets.
pub mod concurrent;

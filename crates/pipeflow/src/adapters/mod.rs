//! Layer 6: Adapters
//!
//! # Purpose
//!
//! This layer provides the fluent, user-facing pipeline shapes:
//! - Reference pipelines over any element type
//! - `f64` pipelines with compensated numeric terminals
//! - `i32` pipelines with integer terminals
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Adapters ← You are here
//!   ↓
//! Layer 5: Algorithms
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Fluent operations on reference pipelines.
pub mod reference;

/// `f64` pipelines.
pub mod double;

/// `i32` pipelines.
pub mod int;

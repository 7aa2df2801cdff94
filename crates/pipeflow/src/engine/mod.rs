//! Layer 3: Engine
//!
//! # Purpose
//!
//! This layer owns the stage chain: the arena recording stage metadata and
//! single-use state, the typed links between stages, the partitions that
//! evaluation drives, the terminal-operation contract, and the engine
//! configuration with its validator.
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
//! Layer 3: Engine ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Engine configuration.
pub mod config;

/// Argument and configuration validation.
pub mod validator;

/// Stage arena.
pub mod graph;

/// Partitions, stage operations and evaluation plans.
pub mod partition;

/// Terminal operation contract.
pub mod terminal;

/// Typed stage chain.
pub mod pipeline;

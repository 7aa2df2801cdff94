//! Error types for pipeline construction and evaluation.
//!
//! ## Purpose
//!
//! This module defines the error conditions that can occur while a pipeline
//! is built, configured, or evaluated: reuse of a consumed chain, rejected
//! arguments, element failures raised inside a fallible stage, and engine
//! configuration problems.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors carry the offending stage name, depth, or value.
//! * **Fail-fast**: Argument errors surface when a stage is appended, before
//!   any evaluation begins.
//! * **First-wins**: Element failures are recorded once per evaluation; later
//!   failures from sibling tasks are dropped.
//!
//! ## Invariants
//!
//! * A `PipelineReuse` error is never retriable; the chain must be rebuilt.
//! * Error messages are consistent in tone and formatting.
//!
//! ## Non-goals
//!
//! * This module does not perform the validation itself (see `validator`).

// External dependencies
use thiserror::Error;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The stage chain was already consumed by a terminal operation, or a
    /// further stage was already appended past it.
    #[error("Pipeline reuse: stage '{stage}' at depth {depth} has already been linked or consumed")]
    PipelineReuse {
        /// Name of the stage that was reused.
        stage: &'static str,
        /// Distance of that stage from the source.
        depth: usize,
    },

    /// An argument was outside its permitted range (e.g. a negative limit).
    #[error("Invalid argument: {parameter}={value}")]
    InvalidArgument {
        /// Name of the rejected parameter.
        parameter: &'static str,
        /// The value that was supplied.
        value: i64,
    },

    /// An element failed while being consumed by a fallible stage.
    #[error("Element failure in stage '{stage}': {message}")]
    ElementFailure {
        /// Name of the stage that raised the failure.
        stage: &'static str,
        /// Human-readable description of the failure.
        message: String,
    },

    /// The engine configuration was rejected.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// A dedicated worker pool could not be created.
    #[error("Worker pool construction failed: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// Convenience constructor for element failures raised by user mappers.
    pub fn element(stage: &'static str, message: impl Into<String>) -> Self {
        Self::ElementFailure {
            stage,
            message: message.into(),
        }
    }

    /// Whether the error stems from reusing a consumed or superseded chain.
    pub fn is_reuse(&self) -> bool {
        matches!(self, Self::PipelineReuse { .. })
    }
}

/// Result alias used throughout the crate.
pub type PipelineResult<T> = Result<T, PipelineError>;

//! Argument and configuration validation.
//!
//! ## Purpose
//!
//! This module rejects invalid slice counts and engine configurations before
//! any stage is appended or any evaluation begins.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Side-effect free**: Validators only inspect their inputs.
//!
//! ## Invariants
//!
//! * A validated slice count is non-negative.
//! * A validated configuration never yields a zero-thread pool or an
//!   unbounded task tree.
//!
//! ## Non-goals
//!
//! * This module does not clamp or correct invalid values.

// Internal dependencies
use crate::engine::config::EngineConfig;
use crate::primitives::errors::PipelineError;

// ============================================================================
// Validator
// ============================================================================

/// Largest permitted task-tree depth.
pub const MAX_SPLIT_DEPTH_LIMIT: usize = 64;

/// Validation utility for pipeline arguments and engine configuration.
///
/// All methods return `Result<_, PipelineError>` and fail fast upon
/// identifying the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Argument Validation
    // ========================================================================

    /// Validate a limit or skip count, returning it as unsigned.
    pub fn validate_slice_count(parameter: &'static str, value: i64) -> Result<u64, PipelineError> {
        u64::try_from(value).map_err(|_| PipelineError::InvalidArgument { parameter, value })
    }

    // ========================================================================
    // Configuration Validation
    // ========================================================================

    /// Validate an engine configuration.
    pub fn validate_config(config: &EngineConfig) -> Result<(), PipelineError> {
        // Check 1: Dedicated pool size
        if config.parallelism == Some(0) {
            return Err(PipelineError::InvalidConfig(
                "parallelism must be at least 1".to_string(),
            ));
        }

        // Check 2: Leaf target factor
        if config.leaf_target_factor == 0 {
            return Err(PipelineError::InvalidConfig(
                "leaf_target_factor must be at least 1".to_string(),
            ));
        }

        // Check 3: Split depth bound
        if config.max_split_depth > MAX_SPLIT_DEPTH_LIMIT {
            return Err(PipelineError::InvalidConfig(format!(
                "max_split_depth must be at most {}, got {}",
                MAX_SPLIT_DEPTH_LIMIT, config.max_split_depth
            )));
        }

        Ok(())
    }
}

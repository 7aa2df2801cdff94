//! Engine configuration.
//!
//! ## Purpose
//!
//! [`EngineConfig`] tunes parallel decomposition: which worker pool runs the
//! task tree, how small leaves get, and how deep the tree may grow. It is
//! serializable so deployments can load it from a file.
//!
//! ## Key concepts
//!
//! * **Leaf target**: `max(estimated_size / (threads * leaf_target_factor), 1)`.
//! * **Split depth bound**: Caps decomposition of unknown-size or infinite
//!   cursors.
//!
//! ## Non-goals
//!
//! * This module does not validate values (see `validator`).

// External dependencies
use serde::{Deserialize, Serialize};

// ============================================================================
// Defaults
// ============================================================================

/// Leaves per worker thread aimed for by the task tree.
pub const DEFAULT_LEAF_TARGET_FACTOR: usize = 4;

/// Default bound on task-tree depth.
pub const DEFAULT_MAX_SPLIT_DEPTH: usize = 20;

// ============================================================================
// Config
// ============================================================================

/// Tuning knobs for parallel evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Threads in a dedicated worker pool. `None` uses the global rayon pool.
    pub parallelism: Option<usize>,

    /// Leaves per worker thread.
    pub leaf_target_factor: usize,

    /// Maximum depth of the task tree.
    pub max_split_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            leaf_target_factor: DEFAULT_LEAF_TARGET_FACTOR,
            max_split_depth: DEFAULT_MAX_SPLIT_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run parallel evaluations in a dedicated pool of `threads` workers.
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Set leaves per worker thread.
    pub fn leaf_target_factor(mut self, factor: usize) -> Self {
        self.leaf_target_factor = factor;
        self
    }

    /// Set the maximum task-tree depth.
    pub fn max_split_depth(mut self, depth: usize) -> Self {
        self.max_split_depth = depth;
        self
    }

    /// Number of worker threads evaluations will use.
    pub fn effective_threads(&self) -> usize {
        self.parallelism
            .unwrap_or_else(rayon::current_num_threads)
            .max(1)
    }

    /// Leaf size target for a source of `estimated_size` elements.
    pub fn leaf_target(&self, estimated_size: Option<u64>) -> u64 {
        let size = estimated_size.unwrap_or(u64::MAX);
        let parts = (self.effective_threads() as u64).saturating_mul(self.leaf_target_factor.max(1) as u64);
        (size / parts).max(1)
    }
}

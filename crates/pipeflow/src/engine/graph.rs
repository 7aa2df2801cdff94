//! Stage arena and single-use bookkeeping.
//!
//! ## Purpose
//!
//! Every chain shares one [`StageGraph`]: an arena of stage metadata indexed
//! by [`StageId`]. The arena records each stage's upstream handle, kind, flags,
//! and depth, and which stages have already been linked from.
//!
//! ## Design notes
//!
//! * **Arena handles**: Appending pushes a new entry and marks the upstream
//!   entry linked. A stage appended past an already-linked stage is poisoned.
//! * **Fail at the root**: Terminal evaluation calls [`StageGraph::consume`],
//!   which rejects a linked or poisoned handle with `PipelineReuse`.
//! * **Chain-wide settings**: Execution mode, configuration, and the optional
//!   dedicated worker pool belong to the chain, not to a single stage.
//!
//! ## Invariants
//!
//! * The source stage has no upstream and depth zero.
//! * A stage's flags never change after it is appended.
//! * A handle is consumed at most once.

// External dependencies
use rayon::ThreadPool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// Internal dependencies
use crate::engine::config::EngineConfig;
use crate::primitives::errors::PipelineError;
use crate::primitives::flags::StreamFlags;

// ============================================================================
// Stage Metadata
// ============================================================================

/// Index of a stage within its chain's arena.
pub type StageId = usize;

/// Kind of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Head of the chain, owning the source cursor.
    Source,
    /// Element-at-a-time transformation.
    Stateless,
    /// Transformation that may depend on the whole upstream sequence.
    Stateful,
}

#[derive(Debug)]
struct StageMeta {
    upstream: Option<StageId>,
    kind: StageKind,
    name: &'static str,
    flags: StreamFlags,
    depth: usize,
    linked: bool,
    poisoned: bool,
}

/// Read-only snapshot of one arena entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInfo {
    /// Upstream stage, `None` for the source.
    pub upstream: Option<StageId>,
    /// Kind of the stage.
    pub kind: StageKind,
    /// Operation name.
    pub name: &'static str,
    /// Combined flags at the stage's output.
    pub flags: StreamFlags,
    /// Distance from the source.
    pub depth: usize,
}

// ============================================================================
// Stage Graph
// ============================================================================

#[derive(Debug, Default, Clone)]
struct Settings {
    config: EngineConfig,
    pool: Option<Arc<ThreadPool>>,
}

/// Arena of stage metadata shared by every stage of one chain.
#[derive(Debug)]
pub struct StageGraph {
    stages: Mutex<Vec<StageMeta>>,
    parallel: AtomicBool,
    settings: Mutex<Settings>,
}

impl StageGraph {
    /// Create an arena holding a single source stage.
    pub fn with_source(name: &'static str, flags: StreamFlags) -> (Arc<Self>, StageId) {
        let graph = Self {
            stages: Mutex::new(vec![StageMeta {
                upstream: None,
                kind: StageKind::Source,
                name,
                flags,
                depth: 0,
                linked: false,
                poisoned: false,
            }]),
            parallel: AtomicBool::new(false),
            settings: Mutex::new(Settings::default()),
        };
        (Arc::new(graph), 0)
    }

    fn stages(&self) -> MutexGuard<'_, Vec<StageMeta>> {
        self.stages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a stage downstream of `upstream`, returning its handle.
    ///
    /// `upstream` becomes linked. If it was already linked or poisoned, the
    /// new stage is poisoned and any terminal evaluation through it fails.
    pub fn append(
        &self,
        upstream: StageId,
        kind: StageKind,
        name: &'static str,
        flags: StreamFlags,
    ) -> StageId {
        let mut stages = self.stages();
        let id = stages.len();
        let (depth, poisoned) = match stages.get_mut(upstream) {
            Some(meta) => {
                let poisoned = meta.linked || meta.poisoned;
                meta.linked = true;
                (meta.depth + 1, poisoned)
            }
            None => (0, true),
        };
        if poisoned {
            log::debug!("stage '{name}' appended past an already-linked stage {upstream}");
        }
        stages.push(StageMeta {
            upstream: Some(upstream),
            kind,
            name,
            flags,
            depth,
            linked: false,
            poisoned,
        });
        id
    }

    /// Claim `id` as the root of a terminal evaluation.
    pub fn consume(&self, id: StageId) -> Result<(), PipelineError> {
        let mut stages = self.stages();
        let meta = stages.get_mut(id).ok_or(PipelineError::PipelineReuse {
            stage: "unknown",
            depth: 0,
        })?;
        if meta.linked || meta.poisoned {
            return Err(PipelineError::PipelineReuse {
                stage: meta.name,
                depth: meta.depth,
            });
        }
        meta.linked = true;
        Ok(())
    }

    /// Whether `id` may still be extended or evaluated.
    pub fn is_available(&self, id: StageId) -> bool {
        self.stages()
            .get(id)
            .map_or(false, |meta| !meta.linked && !meta.poisoned)
    }

    /// Snapshot of the entry for `id`.
    pub fn info(&self, id: StageId) -> Option<StageInfo> {
        self.stages().get(id).map(|meta| StageInfo {
            upstream: meta.upstream,
            kind: meta.kind,
            name: meta.name,
            flags: meta.flags,
            depth: meta.depth,
        })
    }

    /// Names of the stages from the source down to `id`.
    pub fn lineage(&self, id: StageId) -> Vec<&'static str> {
        let stages = self.stages();
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match stages.get(current) {
                Some(meta) => {
                    names.push(meta.name);
                    cursor = meta.upstream;
                }
                None => break,
            }
        }
        names.reverse();
        names
    }

    // ========================================================================
    // Chain Settings
    // ========================================================================

    /// Select parallel or sequential evaluation for the whole chain.
    pub fn set_parallel(&self, parallel: bool) {
        self.parallel.store(parallel, Ordering::Relaxed);
    }

    /// Whether the chain evaluates in parallel.
    pub fn is_parallel(&self) -> bool {
        self.parallel.load(Ordering::Relaxed)
    }

    /// Install a validated configuration and its optional dedicated pool.
    pub fn configure(&self, config: EngineConfig, pool: Option<Arc<ThreadPool>>) {
        *self.settings() = Settings { config, pool };
    }

    /// Current configuration.
    pub fn config(&self) -> EngineConfig {
        self.settings().config.clone()
    }

    /// Dedicated worker pool, if one was configured.
    pub fn pool(&self) -> Option<Arc<ThreadPool>> {
        self.settings().pool.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_links_upstream() {
        let (graph, source) = StageGraph::with_source("source", StreamFlags::ORDERED);
        let mapped = graph.append(source, StageKind::Stateless, "map", StreamFlags::ORDERED);
        assert!(!graph.is_available(source));
        assert!(graph.is_available(mapped));
        assert_eq!(graph.info(mapped).map(|i| i.depth), Some(1));
        assert_eq!(graph.lineage(mapped), vec!["source", "map"]);
    }

    #[test]
    fn test_branching_poisons_second_branch() {
        let (graph, source) = StageGraph::with_source("source", StreamFlags::EMPTY);
        let first = graph.append(source, StageKind::Stateless, "map", StreamFlags::EMPTY);
        let second = graph.append(source, StageKind::Stateless, "filter", StreamFlags::EMPTY);
        assert!(graph.consume(first).is_ok());
        assert!(graph.consume(second).is_err_and(|e| e.is_reuse()));
        assert!(graph.consume(first).is_err());
    }
}

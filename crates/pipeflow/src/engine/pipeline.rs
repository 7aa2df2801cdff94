//! Typed stage chain and evaluation entry points.
//!
//! ## Purpose
//!
//! This module defines [`Pipeline`], the user-facing handle on the tail of a
//! stage chain, and [`Stage`], one typed link of that chain. Appending a stage
//! records it in the chain's arena and wraps the previous tail. A terminal
//! call claims the tail, turns the chain into a partition, and hands it to the
//! terminal operation's sequential or parallel path.
//!
//! ## Design notes
//!
//! * **Closed stage kinds**: [`StageBody`] is an enum over source, stateless,
//!   and stateful stages, matched exhaustively when partitions are built.
//! * **Type erasure per link**: Each non-source stage stores its upstream
//!   behind a link trait object, so the element type may change at every map.
//! * **By-value handles**: Builders take `self`, so ordinary use never
//!   reuses a chain; cloned handles are caught by the arena.
//!
//! ## Key concepts
//!
//! * **Partition construction**: Sequential mode wraps every stage around the
//!   source. Parallel mode wraps stateless stages and lets each stateful stage
//!   replace its upstream partition.
//!
//! ## Invariants
//!
//! * The source cursor is taken exactly once.
//! * Flags are computed once, when the stage is appended.

// External dependencies
use std::sync::{Arc, Mutex, PoisonError};

// Internal dependencies
use crate::engine::config::EngineConfig;
use crate::engine::graph::{StageGraph, StageId, StageKind};
use crate::engine::partition::{EvalPlan, Partition, SourcePartition, StageOp, StatefulOp, WrappedPartition};
use crate::engine::terminal::TerminalOp;
use crate::engine::validator::Validator;
use crate::primitives::cursor::Cursor;
use crate::primitives::errors::{PipelineError, PipelineResult};
use crate::primitives::flags::{FlagDelta, StreamFlags};
use crate::primitives::sink::Sink;

// ============================================================================
// Stage Links
// ============================================================================

/// Upstream-erased link of a stateless stage.
pub trait StatelessLink<T>: Send + Sync {
    /// Partition of this stage's output.
    fn wrap(&self, plan: &EvalPlan) -> PipelineResult<Box<dyn Partition<T>>>;
}

/// Upstream-erased link of a stateful stage.
pub trait StatefulLink<T>: Send + Sync {
    /// Partition wrapping the stage's sink around its upstream.
    fn sequential(&self, plan: &EvalPlan) -> PipelineResult<Box<dyn Partition<T>>>;

    /// Partition produced by the stage's parallel evaluation.
    fn parallel_lazy(&self, plan: &EvalPlan) -> PipelineResult<Box<dyn Partition<T>>>;
}

struct StatelessNode<In, O> {
    upstream: Arc<Stage<In>>,
    op: Arc<O>,
    output: StreamFlags,
}

impl<In, Out, O> StatelessLink<Out> for StatelessNode<In, O>
where
    In: Send + 'static,
    Out: Send + 'static,
    O: StageOp<In, Out> + 'static,
{
    fn wrap(&self, plan: &EvalPlan) -> PipelineResult<Box<dyn Partition<Out>>> {
        let inner = self.upstream.partition(plan)?;
        let ctx = plan.context(self.upstream.flags, self.output);
        Ok(Box::new(WrappedPartition::<In, Out, O>::new(
            inner,
            Arc::clone(&self.op),
            ctx,
        )))
    }
}

struct StatefulNode<T, O> {
    upstream: Arc<Stage<T>>,
    op: Arc<O>,
    name: &'static str,
    output: StreamFlags,
}

impl<T, O> StatefulLink<T> for StatefulNode<T, O>
where
    T: Send + 'static,
    O: StatefulOp<T> + 'static,
{
    fn sequential(&self, plan: &EvalPlan) -> PipelineResult<Box<dyn Partition<T>>> {
        let inner = self.upstream.partition(plan)?;
        let ctx = plan.context(self.upstream.flags, self.output);
        Ok(Box::new(WrappedPartition::<T, T, O>::new(
            inner,
            Arc::clone(&self.op),
            ctx,
        )))
    }

    fn parallel_lazy(&self, plan: &EvalPlan) -> PipelineResult<Box<dyn Partition<T>>> {
        let inner = self.upstream.partition(plan)?;
        let ctx = plan.context(self.upstream.flags, self.output);
        log::debug!(
            "parallel barrier at stateful stage '{}' (input {:?})",
            self.name,
            ctx.input
        );
        Ok(self.op.evaluate_parallel_lazy(inner, &ctx, plan))
    }
}

// ============================================================================
// Stage
// ============================================================================

/// Payload of a stage, by kind.
pub enum StageBody<T> {
    /// The source cursor, taken by the first evaluation.
    Source(Mutex<Option<Box<dyn Cursor<T>>>>),
    /// A stateless intermediate stage.
    Stateless(Box<dyn StatelessLink<T>>),
    /// A stateful intermediate stage.
    Stateful(Box<dyn StatefulLink<T>>),
}

/// One typed link of a stage chain.
pub struct Stage<T> {
    id: StageId,
    graph: Arc<StageGraph>,
    flags: StreamFlags,
    body: StageBody<T>,
}

impl<T: Send + 'static> Stage<T> {
    /// Arena handle of this stage.
    pub fn id(&self) -> StageId {
        self.id
    }

    /// Combined flags at this stage's output.
    pub fn flags(&self) -> StreamFlags {
        self.flags
    }

    /// Build the partition producing this stage's output.
    pub fn partition(&self, plan: &EvalPlan) -> PipelineResult<Box<dyn Partition<T>>> {
        match &self.body {
            StageBody::Source(slot) => {
                let cursor = slot
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take()
                    .ok_or(PipelineError::PipelineReuse {
                        stage: "source",
                        depth: 0,
                    })?;
                Ok(Box::new(SourcePartition::new(cursor)))
            }
            StageBody::Stateless(link) => link.wrap(plan),
            StageBody::Stateful(link) if plan.is_parallel() => link.parallel_lazy(plan),
            StageBody::Stateful(link) => link.sequential(plan),
        }
    }
}

// ============================================================================
// Pipeline Handle
// ============================================================================

/// Handle on the tail of a lazy stage chain.
pub struct Pipeline<T> {
    stage: Arc<Stage<T>>,
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            stage: Arc::clone(&self.stage),
        }
    }
}

impl<T> core::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stage", &self.stage.id)
            .field("flags", &self.stage.flags)
            .field("parallel", &self.stage.graph.is_parallel())
            .finish()
    }
}

impl<T: Send + 'static> Pipeline<T> {
    /// Start a chain whose source is `cursor`.
    pub fn from_cursor(cursor: Box<dyn Cursor<T>>) -> Self {
        let flags = StreamFlags::for_source(cursor.characteristics());
        let (graph, id) = StageGraph::with_source("source", flags);
        Self {
            stage: Arc::new(Stage {
                id,
                graph,
                flags,
                body: StageBody::Source(Mutex::new(Some(cursor))),
            }),
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Combined flags at the tail.
    pub fn flags(&self) -> StreamFlags {
        self.stage.flags
    }

    /// Distance of the tail from the source.
    pub fn depth(&self) -> usize {
        self.stage
            .graph
            .info(self.stage.id)
            .map_or(0, |info| info.depth)
    }

    /// Operation names from the source to the tail.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stage.graph.lineage(self.stage.id)
    }

    /// Whether this handle can still be extended or evaluated.
    pub fn is_available(&self) -> bool {
        self.stage.graph.is_available(self.stage.id)
    }

    /// Configuration in effect for the chain.
    pub fn config(&self) -> EngineConfig {
        self.stage.graph.config()
    }

    // ========================================================================
    // Execution Mode
    // ========================================================================

    /// Whether terminal evaluation will run in parallel.
    pub fn is_parallel(&self) -> bool {
        self.stage.graph.is_parallel()
    }

    /// Evaluate the whole chain in parallel.
    pub fn parallel(self) -> Self {
        self.stage.graph.set_parallel(true);
        self
    }

    /// Evaluate the whole chain sequentially.
    pub fn sequential(self) -> Self {
        self.stage.graph.set_parallel(false);
        self
    }

    /// Attach an engine configuration to the chain.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for rejected values and `ThreadPool` if the
    /// dedicated pool cannot be built.
    pub fn with_config(self, config: EngineConfig) -> PipelineResult<Self> {
        Validator::validate_config(&config)?;
        let pool = match config.parallelism {
            Some(threads) => {
                log::debug!("building dedicated pool with {threads} threads");
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("pipeflow-worker-{i}"))
                    .build()?;
                Some(Arc::new(pool))
            }
            None => None,
        };
        self.stage.graph.configure(config, pool);
        Ok(self)
    }

    // ========================================================================
    // Stage Appending
    // ========================================================================

    /// Append a stateless stage applying `op` with flag delta `delta`.
    pub fn append_stateless<U, O>(self, name: &'static str, delta: FlagDelta, op: O) -> Pipeline<U>
    where
        U: Send + 'static,
        O: StageOp<T, U> + 'static,
    {
        let flags = self.stage.flags.combine(delta);
        let graph = Arc::clone(&self.stage.graph);
        let id = graph.append(self.stage.id, StageKind::Stateless, name, flags);
        log::trace!("appended stateless stage '{name}' as {id} with {flags:?}");
        let link = StatelessNode {
            upstream: self.stage,
            op: Arc::new(op),
            output: flags,
        };
        Pipeline {
            stage: Arc::new(Stage {
                id,
                graph,
                flags,
                body: StageBody::Stateless(Box::new(link)),
            }),
        }
    }

    /// Append a stateful stage applying `op` with flag delta `delta`.
    pub fn append_stateful<O>(self, name: &'static str, delta: FlagDelta, op: O) -> Pipeline<T>
    where
        O: StatefulOp<T> + 'static,
    {
        let flags = self.stage.flags.combine(delta);
        let graph = Arc::clone(&self.stage.graph);
        let id = graph.append(self.stage.id, StageKind::Stateful, name, flags);
        log::trace!("appended stateful stage '{name}' as {id} with {flags:?}");
        let link = StatefulNode {
            upstream: self.stage,
            op: Arc::new(op),
            name,
            output: flags,
        };
        Pipeline {
            stage: Arc::new(Stage {
                id,
                graph,
                flags,
                body: StageBody::Stateful(Box::new(link)),
            }),
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Consume the chain with a terminal operation.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` if the tail was already consumed or superseded,
    /// or the first element failure raised during evaluation.
    pub fn evaluate<O: TerminalOp<T>>(self, op: &O) -> PipelineResult<O::Output> {
        let graph = Arc::clone(&self.stage.graph);
        graph.consume(self.stage.id)?;
        let plan = EvalPlan::new(graph.is_parallel(), graph.config(), graph.pool());
        let flags = self.stage.flags.combine(op.op_flags());
        log::debug!(
            "evaluating {} chain {:?} with terminal flags {:?}",
            if plan.is_parallel() { "parallel" } else { "sequential" },
            graph.lineage(self.stage.id),
            flags
        );
        let stage = &self.stage;
        let output = plan.install(|| -> PipelineResult<O::Output> {
            let partition = stage.partition(&plan)?;
            Ok(if plan.is_parallel() {
                op.evaluate_parallel(partition, flags, &plan)
            } else {
                op.evaluate_sequential(partition, flags, &plan)
            })
        })?;
        match plan.errors().take() {
            Some(error) => Err(error),
            None => Ok(output),
        }
    }

    /// Sequentially push every element into an already-begun `sink`,
    /// stopping early once it requests cancellation.
    ///
    /// # Errors
    ///
    /// Returns `PipelineReuse` or the first element failure, as [`evaluate`](Self::evaluate).
    pub fn drive_into(self, sink: &mut dyn Sink<T>) -> PipelineResult<()> {
        let graph = Arc::clone(&self.stage.graph);
        graph.consume(self.stage.id)?;
        let plan = EvalPlan::new(false, graph.config(), None);
        let partition = self.stage.partition(&plan)?;
        partition.drive(sink, true);
        match plan.errors().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

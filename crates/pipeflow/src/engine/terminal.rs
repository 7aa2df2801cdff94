//! Terminal operation contract.
//!
//! A [`TerminalOp`] describes how to consume a fully-wrapped chain. It has an
//! independent sequential and parallel path and declares the flag delta it
//! applies at the end of the chain (SHORT_CIRCUIT for matches and finds,
//! ORDERED cleared for order-insensitive consumers).

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition};
use crate::primitives::flags::{FlagDelta, StreamFlags};

/// A way of consuming a pipeline into a result.
pub trait TerminalOp<T>: Sync {
    /// Result of the evaluation.
    type Output: Send;

    /// Flags this operation forces on or off at the terminal.
    fn op_flags(&self) -> FlagDelta {
        FlagDelta::NONE
    }

    /// Fold the partition through a single consumer on the calling thread.
    fn evaluate_sequential(
        &self,
        partition: Box<dyn Partition<T>>,
        flags: StreamFlags,
        plan: &EvalPlan,
    ) -> Self::Output;

    /// Decompose the partition into a task tree and combine leaf results.
    fn evaluate_parallel(
        &self,
        partition: Box<dyn Partition<T>>,
        flags: StreamFlags,
        plan: &EvalPlan,
    ) -> Self::Output;
}

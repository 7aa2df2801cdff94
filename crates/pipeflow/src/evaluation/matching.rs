//! Short-circuiting match terminals.
//!
//! ## Purpose
//!
//! [`MatchOp`] answers any-match, all-match and none-match. Each kind stops at
//! the first element whose predicate outcome decides the answer.
//!
//! ## Key concepts
//!
//! * **Deciding outcome**: any stops on `true` and answers `true`; all stops
//!   on `false` and answers `false`; none stops on `true` and answers `false`.
//! * **Shared verdict**: In parallel, the first deciding leaf raises a flag
//!   that every other leaf's consumer reports as a cancellation request, and
//!   cancels the task tree so no further splits pull from the source.
//!
//! ## Invariants
//!
//! * The result depends only on the multiset of predicate outcomes, never on
//!   ordering, so ORDERED is cleared at the terminal.

// External dependencies
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Internal dependencies
use crate::engine::partition::{EvalPlan, Partition};
use crate::engine::terminal::TerminalOp;
use crate::evaluation::task::{TaskNode, TaskTree};
use crate::primitives::flags::{FlagDelta, StreamFlags};
use crate::primitives::sink::Sink;

// ============================================================================
// Match Kind
// ============================================================================

/// Which quantified question a match answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Does any element match?
    Any,
    /// Do all elements match?
    All,
    /// Does no element match?
    None,
}

impl MatchKind {
    /// Predicate outcome that decides the answer.
    pub const fn stop_on(self) -> bool {
        match self {
            MatchKind::Any | MatchKind::None => true,
            MatchKind::All => false,
        }
    }

    /// Answer once a deciding outcome is seen.
    pub const fn short_result(self) -> bool {
        match self {
            MatchKind::Any => true,
            MatchKind::All | MatchKind::None => false,
        }
    }
}

// ============================================================================
// Match Operation
// ============================================================================

/// Terminal evaluating a quantified predicate.
pub struct MatchOp<P> {
    kind: MatchKind,
    predicate: P,
}

impl<P> MatchOp<P> {
    /// Match of `kind` over `predicate`.
    pub fn new(kind: MatchKind, predicate: P) -> Self {
        Self { kind, predicate }
    }
}

struct MatchSink<'a, P> {
    predicate: &'a P,
    stop_on: bool,
    decided: bool,
    verdict: Option<&'a AtomicBool>,
}

impl<T, P: Fn(&T) -> bool> Sink<T> for MatchSink<'_, P> {
    fn accept(&mut self, item: T) {
        if !self.decided && (self.predicate)(&item) == self.stop_on {
            self.decided = true;
            if let Some(verdict) = self.verdict {
                verdict.store(true, Ordering::Release);
            }
        }
    }

    fn cancellation_requested(&self) -> bool {
        self.decided || self.verdict.is_some_and(|v| v.load(Ordering::Acquire))
    }
}

impl<T, P> TerminalOp<T> for MatchOp<P>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync,
{
    type Output = bool;

    fn op_flags(&self) -> FlagDelta {
        FlagDelta::new(StreamFlags::SHORT_CIRCUIT, StreamFlags::ORDERED)
    }

    fn evaluate_sequential(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, _plan: &EvalPlan) -> bool {
        let mut sink = MatchSink {
            predicate: &self.predicate,
            stop_on: self.kind.stop_on(),
            decided: false,
            verdict: None,
        };
        partition.drive(&mut sink, flags.is_short_circuit());
        if sink.decided {
            self.kind.short_result()
        } else {
            !self.kind.short_result()
        }
    }

    fn evaluate_parallel(&self, partition: Box<dyn Partition<T>>, flags: StreamFlags, plan: &EvalPlan) -> bool {
        let verdict = AtomicBool::new(false);
        let tree = TaskTree::new(plan, partition.estimated_size());
        tree.run(
            partition,
            |leaf, node: &Arc<TaskNode>| {
                if verdict.load(Ordering::Acquire) || node.is_canceled() {
                    return;
                }
                let mut sink = MatchSink {
                    predicate: &self.predicate,
                    stop_on: self.kind.stop_on(),
                    decided: false,
                    verdict: Some(&verdict),
                };
                leaf.drive(&mut sink, flags.is_short_circuit());
                if sink.decided {
                    node.cancel_all();
                }
            },
            |(), ()| (),
        );
        if verdict.load(Ordering::Acquire) {
            self.kind.short_result()
        } else {
            !self.kind.short_result()
        }
    }
}

//! # pipeflow: lazy, composable sequence pipelines for Rust
//!
//! Build a chain of operations over a source of elements, then run it once
//! with a terminal operation, either sequentially or with fork/join
//! parallelism on a rayon pool.
//!
//! ## What is a pipeline?
//!
//! A pipeline is a source (a vector, an iterator, a range, a generator)
//! followed by any number of intermediate stages (`map`, `filter`, `sorted`,
//! `distinct`, `limit`, ...) and exactly one terminal operation (`to_vec`,
//! `count`, `reduce`, `find_first`, ...). Stages are recorded, not run: no
//! element moves until the terminal is called. Each stage statically tracks
//! what is known about the elements flowing through it (ordered, sorted,
//! distinct, sized, short-circuiting) and evaluation picks its strategy from
//! those flags.
//!
//! ## Quick Start
//!
//! ```rust
//! use pipeflow::prelude::*;
//!
//! let words = Streams::of(vec!["pear", "fig", "apple", "fig", "kiwi"])
//!     .distinct()
//!     .filter(|w| w.len() > 3)
//!     .map(|w| w.to_uppercase())
//!     .to_vec()?;
//!
//! assert_eq!(words, vec!["PEAR", "APPLE", "KIWI"]);
//! # Result::<(), PipelineError>::Ok(())
//! ```
//!
//! ### Parallel Evaluation
//!
//! ```rust
//! use pipeflow::prelude::*;
//!
//! let total = Streams::range(0, 10_000)
//!     .parallel()
//!     .filter(|x| x % 3 == 0)
//!     .map(|x| x * 2)
//!     .sum()?;
//!
//! assert_eq!(total, (0..10_000).filter(|x| x % 3 == 0).map(|x| x * 2).sum::<i32>());
//! # Result::<(), PipelineError>::Ok(())
//! ```
//!
//! ### Short-circuiting Infinite Sources
//!
//! ```rust
//! use pipeflow::prelude::*;
//!
//! let powers = Streams::iterate(1u64, |x| x * 2).limit(10)?.to_vec()?;
//! assert_eq!(powers.last(), Some(&512));
//! # Result::<(), PipelineError>::Ok(())
//! ```
//!
//! ### Result and Error Handling
//!
//! Every terminal returns `Result<_, PipelineError>`. A chain can be
//! consumed once; running a second terminal on a cloned handle, or on a
//! handle that already has a stage appended after it, fails with
//! `PipelineReuse`:
//!
//! ```rust
//! use pipeflow::prelude::*;
//!
//! let source = Streams::of(vec![1, 2, 3]);
//! let copy = source.clone();
//! assert_eq!(source.count()?, 3);
//! assert!(copy.count().is_err_and(|e| e.is_reuse()));
//! # Result::<(), PipelineError>::Ok(())
//! ```
//!
//! ## Numeric Pipelines
//!
//! [`DoublePipeline`](prelude::DoublePipeline) sums with compensated
//! floating-point addition, so cancelling large terms does not swallow small
//! ones:
//!
//! ```rust
//! use pipeflow::prelude::*;
//!
//! let sum = Streams::doubles(vec![1e16, 1.0, -1e16]).sum()?;
//! assert_eq!(sum, 1.0);
//! # Result::<(), PipelineError>::Ok(())
//! ```
//!
//! ## Configuration
//!
//! An [`EngineConfig`](prelude::EngineConfig) controls the task-tree shape
//! and may request a dedicated worker pool for one chain.

// Layer 1: Primitives - flags, sinks, cursors and buffers.
mod primitives;

// Layer 2: Math - summation, statistics and comparators.
mod math;

// Layer 3: Engine - stage chain, partitions and configuration.
mod engine;

// Layer 4: Evaluation - terminal operations and fork/join.
mod evaluation;

// Layer 5: Algorithms - intermediate operations.
mod algorithms;

// Layer 6: Adapters - pipeline shapes.
mod adapters;

// High-level entry points.
mod api;

// Standard pipeflow prelude.
pub mod prelude {
    pub use crate::adapters::double::DoublePipeline;
    pub use crate::adapters::int::IntPipeline;
    pub use crate::api::{
        comparing, double_order, natural_order, nulls_first, nulls_last, reverse_order, reversed, then_comparing,
        CompensatedSum, DoubleSummaryStatistics, EngineConfig, IntSummaryStatistics, Nullable, Pipeline,
        PipelineError, PipelineResult, Streams,
    };
}

// Internal modules for integration tests and extension crates.
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod math {
        pub use crate::math::*;
    }
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    pub mod adapters {
        pub use crate::adapters::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}

#![warn(missing_docs)]
//! # Gammaflow
//!
//! Descriptive statistics over a gamma-distributed dataset, computed by a
//! dataflow graph that is built once and re-evaluated across a parameter sweep.
//!
//! - **Typed graph**: nodes are registered with their dependencies, so the
//!   graph is acyclic by construction and values flow with their Rust types
//! - **Pluggable execution**: the same graph runs sequentially or on a
//!   fixed-size worker pool with identical results
//! - **Live parameters**: shape and scale are `Param` cells read on every
//!   evaluation, so updating them between rounds needs no rebuild
//! - **Reproducible**: one seeded random source is shared across rounds and
//!   keeps advancing
//!
//! ## Quick Start
//!
//! ```
//! use gammaflow::prelude::*;
//!
//! let sweep = Sweep::new(SweepConfig::default()).unwrap();
//! let rounds = sweep
//!     .run(&SequentialExecutor, |report| {
//!         println!("{}", format_round_line(report, 3));
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(rounds.len(), 3);
//! ```
//!
//! ## Custom Graphs
//!
//! ```
//! use gammaflow::{BoxError, GraphBuilder, SequentialExecutor};
//!
//! let mut builder = GraphBuilder::new();
//! let x = builder.root("x", || Ok::<_, BoxError>(2.0_f64));
//! let y = builder.node("double", (x,), |(x,)| Ok::<_, BoxError>(*x * 2.0));
//! let graph = builder.build().unwrap();
//! assert_eq!(*graph.evaluate(&SequentialExecutor).unwrap().get(y).unwrap(), 4.0);
//! ```

// Re-export graph runtime
pub use gammaflow_graph::{
    BoxError, Dependencies, Evaluation, Executor, Graph, GraphBuilder, GraphError, Node, NodeId,
    ParallelExecutor, Param, SequentialExecutor,
};

// Re-export statistics
pub use gammaflow_stats::{
    RandomSource, SamplingError, StatsError, mean, median, mode, sample_gamma, std_dev,
};

// Re-export pipeline
pub use gammaflow_core::{
    KeyFacts, KeyFactsGraph, RoundReport, Sweep, SweepConfig, SweepError, build_graph,
};

// Re-export reporting
pub use gammaflow_report::{
    OutputFormat, SweepReport, format_round_line, format_significant, generate_csv_report,
    generate_json_report,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Executor, GraphBuilder, KeyFacts, ParallelExecutor, Param, RandomSource,
        SequentialExecutor, Sweep, SweepConfig, build_graph, format_round_line,
    };
}

/// Run the Gammaflow CLI harness.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     gammaflow::run()
/// }
/// ```
pub use gammaflow_cli::run;

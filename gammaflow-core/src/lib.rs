#![warn(missing_docs)]
//! Gammaflow Core - Key Facts Pipeline
//!
//! Wires the statistics into a fixed computation graph and drives it across a
//! parameter sweep:
//! - `build_graph` constructs the graph once from parameter cells and a
//!   shared random source
//! - `Sweep` evaluates it round after round, growing shape and scale between
//!   rounds while the random source keeps advancing
//!
//! ```text
//!  rand gen   sample size   shape   scale
//!      \           |          |      /
//!       └──────── generate gamma ───┘
//!          /        |        |       \
//!     average    median     mode      │
//!        │ \________________________  │
//!        │                          stddev
//!         \        |        |       /
//!          └── aggregate results ──┘
//! ```

mod pipeline;
mod sweep;

pub use pipeline::{KeyFacts, KeyFactsGraph, build_graph};
pub use sweep::{RoundReport, Sweep, SweepConfig, SweepError};

pub use gammaflow_stats::DEFAULT_SEED;

/// Samples drawn per round when not configured
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Rounds per sweep when not configured
pub const DEFAULT_ROUNDS: u32 = 3;

//! Parameter Sweep
//!
//! Re-evaluates the key facts graph for a fixed number of rounds. After each
//! round, the round counter is added to both shape and scale:
//!
//! ```text
//! round 1: shape=s,     scale=k       then += 1
//! round 2: shape=s+1,   scale=k+1     then += 2
//! round 3: shape=s+3,   scale=k+3
//! ```
//!
//! The random source is never reset, so a round's dataset depends on every
//! draw made before it. Reproducing a round means replaying the whole sweep
//! from the same seed.

use crate::pipeline::{KeyFacts, KeyFactsGraph, build_graph};
use crate::{DEFAULT_ROUNDS, DEFAULT_SAMPLE_SIZE};
use gammaflow_graph::{Executor, GraphError, Param};
use gammaflow_stats::{DEFAULT_SEED, RandomSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

/// Sweep parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Samples drawn per round
    pub sample_size: usize,
    /// Initial gamma shape
    pub shape: f64,
    /// Initial gamma scale
    pub scale: f64,
    /// Number of rounds
    pub rounds: u32,
    /// Seed of the random source
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            shape: 1.0,
            scale: 1.0,
            rounds: DEFAULT_ROUNDS,
            seed: DEFAULT_SEED,
        }
    }
}

/// Outcome of one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1
    pub round: u32,
    /// Shape used for this round
    pub shape: f64,
    /// Scale used for this round
    pub scale: f64,
    /// Statistics of this round's dataset
    pub facts: KeyFacts,
}

/// Errors from running a sweep
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SweepError {
    /// The graph could not be built.
    #[error("Failed to build computation graph: {0}")]
    Build(#[source] GraphError),

    /// An evaluation failed; the sweep stops at this round.
    #[error("Round {round} failed: {source}")]
    RoundFailed {
        /// Failed round
        round: u32,
        /// Evaluation error
        #[source]
        source: GraphError,
    },

    /// The round's result could not be written out.
    #[error("Failed to emit round {round}: {source}")]
    Emit {
        /// Round being emitted
        round: u32,
        /// Write error
        #[source]
        source: std::io::Error,
    },
}

/// A key facts graph together with the inputs it reads
///
/// The sweep owns the parameter cells and a handle to the random source; the
/// graph holds its own handles and reads them at evaluation time.
#[derive(Debug)]
pub struct Sweep {
    config: SweepConfig,
    shape: Param,
    scale: Param,
    source: RandomSource,
    graph: KeyFactsGraph,
}

impl Sweep {
    /// Seed the random source and build the graph once
    pub fn new(config: SweepConfig) -> Result<Self, SweepError> {
        let shape = Param::new(config.shape);
        let scale = Param::new(config.scale);
        let source = RandomSource::from_seed(config.seed);
        let graph =
            build_graph(config.sample_size, &shape, &scale, &source).map_err(SweepError::Build)?;

        Ok(Self {
            config,
            shape,
            scale,
            source,
            graph,
        })
    }

    /// Configuration the sweep was created with
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// The graph driven by this sweep
    pub fn graph(&self) -> &KeyFactsGraph {
        &self.graph
    }

    /// Shape the next evaluation will use
    pub fn shape(&self) -> f64 {
        self.shape.get()
    }

    /// Scale the next evaluation will use
    pub fn scale(&self) -> f64 {
        self.scale.get()
    }

    /// Seed of the shared random source
    pub fn seed(&self) -> u64 {
        self.source.seed()
    }

    /// Run every round under `executor`
    ///
    /// `emit` is called with each round's report before the parameters are
    /// advanced. The first failing round ends the sweep with an error.
    pub fn run<F>(&self, executor: &dyn Executor, mut emit: F) -> Result<Vec<RoundReport>, SweepError>
    where
        F: FnMut(&RoundReport) -> std::io::Result<()>,
    {
        let mut reports = Vec::with_capacity(self.config.rounds.min(64) as usize);

        for count in 1..=self.config.rounds {
            let shape = self.shape.get();
            let scale = self.scale.get();
            info!(
                round = count,
                shape,
                scale,
                executor = executor.name(),
                "evaluating round"
            );

            let facts = self.graph.evaluate(executor).map_err(|source| {
                error!(round = count, error = %source, "round failed");
                SweepError::RoundFailed {
                    round: count,
                    source,
                }
            })?;

            let report = RoundReport {
                round: count,
                shape,
                scale,
                facts,
            };
            emit(&report).map_err(|source| SweepError::Emit {
                round: count,
                source,
            })?;
            reports.push(report);

            self.shape.add(f64::from(count));
            self.scale.add(f64::from(count));
        }

        Ok(reports)
    }
}

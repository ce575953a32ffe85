//! Key Facts Graph
//!
//! Builds the fixed topology: four roots feed the gamma sampler, whose
//! dataset feeds the four statistics, whose results feed the aggregator.
//! Standard deviation depends on the mean node rather than recomputing it.

use gammaflow_graph::{Executor, Graph, GraphBuilder, GraphError, Node, Param};
use gammaflow_stats::{RandomSource, mean, median, mode, sample_gamma, std_dev};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

/// Statistics of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyFacts {
    /// Arithmetic mean
    pub avg: f64,
    /// Population standard deviation
    pub stddev: f64,
    /// Median
    pub median: f64,
    /// Mode of the truncated samples
    pub mode: i64,
}

impl KeyFacts {
    /// Package the four statistics
    pub fn aggregate(avg: f64, stddev: f64, median: f64, mode: i64) -> Self {
        Self {
            avg,
            stddev,
            median,
            mode,
        }
    }
}

impl fmt::Display for KeyFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avg={}, stddev={}, median={}, mode={}",
            self.avg, self.stddev, self.median, self.mode
        )
    }
}

/// The key facts graph with handles to the nodes callers read
#[derive(Debug)]
pub struct KeyFactsGraph {
    graph: Graph,
    dataset: Node<Vec<f64>>,
    facts: Node<KeyFacts>,
}

impl KeyFactsGraph {
    /// Underlying graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Node producing the sampled dataset
    pub fn dataset(&self) -> Node<Vec<f64>> {
        self.dataset
    }

    /// Terminal aggregator node
    pub fn facts(&self) -> Node<KeyFacts> {
        self.facts
    }

    /// Evaluate the whole graph and return the aggregated statistics
    pub fn evaluate(&self, executor: &dyn Executor) -> Result<KeyFacts, GraphError> {
        let evaluation = self.graph.evaluate(executor)?;
        let facts = evaluation.get(self.facts)?;
        Ok(*facts)
    }
}

/// Build the key facts graph
///
/// `shape` and `scale` are read when each evaluation starts, so changes made
/// between evaluations are picked up without rebuilding. `source` is cloned as
/// a handle; the sampler node is its only user inside the graph.
pub fn build_graph(
    sample_size: usize,
    shape: &Param,
    scale: &Param,
    source: &RandomSource,
) -> Result<KeyFactsGraph, GraphError> {
    let mut builder = GraphBuilder::new();

    let source = source.clone();
    let gen_node = builder.root("rand gen", move || Ok::<_, Infallible>(source.clone()));
    let size_node = builder.root("sample size", move || Ok::<_, Infallible>(sample_size));
    let shape_cell = shape.clone();
    let shape_node = builder.root("shape", move || Ok::<_, Infallible>(shape_cell.get()));
    let scale_cell = scale.clone();
    let scale_node = builder.root("scale", move || Ok::<_, Infallible>(scale_cell.get()));

    let data_node = builder.node(
        "generate gamma",
        (size_node, shape_node, scale_node, gen_node),
        |(size, shape, scale, source)| sample_gamma(*size, *shape, *scale, &source),
    );

    let avg_node = builder.node("average", data_node, |data| mean(&data));
    let stddev_node = builder.node("stddev", (data_node, avg_node), |(data, avg)| {
        std_dev(&data, *avg)
    });
    let median_node = builder.node("median", data_node, |data| median(&data));
    let mode_node = builder.node("mode", data_node, |data| mode(&data));

    let facts_node = builder.node(
        "aggregate results",
        (avg_node, stddev_node, median_node, mode_node),
        |(avg, stddev, median, mode)| {
            Ok::<_, Infallible>(KeyFacts::aggregate(*avg, *stddev, *median, *mode))
        },
    );

    Ok(KeyFactsGraph {
        graph: builder.build()?,
        dataset: data_node,
        facts: facts_node,
    })
}

#![warn(missing_docs)]
//! Gammaflow Graph - Typed Dataflow Runtime
//!
//! Builds a directed acyclic graph of typed computation nodes once, then
//! evaluates it as many times as needed under a pluggable execution strategy:
//! - `GraphBuilder` wires root and derived nodes, validating the topology
//! - `Graph::evaluate` runs every node once, dependencies first
//! - `SequentialExecutor` runs one ready node at a time
//! - `ParallelExecutor` runs ready nodes on a fixed-size Rayon pool
//! - `Param` cells let roots observe values changed between evaluations
//! - `Graph::to_dot` exports the topology for Graphviz
//!
//! # Example
//!
//! ```
//! use gammaflow_graph::{GraphBuilder, Param, SequentialExecutor};
//! use std::convert::Infallible;
//!
//! let x = Param::new(2.0);
//! let cell = x.clone();
//!
//! let mut builder = GraphBuilder::new();
//! let root = builder.root("x", move || Ok::<_, Infallible>(cell.get()));
//! let squared = builder.node("x^2", root, |x| Ok::<_, Infallible>(*x * *x));
//! let graph = builder.build().unwrap();
//!
//! let first = graph.evaluate(&SequentialExecutor).unwrap();
//! assert_eq!(*first.get(squared).unwrap(), 4.0);
//!
//! x.set(3.0);
//! let second = graph.evaluate(&SequentialExecutor).unwrap();
//! assert_eq!(*second.get(squared).unwrap(), 9.0);
//! ```

mod dot;
mod error;
mod executor;
mod graph;
mod node;
mod param;

pub use error::{BoxError, GraphError};
pub use executor::{Executor, ParallelExecutor, SequentialExecutor};
pub use graph::{Evaluation, EvaluationRun, Graph, GraphBuilder, NodeValues};
pub use node::{Dependencies, Node, NodeId};
pub use param::Param;

/// Default width of the worker pool used by `ParallelExecutor`
pub const DEFAULT_WORKERS: usize = 4;

//! Graph Errors

use crate::node::NodeId;
use thiserror::Error;

/// Boxed error returned by node computations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from graph construction and evaluation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// The dependency relation contains a cycle.
    #[error("Cycle detected among nodes: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    /// A node handle does not belong to this graph.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// A node computation returned an error.
    #[error("Node '{label}' failed: {source}")]
    NodeFailed {
        /// Label of the failing node
        label: String,
        /// Error returned by the computation
        #[source]
        source: BoxError,
    },

    /// A node was asked for a value of a different type than it produces.
    #[error("Node '{label}' does not produce the requested type")]
    TypeMismatch {
        /// Label of the node
        label: String,
    },

    /// A node has not produced a value in this evaluation.
    #[error("Node '{label}' has no value in this evaluation")]
    MissingValue {
        /// Label of the node
        label: String,
    },

    /// A node was run before all of its dependencies completed.
    #[error("Node '{label}' was run before its dependencies completed")]
    NotReady {
        /// Label of the node
        label: String,
    },

    /// A node was run twice within one evaluation.
    #[error("Node '{label}' was already evaluated")]
    AlreadyEvaluated {
        /// Label of the node
        label: String,
    },

    /// The executor returned without running every node.
    #[error("Evaluation incomplete: {completed} of {total} nodes ran")]
    Incomplete {
        /// Nodes that produced a value
        completed: usize,
        /// Nodes in the graph
        total: usize,
    },

    /// The worker pool could not be created.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl GraphError {
    /// Label of the node this error originates from, if any
    pub fn node_label(&self) -> Option<&str> {
        match self {
            GraphError::NodeFailed { label, .. }
            | GraphError::TypeMismatch { label }
            | GraphError::MissingValue { label }
            | GraphError::NotReady { label }
            | GraphError::AlreadyEvaluated { label } => Some(label),
            _ => None,
        }
    }
}

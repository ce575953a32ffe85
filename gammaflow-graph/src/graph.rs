//! Dependency Graph
//!
//! Wires typed nodes into a DAG and drives evaluations of it.
//!
//! ## Evaluation Flow
//!
//! ```text
//! GraphBuilder::root / ::node
//!        │
//!        ▼
//! GraphBuilder::build   validate handles, Kahn topological order
//!        │
//!        ▼
//! Graph::evaluate       fresh value slots + pending-dependency counters
//!        │
//!        ▼
//! Executor::execute     run ready nodes, release dependents as counts hit zero
//!        │
//!        ▼
//! Evaluation::get       typed access to any node's value
//! ```

use crate::error::{BoxError, GraphError};
use crate::executor::Executor;
use crate::node::{Dependencies, Node, NodeId};
use fxhash::FxHashSet;
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, trace};

pub(crate) type Value = Arc<dyn Any + Send + Sync>;

type Compute = Box<dyn Fn(&NodeValues<'_>) -> Result<Value, GraphError> + Send + Sync>;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

struct PendingNode {
    label: String,
    dependencies: Vec<NodeId>,
    compute: Compute,
}

pub(crate) struct NodeEntry {
    pub(crate) label: String,
    pub(crate) dependencies: Vec<usize>,
    compute: Compute,
}

/// Incrementally constructs a `Graph`
///
/// Nodes can only depend on nodes that already exist, so graphs built through
/// this API are acyclic by construction; `build` still verifies it.
pub struct GraphBuilder {
    id: u64,
    nodes: Vec<PendingNode>,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
        }
    }

    /// Add a root node: no dependencies, recomputed on every evaluation
    pub fn root<T, F, E>(&mut self, label: impl Into<String>, compute: F) -> Node<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.node(label, (), move |()| compute())
    }

    /// Add a node computed from the values of `dependencies`
    pub fn node<D, T, F, E>(&mut self, label: impl Into<String>, dependencies: D, compute: F) -> Node<T>
    where
        D: Dependencies + Send + Sync + 'static,
        T: Send + Sync + 'static,
        F: Fn(D::Values) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let label = label.into();
        let id = NodeId {
            graph: self.id,
            index: self.nodes.len(),
        };
        let dependency_ids = dependencies.ids();

        let node_label = label.clone();
        let compute: Compute = Box::new(move |values| {
            let inputs = dependencies.fetch(values)?;
            let value = compute(inputs).map_err(|e| GraphError::NodeFailed {
                label: node_label.clone(),
                source: e.into(),
            })?;
            Ok(Arc::new(value) as Value)
        });

        self.nodes.push(PendingNode {
            label,
            dependencies: dependency_ids,
            compute,
        });
        Node::new(id)
    }

    /// Number of nodes added so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been added
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate the topology and freeze it into a `Graph`
    pub fn build(self) -> Result<Graph, GraphError> {
        let count = self.nodes.len();
        let mut nodes = Vec::with_capacity(count);

        for pending in self.nodes {
            let mut seen = FxHashSet::default();
            let mut dependencies = Vec::with_capacity(pending.dependencies.len());
            for dep in pending.dependencies {
                if dep.graph != self.id || dep.index >= count {
                    return Err(GraphError::UnknownNode(dep));
                }
                // A node listed twice is still a single edge.
                if seen.insert(dep.index) {
                    dependencies.push(dep.index);
                }
            }
            nodes.push(NodeEntry {
                label: pending.label,
                dependencies,
                compute: pending.compute,
            });
        }

        let dependency_lists: Vec<Vec<usize>> =
            nodes.iter().map(|n| n.dependencies.clone()).collect();
        let topology = topological_order(&dependency_lists).map_err(|stuck| {
            GraphError::CycleDetected(stuck.iter().map(|&i| nodes[i].label.clone()).collect())
        })?;

        Ok(Graph {
            id: self.id,
            nodes,
            dependents: topology.dependents,
            order: topology.order,
        })
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Topology {
    dependents: Vec<Vec<usize>>,
    order: Vec<usize>,
}

/// Kahn's algorithm over per-node dependency lists
///
/// On failure, returns the nodes left with unresolved dependencies.
fn topological_order(dependencies: &[Vec<usize>]) -> Result<Topology, Vec<usize>> {
    let count = dependencies.len();
    let mut dependents = vec![Vec::new(); count];
    let mut remaining: Vec<usize> = dependencies.iter().map(Vec::len).collect();

    for (index, deps) in dependencies.iter().enumerate() {
        for &dep in deps {
            dependents[dep].push(index);
        }
    }

    let mut ready: VecDeque<usize> = (0..count).filter(|&i| remaining[i] == 0).collect();
    let mut order = Vec::with_capacity(count);

    while let Some(index) = ready.pop_front() {
        order.push(index);
        for &dependent in &dependents[index] {
            remaining[dependent] -= 1;
            if remaining[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    if order.len() != count {
        return Err((0..count).filter(|&i| remaining[i] > 0).collect());
    }

    Ok(Topology { dependents, order })
}

/// A validated, immutable computation graph
///
/// The topology is fixed; every call to `evaluate` recomputes all nodes.
pub struct Graph {
    pub(crate) id: u64,
    pub(crate) nodes: Vec<NodeEntry>,
    pub(crate) dependents: Vec<Vec<usize>>,
    pub(crate) order: Vec<usize>,
}

impl Graph {
    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Label of a node
    pub fn label(&self, id: NodeId) -> Result<&str, GraphError> {
        let index = self.index_of(id)?;
        Ok(&self.nodes[index].label)
    }

    /// Node labels in topological order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|&i| self.nodes[i].label.as_str())
    }

    /// Direct dependencies of a node
    pub fn dependencies_of(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        let index = self.index_of(id)?;
        Ok(self.nodes[index]
            .dependencies
            .iter()
            .map(|&i| self.node_id(i))
            .collect())
    }

    /// Nodes without dependencies
    pub fn roots(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|&i| self.nodes[i].dependencies.is_empty())
            .map(|i| self.node_id(i))
            .collect()
    }

    /// Run one full evaluation under `executor`
    ///
    /// Returns once every node has produced a value, or with the first error.
    pub fn evaluate(&self, executor: &dyn Executor) -> Result<Evaluation<'_>, GraphError> {
        let run = EvaluationRun::new(self);
        let started = Instant::now();

        executor.execute(&run)?;

        let evaluation = run.finish()?;
        debug!(
            executor = executor.name(),
            nodes = self.node_count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "evaluation complete"
        );
        Ok(evaluation)
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Result<usize, GraphError> {
        if id.graph != self.id || id.index >= self.nodes.len() {
            return Err(GraphError::UnknownNode(id));
        }
        Ok(id.index)
    }

    pub(crate) fn node_id(&self, index: usize) -> NodeId {
        NodeId {
            graph: self.id,
            index,
        }
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("nodes", &self.labels().collect::<Vec<_>>())
            .finish()
    }
}

/// Read access to the values produced so far in one evaluation
pub struct NodeValues<'a> {
    graph: &'a Graph,
    slots: &'a [OnceLock<Value>],
}

impl NodeValues<'_> {
    /// Value of `node`, if it has been computed
    pub fn get<T: Send + Sync + 'static>(&self, node: Node<T>) -> Result<Arc<T>, GraphError> {
        let index = self.graph.index_of(node.id())?;
        let label = &self.graph.nodes[index].label;
        let value = self.slots[index]
            .get()
            .ok_or_else(|| GraphError::MissingValue {
                label: label.clone(),
            })?;

        Arc::clone(value)
            .downcast::<T>()
            .map_err(|_| GraphError::TypeMismatch {
                label: label.clone(),
            })
    }
}

/// State of an evaluation in progress, driven by an `Executor`
///
/// Each node carries a counter of dependencies that have not completed yet.
/// `run_node` computes a node, stores its value and returns the dependents
/// whose counter reached zero, which are then ready to run.
pub struct EvaluationRun<'g> {
    graph: &'g Graph,
    slots: Vec<OnceLock<Value>>,
    pending: Vec<AtomicUsize>,
    completed: AtomicUsize,
}

impl<'g> EvaluationRun<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            slots: (0..graph.node_count()).map(|_| OnceLock::new()).collect(),
            pending: graph
                .nodes
                .iter()
                .map(|n| AtomicUsize::new(n.dependencies.len()))
                .collect(),
            completed: AtomicUsize::new(0),
        }
    }

    /// Nodes ready at the start of the evaluation
    pub fn initial_ready(&self) -> Vec<NodeId> {
        self.graph.roots()
    }

    /// Number of nodes in the graph being evaluated
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of nodes that have produced a value
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Compute a ready node and return the dependents it released
    pub fn run_node(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        let index = self.graph.index_of(id)?;
        let entry = &self.graph.nodes[index];

        if self.pending[index].load(Ordering::Acquire) != 0 {
            return Err(GraphError::NotReady {
                label: entry.label.clone(),
            });
        }

        trace!(node = %entry.label, "node started");
        let started = Instant::now();

        let value = (entry.compute)(&self.values())?;
        self.slots[index]
            .set(value)
            .map_err(|_| GraphError::AlreadyEvaluated {
                label: entry.label.clone(),
            })?;
        self.completed.fetch_add(1, Ordering::AcqRel);

        debug!(
            node = %entry.label,
            thread = std::thread::current().name().unwrap_or("main"),
            elapsed_us = started.elapsed().as_micros() as u64,
            "node finished"
        );

        let mut ready = Vec::new();
        for &dependent in &self.graph.dependents[index] {
            if self.pending[dependent].fetch_sub(1, Ordering::AcqRel) == 1 {
                ready.push(self.graph.node_id(dependent));
            }
        }
        Ok(ready)
    }

    fn values(&self) -> NodeValues<'_> {
        NodeValues {
            graph: self.graph,
            slots: &self.slots,
        }
    }

    fn finish(self) -> Result<Evaluation<'g>, GraphError> {
        let completed = self.completed();
        let total = self.node_count();
        if completed != total {
            return Err(GraphError::Incomplete { completed, total });
        }

        Ok(Evaluation {
            graph: self.graph,
            slots: self.slots,
        })
    }
}

/// Values produced by one completed evaluation
///
/// Dropping it releases every intermediate value of that evaluation.
pub struct Evaluation<'g> {
    graph: &'g Graph,
    slots: Vec<OnceLock<Value>>,
}

impl Evaluation<'_> {
    /// Value produced by `node`
    pub fn get<T: Send + Sync + 'static>(&self, node: Node<T>) -> Result<Arc<T>, GraphError> {
        NodeValues {
            graph: self.graph,
            slots: &self.slots,
        }
        .get(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SequentialExecutor;
    use crate::param::Param;
    use std::convert::Infallible;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_topological_sort() {
        // 0 -> 1 -> 3, 0 -> 2 -> 3
        let deps = vec![vec![], vec![0], vec![0], vec![1, 2]];
        let topology = topological_order(&deps).unwrap();

        let pos = |n: usize| topology.order.iter().position(|&x| x == n).unwrap();
        assert_eq!(pos(0), 0);
        assert!(pos(1) < pos(3));
        assert!(pos(2) < pos(3));
        assert_eq!(topology.dependents[0], vec![1, 2]);
    }

    #[test]
    fn test_cycle_detection() {
        // 0 -> 1 -> 2 -> 1
        let deps = vec![vec![], vec![0, 2], vec![1]];
        let stuck = topological_order(&deps).err().unwrap();
        assert_eq!(stuck, vec![1, 2]);
    }

    #[test]
    fn test_evaluate_diamond() {
        let mut builder = GraphBuilder::new();
        let a = builder.root("a", || Ok::<_, Infallible>(3_i64));
        let b = builder.node("b", a, |a| Ok::<_, Infallible>(*a + 1));
        let c = builder.node("c", a, |a| Ok::<_, Infallible>(*a * 2));
        let d = builder.node("d", (b, c), |(b, c)| {
            Ok::<_, Infallible>(format!("{}-{}", b, c))
        });
        let graph = builder.build().unwrap();

        let evaluation = graph.evaluate(&SequentialExecutor).unwrap();
        assert_eq!(evaluation.get(d).unwrap().as_str(), "4-6");
        assert_eq!(*evaluation.get(b).unwrap(), 4);
    }

    #[test]
    fn test_roots_read_current_param() {
        let param = Param::new(1.0);
        let cell = param.clone();

        let mut builder = GraphBuilder::new();
        let root = builder.root("p", move || Ok::<_, Infallible>(cell.get()));
        let doubled = builder.node("2p", root, |p| Ok::<_, Infallible>(*p * 2.0));
        let graph = builder.build().unwrap();

        let first = *graph.evaluate(&SequentialExecutor).unwrap().get(doubled).unwrap();
        param.set(5.0);
        let second = *graph.evaluate(&SequentialExecutor).unwrap().get(doubled).unwrap();

        assert!((first - 2.0).abs() < f64::EPSILON);
        assert!((second - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_every_evaluation_recomputes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut builder = GraphBuilder::new();
        let root = builder.root("count", move || {
            Ok::<_, Infallible>(counter.fetch_add(1, Ordering::SeqCst))
        });
        let graph = builder.build().unwrap();

        for expected in 0..3 {
            let evaluation = graph.evaluate(&SequentialExecutor).unwrap();
            assert_eq!(*evaluation.get(root).unwrap(), expected);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failure_propagates() {
        let mut builder = GraphBuilder::new();
        let a = builder.root("a", || Ok::<_, Infallible>(1_u32));
        let bad = builder.node("bad", a, |_| Err::<u32, _>(Boom));
        let _sink = builder.node("sink", bad, |b| Ok::<_, Infallible>(*b));
        let graph = builder.build().unwrap();

        let err = graph.evaluate(&SequentialExecutor).err().unwrap();
        assert!(matches!(err, GraphError::NodeFailed { ref label, .. } if label == "bad"));
        assert_eq!(err.node_label(), Some("bad"));
    }

    #[test]
    fn test_foreign_node_rejected() {
        let mut other = GraphBuilder::new();
        let foreign = other.root("foreign", || Ok::<_, Infallible>(1_u8));

        let mut builder = GraphBuilder::new();
        builder.node("uses foreign", foreign, |v| Ok::<_, Infallible>(*v));

        assert!(matches!(builder.build(), Err(GraphError::UnknownNode(_))));
    }

    #[test]
    fn test_type_mismatch_reported() {
        let mut builder = GraphBuilder::new();
        let a = builder.root("a", || Ok::<_, Infallible>(1_u8));
        let graph = builder.build().unwrap();

        let evaluation = graph.evaluate(&SequentialExecutor).unwrap();
        let wrong: Node<String> = Node::new(a.id());
        assert!(matches!(
            evaluation.get(wrong),
            Err(GraphError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_dependency_is_single_edge() {
        let mut builder = GraphBuilder::new();
        let a = builder.root("a", || Ok::<_, Infallible>(2_u32));
        let sum = builder.node("a+a", (a, a), |(x, y)| Ok::<_, Infallible>(*x + *y));
        let graph = builder.build().unwrap();

        assert_eq!(graph.dependencies_of(sum.id()).unwrap().len(), 1);
        let evaluation = graph.evaluate(&SequentialExecutor).unwrap();
        assert_eq!(*evaluation.get(sum).unwrap(), 4);
    }

    /// Runs one chosen node, ignoring readiness
    struct RunOnly(NodeId);

    impl Executor for RunOnly {
        fn name(&self) -> &str {
            "run-only"
        }

        fn execute(&self, run: &EvaluationRun<'_>) -> Result<(), GraphError> {
            run.run_node(self.0).map(|_| ())
        }
    }

    #[test]
    fn test_node_run_before_dependencies_is_not_ready() {
        let mut builder = GraphBuilder::new();
        let a = builder.root("a", || Ok::<_, Infallible>(1_u32));
        let b = builder.node("b", a, |a| Ok::<_, Infallible>(*a + 1));
        let graph = builder.build().unwrap();

        let err = graph.evaluate(&RunOnly(b.id())).err().unwrap();
        assert!(matches!(err, GraphError::NotReady { ref label } if label == "b"));
        assert_eq!(err.node_label(), Some("b"));

        // Running only the root leaves the rest of the graph undone.
        let err = graph.evaluate(&RunOnly(a.id())).err().unwrap();
        assert!(matches!(
            err,
            GraphError::Incomplete {
                completed: 1,
                total: 2
            }
        ));
    }

    #[test]
    fn test_introspection() {
        let mut builder = GraphBuilder::new();
        let a = builder.root("a", || Ok::<_, Infallible>(()));
        let b = builder.root("b", || Ok::<_, Infallible>(()));
        let c = builder.node("c", (a, b), |_| Ok::<_, Infallible>(()));
        assert_eq!(builder.len(), 3);
        let graph = builder.build().unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.label(c.id()).unwrap(), "c");
        assert_eq!(graph.roots(), vec![a.id(), b.id()]);
        assert_eq!(graph.labels().last(), Some("c"));
    }
}

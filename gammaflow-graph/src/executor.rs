//! Execution Strategies
//!
//! An `Executor` decides when and where ready nodes run during one
//! evaluation. Both strategies are driven by the same ready queue: a node is
//! handed to the executor only after all of its dependencies completed.
//!
//! - **Sequential (`SequentialExecutor`)**: runs nodes one at a time on the
//!   calling thread, in FIFO order of readiness.
//! - **Parallel (`ParallelExecutor`)**: runs ready nodes on a fixed-size
//!   Rayon thread pool; independent nodes may run concurrently.
//!
//! The strategy only affects timing. Values are identical as long as node
//! computations do not share hidden mutable state.

use crate::error::GraphError;
use crate::graph::EvaluationRun;
use crate::node::NodeId;
use rayon::{Scope, ThreadPool, ThreadPoolBuilder};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Policy for running the ready nodes of an evaluation
pub trait Executor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Run every node of `run`, returning the first node failure
    fn execute(&self, run: &EvaluationRun<'_>) -> Result<(), GraphError>;
}

/// Runs nodes one at a time on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn name(&self) -> &str {
        "sequential"
    }

    fn execute(&self, run: &EvaluationRun<'_>) -> Result<(), GraphError> {
        let mut queue: VecDeque<NodeId> = run.initial_ready().into();
        while let Some(id) = queue.pop_front() {
            queue.extend(run.run_node(id)?);
        }
        Ok(())
    }
}

/// Runs ready nodes on a fixed-size worker pool
///
/// The pool is created once and reused by every evaluation.
#[derive(Debug)]
pub struct ParallelExecutor {
    pool: ThreadPool,
    workers: usize,
}

impl ParallelExecutor {
    /// Create a pool of `workers` threads (at least one)
    pub fn new(workers: usize) -> Result<Self, GraphError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gammaflow-worker-{}", i))
            .build()
            .map_err(|e| GraphError::WorkerPool(format!("Failed to build worker pool: {}", e)))?;

        Ok(Self { pool, workers })
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// First failure observed by any worker; later ones are dropped.
struct FailureSlot {
    failed: AtomicBool,
    error: Mutex<Option<GraphError>>,
}

impl FailureSlot {
    fn new() -> Self {
        Self {
            failed: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn record(&self, err: GraphError) {
        let mut slot = self.error.lock().unwrap_or_else(|p| p.into_inner());
        if slot.is_none() {
            *slot = Some(err);
        } else {
            warn!(error = %err, "additional node failure in evaluation");
        }
        self.failed.store(true, Ordering::Release);
    }

    fn into_result(self) -> Result<(), GraphError> {
        match self.error.into_inner().unwrap_or_else(|p| p.into_inner()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Executor for ParallelExecutor {
    fn name(&self) -> &str {
        "parallel"
    }

    fn execute(&self, run: &EvaluationRun<'_>) -> Result<(), GraphError> {
        let failure = FailureSlot::new();

        self.pool.scope(|scope| {
            for id in run.initial_ready() {
                spawn_node(scope, run, id, &failure);
            }
        });

        failure.into_result()
    }
}

fn spawn_node<'s, 'g: 's>(
    scope: &Scope<'s>,
    run: &'s EvaluationRun<'g>,
    id: NodeId,
    failure: &'s FailureSlot,
) {
    scope.spawn(move |scope| {
        // Nothing downstream of a failure can complete; stop scheduling.
        if failure.has_failed() {
            return;
        }
        match run.run_node(id) {
            Ok(ready) => {
                for next in ready {
                    spawn_node(scope, run, next, failure);
                }
            }
            Err(err) => failure.record(err),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, thiserror::Error)]
    #[error("invalid input")]
    struct InvalidInput;

    fn fan_out_graph() -> (crate::graph::Graph, crate::node::Node<Vec<u64>>) {
        let mut builder = GraphBuilder::new();
        let base = builder.root("base", || Ok::<_, Infallible>((1..=100).collect::<Vec<u64>>()));
        let sum = builder.node("sum", base, |v| Ok::<_, Infallible>(v.iter().sum::<u64>()));
        let max = builder.node("max", base, |v| Ok::<_, Infallible>(v.iter().copied().max().unwrap_or(0)));
        let len = builder.node("len", base, |v| Ok::<_, Infallible>(v.len() as u64));
        let scaled = builder.node("scaled", (sum, len), |(s, l)| Ok::<_, Infallible>(*s / *l));
        let all = builder.node("all", (sum, max, len, scaled), |(s, m, l, x)| {
            Ok::<_, Infallible>(vec![*s, *m, *l, *x])
        });
        (builder.build().unwrap(), all)
    }

    #[test]
    fn test_sequential_runs_dependencies_first() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut builder = GraphBuilder::new();

        let log = Arc::clone(&order);
        let a = builder.root("a", move || {
            log.lock().unwrap().push("a");
            Ok::<_, Infallible>(())
        });
        let log = Arc::clone(&order);
        let b = builder.node("b", a, move |_| {
            log.lock().unwrap().push("b");
            Ok::<_, Infallible>(())
        });
        let log = Arc::clone(&order);
        builder.node("c", (a, b), move |_| {
            log.lock().unwrap().push("c");
            Ok::<_, Infallible>(())
        });
        let graph = builder.build().unwrap();

        graph.evaluate(&SequentialExecutor).unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (graph, all) = fan_out_graph();
        let executor = ParallelExecutor::new(4).unwrap();

        let sequential = graph.evaluate(&SequentialExecutor).unwrap().get(all).unwrap();
        let parallel = graph.evaluate(&executor).unwrap().get(all).unwrap();

        assert_eq!(*sequential, vec![5050, 100, 100, 50]);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_pool_is_reused() {
        let (graph, all) = fan_out_graph();
        let executor = ParallelExecutor::new(2).unwrap();
        assert_eq!(executor.workers(), 2);

        for _ in 0..10 {
            let evaluation = graph.evaluate(&executor).unwrap();
            assert_eq!(evaluation.get(all).unwrap()[0], 5050);
        }
    }

    #[test]
    fn test_zero_workers_clamped() {
        let executor = ParallelExecutor::new(0).unwrap();
        assert_eq!(executor.workers(), 1);
    }

    #[test]
    fn test_parallel_failure_stops_dependents() {
        let downstream_runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&downstream_runs);

        let mut builder = GraphBuilder::new();
        let a = builder.root("a", || Ok::<_, Infallible>(0_i32));
        let bad = builder.node("validate", a, |_| Err::<i32, _>(InvalidInput));
        let ok = builder.node("independent", a, |v| Ok::<_, Infallible>(*v + 1));
        builder.node("join", (bad, ok), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(())
        });
        let graph = builder.build().unwrap();

        let executor = ParallelExecutor::new(4).unwrap();
        let err = graph.evaluate(&executor).err().unwrap();

        assert_eq!(err.node_label(), Some("validate"));
        assert_eq!(downstream_runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_executor_names() {
        assert_eq!(SequentialExecutor.name(), "sequential");
        assert_eq!(ParallelExecutor::new(1).unwrap().name(), "parallel");
    }
}

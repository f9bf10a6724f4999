// SPDX-License-Identifier: MIT

//! Ready-queue scheduler
//!
//! Walks a graph from its entry nodes. A node popped before all of its
//! dependencies have terminated is parked and re-queued by the next
//! dependency that terminates, so the walk never spins. Nodes still
//! unexecuted when the queue drains are blocked by a cycle and reported.

use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use super::config::ExecutionMode;
use super::context::RunContext;
use super::error::GraphError;
use super::graph::Graph;
use super::node::{Node, NodeInput};
use super::result::{ExecutionResult, SkipReason, SkippedNode};

/// A ready node with its computed input
struct Prepared {
    id: String,
    node: Arc<dyn Node>,
    input: NodeInput,
}

/// Per-run bookkeeping
struct Scheduler<'g> {
    graph: &'g Graph,
    entries: HashSet<String>,
    queue: VecDeque<String>,
    queued: HashSet<String>,
    parked: HashSet<String>,
    executed: HashSet<String>,
    outputs: HashMap<String, Value>,
    skipped: Vec<SkippedNode>,
}

impl<'g> Scheduler<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            entries: HashSet::new(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            parked: HashSet::new(),
            executed: HashSet::new(),
            outputs: HashMap::new(),
            skipped: Vec::new(),
        }
    }

    fn seed(&mut self, ctx: &RunContext) {
        let entries = self.graph.entry_nodes();
        for id in &entries {
            self.enqueue(id);
        }
        self.entries = entries.into_iter().collect();

        // An unregistered source can never run; report it once and let its
        // targets proceed without its contribution.
        for ghost in self.graph.unregistered_sources() {
            log::error!("Edge source '{}' is not a registered node", ghost);
            ctx.record_error(GraphError::not_found(&ghost));
            self.executed.insert(ghost.clone());
            self.release(&ghost);
        }
    }

    fn enqueue(&mut self, id: &str) {
        if self.executed.contains(id) || self.queued.contains(id) {
            return;
        }
        self.parked.remove(id);
        self.queued.insert(id.to_string());
        self.queue.push_back(id.to_string());
    }

    /// Queue every distinct downstream neighbour of a node that just terminated
    fn release(&mut self, id: &str) {
        for target in self.graph.downstream(id) {
            self.enqueue(&target);
        }
    }

    fn next_wave(&mut self, mode: ExecutionMode) -> Vec<String> {
        let wave: Vec<String> = match mode {
            ExecutionMode::Sequential => self.queue.pop_front().into_iter().collect(),
            ExecutionMode::Concurrent => self.queue.drain(..).collect(),
        };
        for id in &wave {
            self.queued.remove(id);
        }
        wave
    }

    fn is_ready(&self, id: &str) -> bool {
        self.graph
            .dependencies(id)
            .iter()
            .all(|dep| self.executed.contains(dep))
    }

    /// Values contributed by the edges targeting `id`, in aggregation order
    fn aggregate_input(&self, id: &str, ctx: &RunContext) -> Vec<Value> {
        self.graph
            .incoming(id)
            .into_iter()
            .filter_map(|edge| {
                let upstream = self.outputs.get(&edge.from)?;
                edge.evaluate(upstream, ctx)
            })
            .collect()
    }

    /// Decide what to do with a popped id; `Some` when the node should run
    fn prepare(&mut self, id: String, initial: &Value, ctx: &RunContext) -> Option<Prepared> {
        if self.executed.contains(&id) {
            return None;
        }

        let Some(node) = self.graph.node(&id).cloned() else {
            log::error!("Node '{}' not found", id);
            ctx.record_error(GraphError::not_found(&id));
            self.executed.insert(id.clone());
            self.release(&id);
            return None;
        };

        if !self.is_ready(&id) {
            log::debug!("Node '{}' parked until its dependencies finish", id);
            self.parked.insert(id);
            return None;
        }

        let input = if self.entries.contains(&id) {
            NodeInput::Single(initial.clone())
        } else {
            let values = self.aggregate_input(&id, ctx);
            if values.is_empty() {
                log::debug!("Node '{}' skipped: no qualifying input", id);
                self.skip(&id, SkipReason::NoQualifyingInput);
                self.release(&id);
                return None;
            }
            NodeInput::from_values(values)
        };

        Some(Prepared { id, node, input })
    }

    fn skip(&mut self, id: &str, reason: SkipReason) {
        self.executed.insert(id.to_string());
        self.skipped.push(SkippedNode {
            id: id.to_string(),
            reason,
        });
    }

    fn settle(&mut self, id: String, outcome: Result<Value, GraphError>, ctx: &RunContext) {
        match outcome {
            Ok(value) => {
                log::info!("Node {} completed", id);
                self.outputs.insert(id.clone(), value);
            }
            Err(e) => {
                log::error!("{}", e);
                ctx.record_error(e);
            }
        }
        self.executed.insert(id.clone());
        self.release(&id);
    }

    /// Report every node that never ran as blocked by a cycle
    fn report_stalled(&mut self, ctx: &RunContext) {
        let stalled: Vec<String> = self
            .graph
            .node_ids()
            .iter()
            .filter(|id| !self.executed.contains(*id))
            .cloned()
            .collect();

        if stalled.is_empty() {
            return;
        }

        log::warn!(
            "Graph '{}' has nodes blocked by a cycle: {:?}",
            self.graph.name(),
            stalled
        );
        for id in &stalled {
            self.skip(id, SkipReason::Cycle);
        }
        self.parked.clear();
        ctx.record_error(GraphError::CycleDetected { nodes: stalled });
    }
}

async fn invoke(prepared: Prepared, ctx: &RunContext) -> (String, Result<Value, GraphError>) {
    let Prepared { id, node, input } = prepared;
    log::info!("Executing node: {}", id);

    let outcome = match AssertUnwindSafe(node.execute(input, ctx))
        .catch_unwind()
        .await
    {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(GraphError::failed(&id, e.to_string())),
        Err(panic) => Err(GraphError::panicked(&id, panic_message(panic.as_ref()))),
    };
    (id, outcome)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub(crate) async fn run(graph: &Graph, initial: Value) -> ExecutionResult {
    let ctx = RunContext::new(graph.state_schema());
    let mode = graph.config().mode;
    let mut scheduler = Scheduler::new(graph);

    let start = Instant::now();
    scheduler.seed(&ctx);

    loop {
        let wave = scheduler.next_wave(mode);
        if wave.is_empty() {
            break;
        }

        let mut ready = Vec::new();
        for id in wave {
            if let Some(prepared) = scheduler.prepare(id, &initial, &ctx) {
                ready.push(prepared);
            }
        }

        let outcomes = join_all(ready.into_iter().map(|p| invoke(p, &ctx))).await;
        for (id, outcome) in outcomes {
            scheduler.settle(id, outcome, &ctx);
        }
    }
    let duration_ms = start.elapsed().as_millis() as u64;

    scheduler.report_stalled(&ctx);

    let run_id = ctx.run_id();
    let (state, errors) = ctx.into_parts();
    let succeeded = errors.is_empty();

    log::info!(
        "Graph '{}' finished in {}ms: {} outputs, {} errors, {} skipped",
        graph.name(),
        duration_ms,
        scheduler.outputs.len(),
        errors.len(),
        scheduler.skipped.len()
    );

    ExecutionResult {
        run_id,
        succeeded,
        outputs: scheduler.outputs,
        errors,
        skipped: scheduler.skipped,
        state,
        duration_ms,
    }
}

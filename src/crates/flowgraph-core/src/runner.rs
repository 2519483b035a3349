//! Graph traversal
//!
//! The [`Runner`] walks a [`Graph`] from its entrypoint: resolve the current
//! node, invoke its implementation through the registry, diff the state,
//! append a [`StepRecord`], pick the next edge, repeat. Node executions
//! never overlap within one run - the runner awaits each step to completion
//! before evaluating edges, so the log order is the execution order.
//!
//! Termination is always normal unless an [`EngineError`] aborts the run:
//! an edge to [`END`], a node with no matching outgoing edge, or an
//! exhausted step budget all return a [`RunOutcome`] whose
//! [`TerminationReason`] says which happened.

use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::graph::{EdgeSpec, Graph, NodeKind, NodeSpec, State, StepRecord, TerminationReason, END};
use crate::registry::{FunctionRegistry, Namespace};

/// Maximum node executions per run unless overridden.
pub const DEFAULT_STEP_BUDGET: usize = 1000;

/// Final state and audit trail of one completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub state: State,
    pub logs: Vec<StepRecord>,
    pub termination: TerminationReason,
}

/// Executes graphs against a fixed function registry.
///
/// The runner holds no per-run state: `execute` may be called concurrently
/// from any number of tasks, each run owning its private state map and log.
#[derive(Debug, Clone)]
pub struct Runner {
    registry: Arc<FunctionRegistry>,
}

impl Runner {
    pub fn new(registry: FunctionRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Execute `graph` with the default step budget.
    pub async fn execute(&self, graph: &Graph, initial_state: State) -> Result<RunOutcome> {
        self.execute_with_budget(graph, initial_state, DEFAULT_STEP_BUDGET)
            .await
    }

    /// Execute `graph`, performing at most `step_budget` node executions.
    ///
    /// Takes ownership of `initial_state`; the caller's copy is never
    /// touched. Fails fast on the first engine error - an unknown node, an
    /// unregistered function, a tool node without `tool_name`, or a step
    /// implementation error - returning no partial result.
    pub async fn execute_with_budget(
        &self,
        graph: &Graph,
        initial_state: State,
        step_budget: usize,
    ) -> Result<RunOutcome> {
        let mut state = initial_state;
        let mut logs = Vec::new();
        let mut current = graph.entrypoint.clone();
        let mut steps = 0;

        loop {
            if steps >= step_budget {
                return Ok(RunOutcome {
                    state,
                    logs,
                    termination: TerminationReason::BudgetExhausted,
                });
            }

            let node = graph
                .nodes
                .get(&current)
                .ok_or_else(|| EngineError::NodeNotFound(current.clone()))?;

            let before = state.clone();
            let started_at = Utc::now();
            state = self.dispatch(node, state).await?;
            let finished_at = Utc::now();

            logs.push(StepRecord {
                node: current.clone(),
                started_at,
                finished_at,
                state_diff: diff_states(&before, &state),
                info: node.description.clone(),
            });
            steps += 1;

            match select_edge(graph, &current, &state) {
                Some(edge) if edge.target == END => {
                    return Ok(RunOutcome {
                        state,
                        logs,
                        termination: TerminationReason::ReachedEnd,
                    });
                }
                Some(edge) => current = edge.target.clone(),
                None => {
                    return Ok(RunOutcome {
                        state,
                        logs,
                        termination: TerminationReason::NoMatchingEdge,
                    });
                }
            }
        }
    }

    /// Resolve and invoke one node's implementation.
    async fn dispatch(&self, node: &NodeSpec, state: State) -> Result<State> {
        let func = match node.kind {
            NodeKind::Computation => self.registry.resolve(Namespace::Node, &node.name)?,
            NodeKind::Tool => {
                let tool = node
                    .tool_name
                    .as_deref()
                    .ok_or_else(|| EngineError::MissingToolName(node.name.clone()))?;
                self.registry.resolve(Namespace::Tool, tool)?
            }
        };
        func(state)
            .await
            .map_err(|e| EngineError::node_execution(&node.name, e.to_string()))
    }
}

/// First edge out of `current` (in declared order) that is unconditional or
/// whose condition matches; later matching edges are ignored.
fn select_edge<'a>(graph: &'a Graph, current: &str, state: &State) -> Option<&'a EdgeSpec> {
    graph
        .edges
        .iter()
        .filter(|edge| edge.source == current)
        .find(|edge| edge.matches(state))
}

/// Shallow diff of two state maps.
///
/// Every top-level key whose value changed maps to a `{before, after}` pair;
/// a key missing on one side shows as JSON null there.
pub fn diff_states(before: &State, after: &State) -> serde_json::Map<String, Value> {
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let mut diff = serde_json::Map::new();
    for key in keys {
        let old = before.get(key);
        let new = after.get(key);
        if old != new {
            diff.insert(
                key.clone(),
                serde_json::json!({
                    "before": old.cloned().unwrap_or(Value::Null),
                    "after": new.cloned().unwrap_or(Value::Null),
                }),
            );
        }
    }
    diff
}

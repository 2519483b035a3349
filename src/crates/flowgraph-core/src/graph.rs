//! Graph and run data model
//!
//! Value types describing a workflow graph (nodes, ordered edges) and the
//! records a run produces (step log entries, run status). Everything here is
//! a plain serde value type: graphs arrive over the wire, are stored as-is,
//! and are borrowed immutably by the [`Runner`](crate::Runner) for the
//! duration of one execution.
//!
//! Edge order is semantically significant: when several edges leave the same
//! node, the first one (in declared order) that is unconditional or whose
//! condition matches wins. See [`EdgeSpec::matches`] and the runner's edge
//! resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::condition::{compare, lookup_path};

/// Shared run state: the top-level JSON object threaded through node
/// executions for one run.
pub type State = serde_json::Map<String, Value>;

/// Reserved edge target meaning "terminate the run normally".
///
/// `__end__` is a sentinel, not a node name: an edge pointing at it ends the
/// run without any node lookup.
pub const END: &str = "__end__";

/// Which registry namespace resolves a node's behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Backed by a function in the node namespace, keyed by the node's name.
    #[default]
    Computation,
    /// Backed by a function in the tool namespace, keyed by `tool_name`.
    Tool,
}

/// Definition of a single node in a workflow graph.
///
/// For `Tool` nodes, `tool_name` identifies the tool-namespace key, which may
/// differ from the node's own name. Its presence is enforced at execution
/// time, when the node is dispatched, not at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique key within the graph.
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Informational only; copied into each step record's `info` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Comparison operator for edge conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

/// Directed edge with an optional condition.
///
/// When `condition_key` is set, the edge is taken only if
/// `compare(lookup_path(state, condition_key), operator, value)` holds.
/// Without a `condition_key` (or without an `operator`) the edge is
/// unconditional and always matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub source: String,
    /// Target node name, or [`END`] to terminate the run.
    pub target: String,
    /// Dotted path into the state map, e.g. `metrics.quality_score`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<CompareOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl EdgeSpec {
    /// Edge that always matches.
    pub fn unconditional(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            condition_key: None,
            operator: None,
            value: None,
        }
    }

    /// Edge taken only when the state value at `condition_key` compares true.
    pub fn conditional(
        source: impl Into<String>,
        target: impl Into<String>,
        condition_key: impl Into<String>,
        operator: CompareOp,
        value: Value,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            condition_key: Some(condition_key.into()),
            operator: Some(operator),
            value: Some(value),
        }
    }

    /// Whether this edge matches against the given state.
    pub fn matches(&self, state: &State) -> bool {
        let Some(key) = &self.condition_key else {
            return true;
        };
        let Some(op) = self.operator else {
            // condition_key without an operator is treated as unconditional
            return true;
        };
        let rhs = self.value.as_ref().unwrap_or(&Value::Null);
        compare(lookup_path(state, key), op, rhs)
    }
}

/// Immutable description of a workflow graph.
///
/// `entrypoint` must name a key in `nodes`; this is checked when a run
/// starts, not when the graph is built. A graph may be referenced by many
/// runs at once - the runner never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub entrypoint: String,
    pub nodes: HashMap<String, NodeSpec>,
    /// Declaration order matters: first matching edge wins.
    pub edges: Vec<EdgeSpec>,
}

/// Audit entry for one node execution.
///
/// `state_diff` maps every top-level state key that changed during the step
/// to a `{"before": .., "after": ..}` pair, with JSON null standing in for
/// an absent side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub node: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub state_diff: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Lifecycle status of a run record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Why a run stopped.
///
/// All three variants are normal completions; engine failures are reported
/// as errors instead. `BudgetExhausted` means the step budget ran out while
/// a next node was still pending - callers that care can distinguish it from
/// a genuine exit without re-deriving it from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// An edge pointing at [`END`] was taken.
    ReachedEnd,
    /// The current node had no outgoing edge that matched.
    NoMatchingEdge,
    /// The step budget was spent with a next node still scheduled.
    BudgetExhausted,
}

/// One execution of a graph, as tracked by a run store.
///
/// The engine itself never touches these: it returns a
/// [`RunOutcome`](crate::RunOutcome) and signals failure via
/// [`EngineError`](crate::EngineError), and the orchestrating caller
/// populates the record from either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub graph_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub logs: Vec<StepRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
}

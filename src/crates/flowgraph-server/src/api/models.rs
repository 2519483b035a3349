//! Request and response bodies

use serde::{Deserialize, Serialize};

use flowgraph_core::{EdgeSpec, NodeSpec, RunStatus, State, StepRecord, TerminationReason};

/// Body of `POST /graph/create`.
///
/// Either name a `template` (or send an empty definition) to get a built-in
/// graph, or supply `nodes` + `edges` + `entrypoint` for a custom one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGraphRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<EdgeSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGraphResponse {
    pub graph_id: String,
}

/// Body of `POST /graph/run` and `POST /graph/run_async`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunGraphRequest {
    pub graph_id: String,
    #[serde(default)]
    pub initial_state: State,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunGraphSyncResponse {
    pub run_id: String,
    pub final_state: State,
    pub logs: Vec<StepRecord>,
    pub termination: TerminationReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunGraphAsyncResponse {
    pub run_id: String,
    pub status: RunStatus,
}

/// Banner returned at `/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}

//! Endpoint handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use flowgraph_core::{Graph, RunRecord, RunStatus};
use flowgraph_prebuilt::{code_review_graph, CODE_REVIEW_TEMPLATE};

use crate::api::{
    error::{ApiError, ApiResult},
    models::{
        CreateGraphRequest, CreateGraphResponse, RunGraphAsyncResponse, RunGraphRequest,
        RunGraphSyncResponse, ServiceInfo,
    },
    routes::AppState,
};

/// GET /
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "flowgraph workflow engine is running.".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a new graph
///
/// POST /graph/create
///
/// A named template (or an entirely empty definition) yields a built-in
/// graph; otherwise nodes, edges, and an entrypoint are all required.
pub async fn create_graph(
    State(app): State<AppState>,
    Json(req): Json<CreateGraphRequest>,
) -> ApiResult<(StatusCode, Json<CreateGraphResponse>)> {
    let graph = build_graph(req)?;
    let graph_id = app.graphs.insert(graph).await;

    tracing::info!("Created graph: {}", graph_id);
    Ok((StatusCode::CREATED, Json(CreateGraphResponse { graph_id })))
}

fn build_graph(req: CreateGraphRequest) -> ApiResult<Graph> {
    let graph_id = Uuid::new_v4().to_string();

    if req.template.as_deref() == Some(CODE_REVIEW_TEMPLATE)
        || (req.nodes.is_none() && req.edges.is_none())
    {
        return Ok(code_review_graph(graph_id, req.name));
    }

    let nodes = req.nodes.unwrap_or_default();
    let edges = req.edges.unwrap_or_default();
    if nodes.is_empty() || edges.is_empty() {
        return Err(ApiError::BadRequest(
            "Either provide a template or both nodes and edges.".to_string(),
        ));
    }
    let Some(entrypoint) = req.entrypoint else {
        return Err(ApiError::BadRequest(
            "entrypoint is required when defining a custom graph.".to_string(),
        ));
    };

    Ok(Graph {
        id: graph_id,
        name: req.name,
        entrypoint,
        nodes: nodes.into_iter().map(|n| (n.name.clone(), n)).collect(),
        edges,
    })
}

/// Run a graph synchronously
///
/// POST /graph/run
///
/// Blocks until the run finishes and returns the final state plus the full
/// execution trace. The run is also recorded in the run store.
pub async fn run_graph_sync(
    State(app): State<AppState>,
    Json(req): Json<RunGraphRequest>,
) -> ApiResult<Json<RunGraphSyncResponse>> {
    let graph = app
        .graphs
        .get(&req.graph_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Graph not found: {}", req.graph_id)))?;

    let run_id = Uuid::new_v4().to_string();
    app.runs
        .insert(RunRecord {
            id: run_id.clone(),
            graph_id: graph.id.clone(),
            status: RunStatus::Running,
            state: req.initial_state.clone(),
            logs: vec![],
            error: None,
            termination: None,
        })
        .await;

    match app.runner.execute(&graph, req.initial_state).await {
        Ok(outcome) => {
            app.runs
                .update(&run_id, |run| {
                    run.status = RunStatus::Completed;
                    run.state = outcome.state.clone();
                    run.logs = outcome.logs.clone();
                    run.termination = Some(outcome.termination);
                })
                .await;

            tracing::info!("Run {} completed in {} steps", run_id, outcome.logs.len());
            Ok(Json(RunGraphSyncResponse {
                run_id,
                final_state: outcome.state,
                logs: outcome.logs,
                termination: outcome.termination,
            }))
        }
        Err(err) => {
            app.runs
                .update(&run_id, |run| {
                    run.status = RunStatus::Failed;
                    run.error = Some(err.to_string());
                })
                .await;

            tracing::error!("Run {} failed: {}", run_id, err);
            Err(ApiError::Engine(err))
        }
    }
}

/// Run a graph as a background task
///
/// POST /graph/run_async
///
/// Returns immediately with the run id; poll `GET /graph/state/:run_id`
/// for progress and the final result.
pub async fn run_graph_async(
    State(app): State<AppState>,
    Json(req): Json<RunGraphRequest>,
) -> ApiResult<Json<RunGraphAsyncResponse>> {
    let graph = app
        .graphs
        .get(&req.graph_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Graph not found: {}", req.graph_id)))?;

    let run_id = Uuid::new_v4().to_string();
    app.runs
        .insert(RunRecord {
            id: run_id.clone(),
            graph_id: graph.id.clone(),
            status: RunStatus::Pending,
            state: req.initial_state.clone(),
            logs: vec![],
            error: None,
            termination: None,
        })
        .await;

    let runs = app.runs.clone();
    let runner = app.runner.clone();
    let id = run_id.clone();
    let initial_state = req.initial_state;

    tokio::spawn(async move {
        runs.update(&id, |run| run.status = RunStatus::Running).await;

        match runner.execute(&graph, initial_state).await {
            Ok(outcome) => {
                tracing::info!("Run {} completed in {} steps", id, outcome.logs.len());
                runs.update(&id, move |run| {
                    run.status = RunStatus::Completed;
                    run.state = outcome.state;
                    run.logs = outcome.logs;
                    run.termination = Some(outcome.termination);
                })
                .await;
            }
            Err(err) => {
                tracing::error!("Run {} failed: {}", id, err);
                runs.update(&id, move |run| {
                    run.status = RunStatus::Failed;
                    run.error = Some(err.to_string());
                })
                .await;
            }
        }
    });

    tracing::info!("Started background run: {}", run_id);
    Ok(Json(RunGraphAsyncResponse {
        run_id,
        status: RunStatus::Running,
    }))
}

/// Inspect a run's status, state, and logs
///
/// GET /graph/state/:run_id
pub async fn get_run_state(
    State(app): State<AppState>,
    Path(run_id): Path<String>,
) -> ApiResult<Json<RunRecord>> {
    app.runs
        .get(&run_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Run not found: {run_id}")))
}

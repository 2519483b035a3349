//! API route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use flowgraph_core::Runner;

use crate::api::handlers;
use crate::store::{GraphStore, RunStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub graphs: GraphStore,
    pub runs: RunStore,
    pub runner: Runner,
}

impl AppState {
    pub fn new(runner: Runner) -> Self {
        Self {
            graphs: GraphStore::new(),
            runs: RunStore::new(),
            runner,
        }
    }
}

/// Build the complete API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/graph/create", post(handlers::create_graph))
        .route("/graph/run", post(handlers::run_graph_sync))
        .route("/graph/run_async", post(handlers::run_graph_async))
        .route("/graph/state/:run_id", get(handlers::get_run_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

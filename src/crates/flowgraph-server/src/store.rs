//! In-memory graph and run stores
//!
//! Both stores are cheap clones around shared maps. The run store's lock is
//! what lets a background run update status while readers poll the same
//! record; graphs are immutable once inserted and handed out behind `Arc`
//! so concurrent runs can borrow the same definition.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use flowgraph_core::{Graph, RunRecord};

/// Shared store of graph definitions, keyed by graph id.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    inner: Arc<RwLock<HashMap<String, Arc<Graph>>>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `graph` under its id, returning the id.
    pub async fn insert(&self, graph: Graph) -> String {
        let id = graph.id.clone();
        self.inner.write().await.insert(id.clone(), Arc::new(graph));
        id
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Graph>> {
        self.inner.read().await.get(id).cloned()
    }
}

/// Shared store of run records, keyed by run id.
#[derive(Debug, Clone, Default)]
pub struct RunStore {
    inner: Arc<RwLock<HashMap<String, RunRecord>>>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, run: RunRecord) {
        self.inner.write().await.insert(run.id.clone(), run);
    }

    /// Snapshot of a run record, if it exists.
    pub async fn get(&self, id: &str) -> Option<RunRecord> {
        self.inner.read().await.get(id).cloned()
    }

    /// Apply `mutate` to the record under `id`, if it exists.
    pub async fn update<F>(&self, id: &str, mutate: F)
    where
        F: FnOnce(&mut RunRecord),
    {
        if let Some(run) = self.inner.write().await.get_mut(id) {
            mutate(run);
        }
    }
}

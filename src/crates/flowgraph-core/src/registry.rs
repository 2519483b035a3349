//! Function registry
//!
//! Maps string keys to callable step behavior across two disjoint
//! namespaces: node functions (keyed by node name) and tool functions
//! (keyed by tool name). A registry is an explicit instance owned by the
//! [`Runner`](crate::Runner) - there is no process-wide registry, so tests
//! and embedders can run with fully isolated registries.
//!
//! # Calling Convention
//!
//! Every registered function has the same contract: it receives the full
//! state map by value and resolves to the full resulting state map. The
//! future-returning signature means callers treat every step as potentially
//! suspending; functions that complete immediately go through the same path
//! via [`sync_step`], which erases the distinction at registration time
//! instead of inspecting functions at call time.
//!
//! ```rust
//! use flowgraph_core::{sync_step, FunctionRegistry, Namespace, State};
//! use serde_json::json;
//!
//! let mut registry = FunctionRegistry::new();
//!
//! // A suspending step function.
//! registry.register_node("fetch", |mut state: State| {
//!     Box::pin(async move {
//!         state.insert("fetched".into(), json!(true));
//!         Ok(state)
//!     })
//! });
//!
//! // A plain synchronous step, lifted into the same convention.
//! registry.register(
//!     Namespace::Tool,
//!     "annotate",
//!     sync_step(|mut state: State| {
//!         state.insert("annotated".into(), json!(true));
//!         Ok(state)
//!     }),
//! );
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::graph::State;

/// Opaque error type for step implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future produced by one step invocation.
pub type StepFuture = Pin<Box<dyn Future<Output = std::result::Result<State, BoxError>> + Send>>;

/// A registered step implementation.
pub type StepFn = Arc<dyn Fn(State) -> StepFuture + Send + Sync>;

/// Lift a synchronous function into the uniform [`StepFn`] convention.
pub fn sync_step<F>(f: F) -> StepFn
where
    F: Fn(State) -> std::result::Result<State, BoxError> + Send + Sync + 'static,
{
    Arc::new(move |state| {
        let result = f(state);
        Box::pin(async move { result })
    })
}

/// The two independent key spaces of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Node,
    Tool,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Node => write!(f, "node"),
            Namespace::Tool => write!(f, "tool"),
        }
    }
}

/// String-keyed registry of node and tool step functions.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    nodes: HashMap<String, StepFn>,
    tools: HashMap<String, StepFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a function under `key` in the given namespace.
    pub fn register(&mut self, namespace: Namespace, key: impl Into<String>, func: StepFn) {
        let map = match namespace {
            Namespace::Node => &mut self.nodes,
            Namespace::Tool => &mut self.tools,
        };
        map.insert(key.into(), func);
    }

    /// Register a node function from a future-returning closure.
    pub fn register_node<F>(&mut self, key: impl Into<String>, func: F)
    where
        F: Fn(State) -> StepFuture + Send + Sync + 'static,
    {
        self.register(Namespace::Node, key, Arc::new(func));
    }

    /// Register a tool function from a future-returning closure.
    pub fn register_tool<F>(&mut self, key: impl Into<String>, func: F)
    where
        F: Fn(State) -> StepFuture + Send + Sync + 'static,
    {
        self.register(Namespace::Tool, key, Arc::new(func));
    }

    /// Resolve `key` in the given namespace.
    pub fn resolve(&self, namespace: Namespace, key: &str) -> Result<StepFn> {
        let map = match namespace {
            Namespace::Node => &self.nodes,
            Namespace::Tool => &self.tools,
        };
        map.get(key)
            .cloned()
            .ok_or_else(|| EngineError::FunctionNotRegistered {
                namespace,
                key: key.to_string(),
            })
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

//! Engine error types
//!
//! All failures that abort an in-progress execution. None of these are
//! retried by the engine: the `execute` call fails and returns no result,
//! and it is the caller's job to record the failure on its run record.

use thiserror::Error;

use crate::registry::Namespace;

/// Convenience result type using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fatal errors raised during graph execution.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The current-node pointer references a name absent from the graph.
    ///
    /// Raised at the top of each loop iteration, which also covers an
    /// entrypoint that names no node.
    #[error("node '{0}' not found in graph")]
    NodeNotFound(String),

    /// A registry lookup missed in the given namespace.
    #[error("{namespace} function '{key}' is not registered")]
    FunctionNotRegistered {
        namespace: Namespace,
        key: String,
    },

    /// A tool node was dispatched without a `tool_name`.
    #[error("tool node '{0}' is missing 'tool_name'")]
    MissingToolName(String),

    /// A step implementation failed; the original message is preserved.
    #[error("node '{node}' execution failed: {error}")]
    NodeExecution { node: String, error: String },
}

impl EngineError {
    pub fn node_execution(node: impl Into<String>, error: impl Into<String>) -> Self {
        Self::NodeExecution {
            node: node.into(),
            error: error.into(),
        }
    }
}

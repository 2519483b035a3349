//! # flowgraph-core - Minimal Workflow Graph Execution Engine
//!
//! Build directed graphs of named steps ("nodes") connected by conditional or
//! unconditional edges, then walk them from an entrypoint while threading a
//! shared JSON state map through every step and recording an audit trail.
//!
//! ## Core Concepts
//!
//! - **[`Graph`]** - immutable description of nodes and ordered edges
//! - **[`FunctionRegistry`]** - maps node and tool names to async step
//!   functions with one uniform calling convention
//! - **[`Runner`]** - performs the traversal: invoke node, diff state, append
//!   a [`StepRecord`], pick the next edge, repeat under a step budget
//!
//! ## Execution Model
//!
//! A run is a single logical sequence: one node executes at a time, the
//! runner awaits its completion before evaluating edges, so step order and
//! log order are deterministic for a fixed graph and fixed node behavior.
//! Backward edges are fully supported, which makes "retry until good enough"
//! loops a matter of graph shape rather than engine features. The only bound
//! on a run is the step budget (default 1000).
//!
//! Independent runs may execute concurrently: each owns its private state
//! map and step log, and the engine keeps no shared mutable state.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowgraph_core::{
//!     EdgeSpec, FunctionRegistry, Graph, NodeKind, NodeSpec, Runner, State, END,
//! };
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() -> flowgraph_core::Result<()> {
//! let mut registry = FunctionRegistry::new();
//! registry.register_node("greet", |mut state: State| {
//!     Box::pin(async move {
//!         state.insert("greeting".into(), json!("hello"));
//!         Ok(state)
//!     })
//! });
//!
//! let graph = Graph {
//!     id: "g1".into(),
//!     name: None,
//!     entrypoint: "greet".into(),
//!     nodes: HashMap::from([(
//!         "greet".into(),
//!         NodeSpec {
//!             name: "greet".into(),
//!             kind: NodeKind::Computation,
//!             tool_name: None,
//!             description: None,
//!         },
//!     )]),
//!     edges: vec![EdgeSpec::unconditional("greet", END)],
//! };
//!
//! let runner = Runner::new(registry);
//! let outcome = runner.execute(&graph, State::new()).await?;
//! assert_eq!(outcome.state["greeting"], json!("hello"));
//! assert_eq!(outcome.logs.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod condition;
pub mod error;
pub mod graph;
pub mod registry;
pub mod runner;

pub use condition::{compare, lookup_path};
pub use error::{EngineError, Result};
pub use graph::{
    CompareOp, EdgeSpec, Graph, NodeKind, NodeSpec, RunRecord, RunStatus, State, StepRecord,
    TerminationReason, END,
};
pub use registry::{sync_step, BoxError, FunctionRegistry, Namespace, StepFn, StepFuture};
pub use runner::{Runner, RunOutcome, DEFAULT_STEP_BUDGET};

//! # flowgraph-prebuilt - Ready-Made Steps and Template Graphs
//!
//! Step implementations and graph templates that ship with the engine, so a
//! fresh deployment has something to run out of the box.
//!
//! The only pipeline currently provided is a toy static-analysis workflow:
//! extract function definitions from a code snippet, estimate complexity,
//! detect simple smells, suggest improvements, and loop back into the
//! suggestion step until a quality threshold is met. It exists to exercise
//! every engine feature - computation and tool nodes, conditional edges,
//! and a backward edge - not to review code well.
//!
//! ```rust
//! use flowgraph_core::{FunctionRegistry, Runner, State};
//! use flowgraph_prebuilt::{code_review_graph, register_builtins};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> flowgraph_core::Result<()> {
//! let mut registry = FunctionRegistry::new();
//! register_builtins(&mut registry);
//!
//! let graph = code_review_graph("example", None);
//! let mut state = State::new();
//! state.insert("code".into(), json!("def main():\n    return 0\n"));
//!
//! let outcome = Runner::new(registry).execute(&graph, state).await?;
//! assert_eq!(outcome.state["meets_quality"], json!(true));
//! # Ok(())
//! # }
//! ```

pub mod code_review;
pub mod template;

pub use code_review::register_builtins;
pub use template::{code_review_graph, CODE_REVIEW_TEMPLATE};

//! Template graphs
//!
//! Pre-wired graphs over the built-in steps. A store assigns the graph id;
//! the template only decides shape.

use flowgraph_core::{CompareOp, EdgeSpec, Graph, NodeKind, NodeSpec, END};
use serde_json::json;

/// Template key accepted by graph-creation surfaces.
pub const CODE_REVIEW_TEMPLATE: &str = "code_review_agent";

/// The built-in code-review workflow:
///
/// ```text
/// extract_functions -> check_complexity -> detect_smells
///     -> suggest_improvements -> evaluate_quality
/// ```
///
/// with `evaluate_quality` looping back to `suggest_improvements` while
/// `meets_quality` is false, and exiting to `__end__` once it is true.
pub fn code_review_graph(id: impl Into<String>, name: Option<String>) -> Graph {
    let nodes = [
        NodeSpec {
            name: "extract_functions".to_string(),
            kind: NodeKind::Computation,
            tool_name: None,
            description: Some("Extract functions from raw code text.".to_string()),
        },
        NodeSpec {
            name: "check_complexity".to_string(),
            kind: NodeKind::Computation,
            tool_name: None,
            description: Some("Estimate complexity per function.".to_string()),
        },
        NodeSpec {
            name: "detect_smells".to_string(),
            kind: NodeKind::Tool,
            tool_name: Some("detect_smells".to_string()),
            description: Some("Tool node: detect simple static code smells.".to_string()),
        },
        NodeSpec {
            name: "suggest_improvements".to_string(),
            kind: NodeKind::Computation,
            tool_name: None,
            description: Some("Suggest improvements and simulate auto-refactor.".to_string()),
        },
        NodeSpec {
            name: "evaluate_quality".to_string(),
            kind: NodeKind::Computation,
            tool_name: None,
            description: Some("Evaluate whether quality_score meets threshold.".to_string()),
        },
    ];

    Graph {
        id: id.into(),
        name: Some(name.unwrap_or_else(|| CODE_REVIEW_TEMPLATE.to_string())),
        entrypoint: "extract_functions".to_string(),
        nodes: nodes
            .into_iter()
            .map(|node| (node.name.clone(), node))
            .collect(),
        edges: vec![
            EdgeSpec::unconditional("extract_functions", "check_complexity"),
            EdgeSpec::unconditional("check_complexity", "detect_smells"),
            EdgeSpec::unconditional("detect_smells", "suggest_improvements"),
            EdgeSpec::unconditional("suggest_improvements", "evaluate_quality"),
            // Loop edge: keep refining while the threshold is unmet.
            EdgeSpec::conditional(
                "evaluate_quality",
                "suggest_improvements",
                "meets_quality",
                CompareOp::Eq,
                json!(false),
            ),
            EdgeSpec::conditional(
                "evaluate_quality",
                END,
                "meets_quality",
                CompareOp::Eq,
                json!(true),
            ),
        ],
    }
}

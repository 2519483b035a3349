//! End-to-end traversal tests for the runner
//!
//! These exercise the full execute loop: registry dispatch, edge
//! resolution, loop support, budget termination, and the audit trail.

use flowgraph_core::{
    sync_step, CompareOp, EdgeSpec, EngineError, FunctionRegistry, Graph, Namespace, NodeKind,
    NodeSpec, Runner, State, TerminationReason, END,
};
use serde_json::{json, Value};

fn node(name: &str) -> NodeSpec {
    NodeSpec {
        name: name.to_string(),
        kind: NodeKind::Computation,
        tool_name: None,
        description: None,
    }
}

fn tool_node(name: &str, tool_name: Option<&str>) -> NodeSpec {
    NodeSpec {
        name: name.to_string(),
        kind: NodeKind::Tool,
        tool_name: tool_name.map(str::to_string),
        description: None,
    }
}

fn graph(entrypoint: &str, nodes: Vec<NodeSpec>, edges: Vec<EdgeSpec>) -> Graph {
    Graph {
        id: "test-graph".to_string(),
        name: None,
        entrypoint: entrypoint.to_string(),
        nodes: nodes.into_iter().map(|n| (n.name.clone(), n)).collect(),
        edges,
    }
}

/// Register no-op node functions that record their visit under `visited`.
fn register_tracing_nodes(registry: &mut FunctionRegistry, names: &[&str]) {
    for name in names {
        let name = name.to_string();
        let key = name.clone();
        registry.register(
            Namespace::Node,
            key,
            sync_step(move |mut state: State| {
                let visited = state
                    .entry("visited")
                    .or_insert_with(|| json!([]))
                    .as_array_mut()
                    .expect("visited is an array");
                visited.push(json!(name.clone()));
                Ok(state)
            }),
        );
    }
}

fn visited_nodes(state: &State) -> Vec<String> {
    state["visited"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

fn executed_nodes(logs: &[flowgraph_core::StepRecord]) -> Vec<&str> {
    logs.iter().map(|record| record.node.as_str()).collect()
}

#[tokio::test]
async fn entrypoint_without_edges_runs_exactly_once() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["only"]);
    let runner = Runner::new(registry);

    let g = graph("only", vec![node("only")], vec![]);
    let outcome = runner.execute(&g, State::new()).await.unwrap();

    assert_eq!(outcome.logs.len(), 1);
    assert_eq!(outcome.termination, TerminationReason::NoMatchingEdge);
    assert_eq!(visited_nodes(&outcome.state), vec!["only"]);
}

#[tokio::test]
async fn first_matching_edge_wins_over_later_matches() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["start", "first", "second"]);
    registry.register(
        Namespace::Node,
        "start",
        sync_step(|mut state: State| {
            state.insert("flag".into(), json!(1));
            Ok(state)
        }),
    );

    // Both edges match: the conditional one is declared first and must win.
    let g = graph(
        "start",
        vec![node("start"), node("first"), node("second")],
        vec![
            EdgeSpec::conditional("start", "first", "flag", CompareOp::Eq, json!(1)),
            EdgeSpec::unconditional("start", "second"),
        ],
    );

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();
    assert_eq!(executed_nodes(&outcome.logs), vec!["start", "first"]);
}

#[tokio::test]
async fn unconditional_edge_declared_first_shadows_conditions() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["start", "first", "second"]);

    let g = graph(
        "start",
        vec![node("start"), node("first"), node("second")],
        vec![
            EdgeSpec::unconditional("start", "first"),
            EdgeSpec::unconditional("start", "second"),
        ],
    );

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();
    assert_eq!(executed_nodes(&outcome.logs), vec!["start", "first"]);
}

#[tokio::test]
async fn end_sentinel_terminates_without_node_lookup() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["start"]);

    // "__end__" is not in `nodes`; reaching it must not raise NodeNotFound.
    let g = graph(
        "start",
        vec![node("start")],
        vec![EdgeSpec::unconditional("start", END)],
    );

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();
    assert_eq!(outcome.logs.len(), 1);
    assert_eq!(outcome.termination, TerminationReason::ReachedEnd);
}

#[tokio::test]
async fn cycle_stops_at_step_budget_without_error() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["ping", "pong"]);

    let g = graph(
        "ping",
        vec![node("ping"), node("pong")],
        vec![
            EdgeSpec::unconditional("ping", "pong"),
            EdgeSpec::unconditional("pong", "ping"),
        ],
    );

    let runner = Runner::new(registry);
    let outcome = runner.execute_with_budget(&g, State::new(), 10).await.unwrap();

    assert_eq!(outcome.logs.len(), 10);
    assert_eq!(outcome.termination, TerminationReason::BudgetExhausted);
    assert_eq!(
        executed_nodes(&outcome.logs),
        vec!["ping", "pong", "ping", "pong", "ping", "pong", "ping", "pong", "ping", "pong"]
    );
}

#[tokio::test]
async fn zero_budget_executes_nothing() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["only"]);
    let runner = Runner::new(registry);

    let g = graph("only", vec![node("only")], vec![]);
    let outcome = runner.execute_with_budget(&g, State::new(), 0).await.unwrap();
    assert!(outcome.logs.is_empty());
    assert_eq!(outcome.termination, TerminationReason::BudgetExhausted);
}

#[tokio::test]
async fn refinement_loop_exits_once_quality_is_met() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["a", "b", "c"]);

    // d counts its passes; e flips meets_quality once d has run twice.
    registry.register(
        Namespace::Node,
        "d",
        sync_step(|mut state: State| {
            let passes = state.get("passes").and_then(Value::as_i64).unwrap_or(0);
            state.insert("passes".into(), json!(passes + 1));
            Ok(state)
        }),
    );
    registry.register(
        Namespace::Node,
        "e",
        sync_step(|mut state: State| {
            let passes = state.get("passes").and_then(Value::as_i64).unwrap_or(0);
            state.insert("meets_quality".into(), json!(passes >= 2));
            Ok(state)
        }),
    );

    let g = graph(
        "a",
        vec![node("a"), node("b"), node("c"), node("d"), node("e")],
        vec![
            EdgeSpec::unconditional("a", "b"),
            EdgeSpec::unconditional("b", "c"),
            EdgeSpec::unconditional("c", "d"),
            EdgeSpec::unconditional("d", "e"),
            EdgeSpec::conditional("e", "d", "meets_quality", CompareOp::Eq, json!(false)),
            EdgeSpec::conditional("e", END, "meets_quality", CompareOp::Eq, json!(true)),
        ],
    );

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();

    assert_eq!(
        executed_nodes(&outcome.logs),
        vec!["a", "b", "c", "d", "e", "d", "e"]
    );
    assert_eq!(outcome.state["meets_quality"], json!(true));
    assert_eq!(outcome.termination, TerminationReason::ReachedEnd);
}

#[tokio::test]
async fn step_records_carry_diffs_and_descriptions() {
    let mut registry = FunctionRegistry::new();
    registry.register(
        Namespace::Node,
        "bump",
        sync_step(|mut state: State| {
            state.insert("count".into(), json!(1));
            Ok(state)
        }),
    );

    let mut spec = node("bump");
    spec.description = Some("bumps the counter".to_string());
    let g = graph("bump", vec![spec], vec![]);

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();

    let record = &outcome.logs[0];
    assert_eq!(record.info.as_deref(), Some("bumps the counter"));
    assert_eq!(
        Value::Object(record.state_diff.clone()),
        json!({"count": {"before": null, "after": 1}})
    );
    assert!(record.finished_at >= record.started_at);
}

#[tokio::test]
async fn unknown_entrypoint_fails_with_node_not_found() {
    let runner = Runner::new(FunctionRegistry::new());
    let g = graph("ghost", vec![], vec![]);

    let err = runner.execute(&g, State::new()).await.unwrap_err();
    assert!(matches!(err, EngineError::NodeNotFound(name) if name == "ghost"));
}

#[tokio::test]
async fn edge_to_unknown_node_fails_mid_run() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["start"]);

    let g = graph(
        "start",
        vec![node("start")],
        vec![EdgeSpec::unconditional("start", "missing")],
    );

    let runner = Runner::new(registry);
    let err = runner.execute(&g, State::new()).await.unwrap_err();
    assert!(matches!(err, EngineError::NodeNotFound(name) if name == "missing"));
}

#[tokio::test]
async fn unregistered_node_function_is_fatal() {
    let runner = Runner::new(FunctionRegistry::new());
    let g = graph("lonely", vec![node("lonely")], vec![]);

    let err = runner.execute(&g, State::new()).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::FunctionNotRegistered {
            namespace: Namespace::Node,
            key,
        } if key == "lonely"
    ));
}

#[tokio::test]
async fn tool_node_resolves_tool_namespace_by_tool_name() {
    let mut registry = FunctionRegistry::new();
    registry.register(
        Namespace::Tool,
        "scanner",
        sync_step(|mut state: State| {
            state.insert("scanned".into(), json!(true));
            Ok(state)
        }),
    );

    // Node name differs from the tool key on purpose.
    let g = graph("scan_step", vec![tool_node("scan_step", Some("scanner"))], vec![]);

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();
    assert_eq!(outcome.state["scanned"], json!(true));
}

#[tokio::test]
async fn tool_node_without_tool_name_is_fatal() {
    let runner = Runner::new(FunctionRegistry::new());
    let g = graph("bad_tool", vec![tool_node("bad_tool", None)], vec![]);

    let err = runner.execute(&g, State::new()).await.unwrap_err();
    assert!(matches!(err, EngineError::MissingToolName(name) if name == "bad_tool"));
}

#[tokio::test]
async fn step_implementation_errors_propagate_with_context() {
    let mut registry = FunctionRegistry::new();
    registry.register(
        Namespace::Node,
        "explode",
        sync_step(|_state: State| Err("disk on fire".into())),
    );

    let g = graph("explode", vec![node("explode")], vec![]);
    let runner = Runner::new(registry);

    let err = runner.execute(&g, State::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "node 'explode' execution failed: disk on fire"
    );
}

#[tokio::test]
async fn suspending_and_synchronous_steps_share_one_convention() {
    let mut registry = FunctionRegistry::new();
    registry.register_node("async_step", |mut state: State| {
        Box::pin(async move {
            tokio::task::yield_now().await;
            state.insert("async_done".into(), json!(true));
            Ok(state)
        })
    });
    registry.register(
        Namespace::Node,
        "sync_step",
        sync_step(|mut state: State| {
            state.insert("sync_done".into(), json!(true));
            Ok(state)
        }),
    );

    let g = graph(
        "async_step",
        vec![node("async_step"), node("sync_step")],
        vec![
            EdgeSpec::unconditional("async_step", "sync_step"),
            EdgeSpec::unconditional("sync_step", END),
        ],
    );

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();
    assert_eq!(outcome.state["async_done"], json!(true));
    assert_eq!(outcome.state["sync_done"], json!(true));
}

#[tokio::test]
async fn dotted_condition_keys_reach_nested_state() {
    let mut registry = FunctionRegistry::new();
    registry.register(
        Namespace::Node,
        "score",
        sync_step(|mut state: State| {
            state.insert("metrics".into(), json!({"quality_score": 0.9}));
            Ok(state)
        }),
    );
    register_tracing_nodes(&mut registry, &["ship", "rework"]);

    let g = graph(
        "score",
        vec![node("score"), node("ship"), node("rework")],
        vec![
            EdgeSpec::conditional("score", "ship", "metrics.quality_score", CompareOp::Ge, json!(0.8)),
            EdgeSpec::unconditional("score", "rework"),
        ],
    );

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();
    assert_eq!(executed_nodes(&outcome.logs), vec!["score", "ship"]);
}


#[tokio::test]
async fn runs_do_not_share_state() {
    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["only"]);
    let runner = Runner::new(registry);
    let g = graph("only", vec![node("only")], vec![]);

    let (a, b) = tokio::join!(
        runner.execute(&g, State::new()),
        runner.execute(&g, State::new()),
    );
    assert_eq!(visited_nodes(&a.unwrap().state), vec!["only"]);
    assert_eq!(visited_nodes(&b.unwrap().state), vec!["only"]);
}

#[tokio::test]
async fn graphs_deserialize_from_wire_format() {
    let g: Graph = serde_json::from_value(json!({
        "id": "g1",
        "entrypoint": "start",
        "nodes": {
            "start": {"name": "start"},
            "finish": {"name": "finish", "type": "computation"}
        },
        "edges": [
            {"source": "start", "target": "finish", "condition_key": "ok", "operator": "==", "value": true},
            {"source": "finish", "target": "__end__"}
        ]
    }))
    .unwrap();

    let mut registry = FunctionRegistry::new();
    register_tracing_nodes(&mut registry, &["start", "finish"]);
    registry.register(
        Namespace::Node,
        "start",
        sync_step(|mut state: State| {
            state.insert("ok".into(), json!(true));
            Ok(state)
        }),
    );

    let runner = Runner::new(registry);
    let outcome = runner.execute(&g, State::new()).await.unwrap();
    assert_eq!(executed_nodes(&outcome.logs), vec!["start", "finish"]);
    assert_eq!(outcome.termination, TerminationReason::ReachedEnd);
}

//! Built-in code-review step functions
//!
//! Five steps over the shared state map, all operating on `state.code` (a
//! code snippet as one string). Heuristics are deliberately crude; the
//! interesting part is the shape: plain functions of `State -> State`
//! registered through the engine's uniform step convention, with
//! `detect_smells` living in the tool namespace to demonstrate tool
//! dispatch.

use flowgraph_core::{sync_step, FunctionRegistry, Namespace, State};
use serde_json::{json, Value};

/// Install the built-in nodes and tools into `registry`.
///
/// Called once at process start, before any graph referencing these keys is
/// executed.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    registry.register(
        Namespace::Node,
        "extract_functions",
        sync_step(|state| Ok(extract_functions(state))),
    );
    registry.register(
        Namespace::Node,
        "check_complexity",
        sync_step(|state| Ok(check_complexity(state))),
    );
    registry.register(
        Namespace::Tool,
        "detect_smells",
        sync_step(|state| Ok(detect_smells(state))),
    );
    registry.register(
        Namespace::Node,
        "suggest_improvements",
        sync_step(|state| Ok(suggest_improvements(state))),
    );
    registry.register(
        Namespace::Node,
        "evaluate_quality",
        sync_step(|state| Ok(evaluate_quality(state))),
    );
}

fn source_code(state: &State) -> String {
    state
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn metrics_mut(state: &mut State) -> &mut serde_json::Map<String, Value> {
    if !state.get("metrics").is_some_and(Value::is_object) {
        state.insert("metrics".into(), Value::Object(Default::default()));
    }
    match state.get_mut("metrics") {
        Some(Value::Object(map)) => map,
        _ => unreachable!("metrics was just replaced with an object"),
    }
}

/// Collect `def `-style definition lines into `state.functions` as
/// `{name, line}` entries.
pub fn extract_functions(mut state: State) -> State {
    let code = source_code(&state);
    let mut functions = Vec::new();

    for line in code.lines() {
        let stripped = line.trim();
        if let Some(rest) = stripped.strip_prefix("def ") {
            if stripped.contains('(') && stripped.contains(':') {
                if let Some(name) = rest.split('(').next() {
                    functions.push(json!({"name": name.trim(), "line": line}));
                }
            }
        }
    }

    state.insert("functions".into(), Value::Array(functions));
    state
}

/// Score each extracted function by counting `for`/`while`/`if` tokens as a
/// stand-in for cyclomatic complexity, then derive a starting
/// `metrics.quality_score` in [0, 1] (lower complexity, higher score).
///
/// The token count is taken over the whole snippet rather than per function
/// body, so every function currently shares one score.
pub fn check_complexity(mut state: State) -> State {
    let code = source_code(&state);
    let names: Vec<String> = state
        .get("functions")
        .and_then(Value::as_array)
        .map(|functions| {
            functions
                .iter()
                .filter_map(|f| f.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let branch_tokens: i64 = code
        .lines()
        .map(|line| {
            line.split_whitespace()
                .filter(|token| matches!(*token, "for" | "while" | "if"))
                .count() as i64
        })
        .sum();

    let mut report = serde_json::Map::new();
    for name in names {
        report.insert(name, json!({"complexity_score": 1 + branch_tokens}));
    }

    let avg_complexity = if report.is_empty() {
        0.0
    } else {
        let total: f64 = report
            .values()
            .filter_map(|entry| entry.get("complexity_score").and_then(Value::as_f64))
            .sum();
        total / report.len() as f64
    };

    state.insert("complexity_report".into(), Value::Object(report));

    let normalized = (avg_complexity / 20.0).min(1.0);
    let quality_score = (1.0 - normalized).max(0.0);
    metrics_mut(&mut state).insert("quality_score".into(), json!(quality_score));
    state
}

/// Tool step: flag long lines, TODO markers, and deeply nested
/// conditionals into `state.issues`.
pub fn detect_smells(mut state: State) -> State {
    let code = source_code(&state);
    let mut issues = Vec::new();
    let deep_indent = " ".repeat(24);

    for (idx, line) in code.lines().enumerate() {
        let lineno = idx + 1;
        if line.chars().count() > 80 {
            issues.push(format!("Line {lineno}: line longer than 80 characters"));
        }
        if line.contains("TODO") {
            issues.push(format!("Line {lineno}: TODO comment present"));
        }
        if line.trim().starts_with("if ") && line.starts_with(deep_indent.as_str()) {
            issues.push(format!("Line {lineno}: deeply nested if-statement"));
        }
    }

    state.insert("issues".into(), json!(issues));
    state
}

/// Turn the complexity report and detected issues into rule-based
/// suggestions, de-duplicated preserving first occurrence, and bump
/// `metrics.quality_score` by `0.05 x max(1, suggestions)` capped at 1.0.
///
/// The bump simulates an auto-refactor pass; it is what makes the
/// evaluate -> suggest loop converge.
pub fn suggest_improvements(mut state: State) -> State {
    let mut suggestions: Vec<String> = Vec::new();
    let mut push_unique = |list: &mut Vec<String>, suggestion: String| {
        if !list.contains(&suggestion) {
            list.push(suggestion);
        }
    };

    if let Some(report) = state.get("complexity_report").and_then(Value::as_object) {
        for (fn_name, entry) in report {
            let score = entry
                .get("complexity_score")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            if score > 15 {
                push_unique(
                    &mut suggestions,
                    format!(
                        "Function '{fn_name}' has high complexity ({score}). \
                         Consider splitting into smaller helper functions."
                    ),
                );
            } else if score > 8 {
                push_unique(
                    &mut suggestions,
                    format!(
                        "Function '{fn_name}' is moderately complex ({score}). \
                         Try reducing nested conditionals."
                    ),
                );
            }
        }
    }

    if let Some(issues) = state.get("issues").and_then(Value::as_array) {
        for issue in issues.iter().filter_map(Value::as_str) {
            if issue.contains("80 characters") {
                push_unique(
                    &mut suggestions,
                    "Some lines are longer than 80 characters. Consider wrapping or \
                     extracting variables to improve readability."
                        .to_string(),
                );
            }
            if issue.contains("TODO") {
                push_unique(
                    &mut suggestions,
                    "Remove or resolve TODO comments before merging this code.".to_string(),
                );
            }
            if issue.contains("deeply nested") {
                push_unique(
                    &mut suggestions,
                    "Deeply nested conditionals detected. Refactor using guard clauses \
                     or early returns."
                        .to_string(),
                );
            }
        }
    }

    let bump = 0.05 * suggestions.len().max(1) as f64;
    state.insert("suggestions".into(), json!(suggestions));

    let metrics = metrics_mut(&mut state);
    let quality_score = metrics
        .get("quality_score")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    metrics.insert(
        "quality_score".into(),
        json!((quality_score + bump).min(1.0)),
    );
    state
}

/// Set `meets_quality` from `metrics.quality_score >= threshold`
/// (state `threshold`, default 0.8). Graph edges branch on this flag.
pub fn evaluate_quality(mut state: State) -> State {
    let threshold = state
        .get("threshold")
        .and_then(Value::as_f64)
        .unwrap_or(0.8);
    let quality_score = metrics_mut(&mut state)
        .get("quality_score")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    state.insert("meets_quality".into(), json!(quality_score >= threshold));
    state
}

//! Dotted-path state lookup and condition comparison
//!
//! Lookups never fail: a missing key or a non-object along the path yields
//! `None`, which edge conditions treat as JSON null for equality and as
//! unorderable for the ordering operators.
//!
//! Comparison policy: equality is JSON value equality, except that two
//! numbers compare numerically (`1 == 1.0`). Ordering is defined for
//! number-vs-number (as f64) and string-vs-string; every other pairing -
//! absent lhs, null, booleans, arrays, objects, mixed types - is
//! non-matching rather than an error.

use serde_json::Value;
use std::cmp::Ordering;

use crate::graph::{CompareOp, State};

/// Walk `state` by the `.`-separated segments of `path`.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object.
///
/// ```rust
/// use flowgraph_core::lookup_path;
/// use serde_json::json;
///
/// let state = json!({"a": {"b": 5}}).as_object().unwrap().clone();
/// assert_eq!(lookup_path(&state, "a.b"), Some(&json!(5)));
/// assert_eq!(lookup_path(&state, "a.c"), None);
/// ```
pub fn lookup_path<'a>(state: &'a State, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut value = state.get(segments.next()?)?;
    for segment in segments {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

/// Evaluate `lhs op rhs`, where `lhs` is the (possibly absent) state value.
pub fn compare(lhs: Option<&Value>, op: CompareOp, rhs: &Value) -> bool {
    match op {
        CompareOp::Eq => values_equal(lhs.unwrap_or(&Value::Null), rhs),
        CompareOp::Ne => !values_equal(lhs.unwrap_or(&Value::Null), rhs),
        CompareOp::Lt | CompareOp::Gt | CompareOp::Le | CompareOp::Ge => {
            let Some(lhs) = lhs else { return false };
            match ordering(lhs, rhs) {
                Some(ord) => match op {
                    CompareOp::Lt => ord == Ordering::Less,
                    CompareOp::Gt => ord == Ordering::Greater,
                    CompareOp::Le => ord != Ordering::Greater,
                    CompareOp::Ge => ord != Ordering::Less,
                    _ => unreachable!(),
                },
                None => false,
            }
        }
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(l), Some(r)) => l == r,
        _ => lhs == rhs,
    }
}

fn ordering(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (lhs.as_f64(), rhs.as_f64()) {
        return l.partial_cmp(&r);
    }
    if let (Some(l), Some(r)) = (lhs.as_str(), rhs.as_str()) {
        return Some(l.cmp(r));
    }
    None
}

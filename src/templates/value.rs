// src/templates/value.rs

//! JSON value helpers shared by the bundled engines.

use serde_json::Value;

/// Follow a dotted path (`foo.bar.0.baz`) from `root`.
///
/// Numeric segments index into arrays. `.` and the empty path return
/// `root` itself.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() || path == "." || path == "this" {
        return Some(root);
    }
    let mut current = root;
    for segment in path.split('.') {
        current = step(current, segment)?;
    }
    Some(current)
}

pub fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Text form used when a value is written into output.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// A quoted string literal (`"x"` or `'x'`), unquoted.
pub fn string_literal(expr: &str) -> Option<&str> {
    let expr = expr.trim();
    if expr.len() >= 2 {
        let (first, last) = (expr.as_bytes()[0], expr.as_bytes()[expr.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return Some(&expr[1..expr.len() - 1]);
        }
    }
    None
}

/// Evaluate a simple output expression: a string literal or a dotted path.
/// Missing paths evaluate to the empty string.
pub fn eval_to_string(data: &Value, expr: &str) -> String {
    if let Some(lit) = string_literal(expr) {
        return lit.to_string();
    }
    lookup(data, expr).map(display).unwrap_or_default()
}

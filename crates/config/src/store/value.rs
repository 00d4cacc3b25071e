//! Dotted-path access, merging, and loose type casts over `serde_json` values.

use serde_json::{Map, Value};

/// Look up a dotted, already lower-cased key such as `owner.name`.
pub(crate) fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Insert `value` at a dotted key, creating intermediate objects.
///
/// A scalar in the way of the path is replaced by an object.
pub(crate) fn insert_path(map: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            map.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child_map) = child {
                insert_path(child_map, rest, value);
            }
        }
    }
}

/// Merge `src` into `dst`; nested objects merge, everything else is replaced.
pub(crate) fn deep_merge(dst: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, incoming) in src {
        match (dst.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, incoming) => {
                dst.insert(key, incoming);
            }
        }
    }
}

/// Collect every leaf key as a dotted path.
pub(crate) fn leaf_keys(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(child) if !child.is_empty() => leaf_keys(child, &path, out),
            _ => out.push(path),
        }
    }
}

pub(crate) fn to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "t" | "true" | "yes" | "on"
        ),
        _ => false,
    }
}

pub(crate) fn to_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or_default()
        }
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

pub(crate) fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// Sequences map element-wise; strings split on whitespace.
pub(crate) fn to_string_vec(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(to_string).collect(),
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        Value::Null => Vec::new(),
        other => vec![to_string(other)],
    }
}

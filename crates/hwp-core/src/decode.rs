//! Lenient accessors over untyped JSON trees.
//!
//! Stored objects are schemaless. Each helper returns `None` when a path
//! segment is missing or the value has the wrong shape, so callers decide
//! whether absence is an error.

use serde_json::{Map, Value};

/// Walk `path` from `root`, descending through objects only.
pub fn nested<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |current, segment| current.as_object()?.get(*segment))
}

pub fn nested_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    nested(root, path)?.as_str()
}

pub fn nested_bool(root: &Value, path: &[&str]) -> Option<bool> {
    nested(root, path)?.as_bool()
}

pub fn nested_object<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Map<String, Value>> {
    nested(root, path)?.as_object()
}

pub fn nested_array<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    nested(root, path)?.as_array()
}

/// String field of a map, empty when missing or not a string.
pub fn str_or_empty(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

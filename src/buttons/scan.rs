//! Depth-first search over JSON documents.

use serde_json::Value;

/// What to do after visiting a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Continue into the value.
    Descend,
    /// Leave the value's subtree alone.
    Skip,
}

/// Visit every `(key, value)` pair in pre-order, in document order.
///
/// Keys listed in `excluded` are neither reported nor descended into.
/// Array elements are traversed but have no key of their own.
pub fn visit<'a, F>(value: &'a Value, excluded: &[&str], f: &mut F)
where
    F: FnMut(&'a str, &'a Value) -> Visit,
{
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if excluded.contains(&key.as_str()) {
                    continue;
                }
                if f(key, child) == Visit::Descend {
                    visit(child, excluded, f);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                visit(item, excluded, f);
            }
        }
        _ => {}
    }
}

/// All values stored under any of `keys`, depth-first, without deduplication.
/// A matching value is not searched further.
pub fn find_all<'a>(value: &'a Value, keys: &[&str], excluded: &[&str]) -> Vec<(&'a str, &'a Value)> {
    let mut found = Vec::new();
    visit(value, excluded, &mut |key, child| {
        if keys.contains(&key) {
            found.push((key, child));
            Visit::Skip
        } else {
            Visit::Descend
        }
    });
    found
}

/// A value as a list: arrays yield their elements, anything else itself.
pub fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Non-empty strings held by `value` (a string or an array of strings).
pub fn strings(value: &Value) -> Vec<&str> {
    as_list(value)
        .into_iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

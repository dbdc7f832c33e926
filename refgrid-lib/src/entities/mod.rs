//! Concrete entity tables and record-formatting helpers.
//!
//! Backends drift on field naming (`ID` vs `id`, `hospitalName` vs `name`),
//! so formatters probe an ordered list of candidate keys and take the first
//! one that is present.

mod hospital;
mod notification;

pub use hospital::Hospitals;
pub use notification::Notifications;

use crate::model::Value;

/// Returns the first candidate key that is present and not `null`.
pub fn probe<'a>(raw: &'a serde_json::Value, candidates: &[&str]) -> Option<&'a serde_json::Value> {
    candidates
        .iter()
        .filter_map(|key| raw.get(key))
        .find(|value| !value.is_null())
}

/// Returns the first present candidate as a [`Value`], or the `"N/A"` placeholder.
pub fn probe_or_na(raw: &serde_json::Value, candidates: &[&str]) -> Value {
    probe(raw, candidates)
        .map(Value::from_json)
        .unwrap_or_else(Value::na)
}

/// Like [`probe`], but also skips empty strings, `false` and zero.
pub fn probe_truthy<'a>(
    raw: &'a serde_json::Value,
    candidates: &[&str],
) -> Option<&'a serde_json::Value> {
    candidates
        .iter()
        .filter_map(|key| raw.get(key))
        .find(|value| is_truthy(value))
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

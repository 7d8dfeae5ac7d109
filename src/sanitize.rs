//! Redacts sensitive parameter values before they cross the sink boundary.

use crate::protocol::{Map, Value};

/// Marker written in place of a redacted value.
pub const REDACTED: &str = "[Filtered]";

/// Keys redacted on an exact, case-insensitive match.
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "passwd",
    "pass",
    "pwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "access_token",
    "auth",
    "credentials",
];

/// Substrings that make any key sensitive, case-insensitive.
const SENSITIVE_FRAGMENTS: &[&str] = &["password", "token", "secret"];

/// Returns `true` when a parameter name must be redacted.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.contains(&key.as_str())
        || SENSITIVE_FRAGMENTS
            .iter()
            .any(|fragment| key.contains(fragment))
}

/// Returns a sanitized copy of a parameter mapping.
///
/// Sensitive keys are replaced with [`REDACTED`] regardless of their value
/// type: a sensitive key holding a container loses the whole container,
/// the match wins before descending. Non-sensitive nested mappings are
/// sanitized recursively, including mappings stored inside arrays;
/// non-sensitive scalars pass through unchanged. The function is
/// idempotent.
pub fn sanitize_params(params: &Map<String, Value>) -> Map<String, Value> {
    let mut clean = Map::new();
    for (key, value) in params {
        let value = if is_sensitive_key(key) {
            Value::String(REDACTED.into())
        } else {
            sanitize_value(value)
        };
        clean.insert(key.clone(), value);
    }
    clean
}

fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Object(nested) => Value::Object(sanitize_params(nested)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        other => other.clone(),
    }
}

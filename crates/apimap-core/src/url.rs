//! URL template resolution.
//!
//! Templates use two placeholder styles interchangeably: `:name` and
//! `{name}`. Each occurrence is replaced with the stringified value of
//! `params[name]`. A placeholder with no matching param resolves to an
//! empty fragment: permissive by contract, never an error.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\B(?::(\w+)|\{(\w+)\})").expect("placeholder regex is valid")
    })
}

/// Substitutes every `:name` / `{name}` placeholder in `template` with the
/// stringified value of `params[name]`.
///
/// Missing params substitute an empty fragment and emit a warning.
///
/// # Example
///
/// ```
/// use apimap_core::url::resolve;
/// use serde_json::json;
/// use std::collections::BTreeMap;
///
/// let mut params = BTreeMap::new();
/// params.insert("id".to_owned(), json!(123));
/// params.insert("time".to_owned(), json!(1000));
/// assert_eq!(resolve("/api/{id}/:time/info", &params), "/api/123/1000/info");
/// ```
#[must_use]
pub fn resolve(template: &str, params: &BTreeMap<String, Value>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            params.get(name).map_or_else(
                || {
                    tracing::warn!(template, param = name, "unresolved url template placeholder");
                    String::new()
                },
                value_to_string,
            )
        })
        .into_owned()
}

/// Stringifies a JSON value for use in a URL or query string.
///
/// Strings render without quotes, `null` renders empty, everything else via
/// its JSON representation.
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

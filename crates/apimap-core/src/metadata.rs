//! Declarative endpoint metadata.
//!
//! A [`Metadata`] record describes one API endpoint: an HTTP verb, a URL
//! template (with `:name` / `{name}` placeholders) and an optional
//! diagnostic label. Metadata is immutable once registered; validation
//! happens per entry at registration time, never per call.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable description of one API endpoint.
///
/// # Example
///
/// ```
/// use apimap_core::Metadata;
///
/// let meta = Metadata::new("post", "/api/{id}/:time/info");
/// assert!(meta.validate("test").is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// HTTP verb, case-insensitive (`get`, `POST`, ...).
    pub method: String,

    /// URL template. Placeholders of the form `:name` or `{name}` are
    /// substituted from the call's `params` at dispatch time.
    pub url: String,

    /// Optional diagnostic label included in fallback log lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Metadata {
    /// Creates a new metadata record.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            name: None,
        }
    }

    /// Attaches a diagnostic label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validates that `method` and `url` are both present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] naming `key` when either field is empty.
    pub fn validate(&self, key: &str) -> ApiResult<()> {
        if self.method.trim().is_empty() || self.url.trim().is_empty() {
            return Err(ApiError::config(key, "'method' or 'url' value not found"));
        }
        Ok(())
    }

    /// Returns the HTTP verb lower-cased for dispatch.
    #[must_use]
    pub fn method_lowercase(&self) -> String {
        self.method.to_lowercase()
    }

    /// Returns the diagnostic label, falling back to the URL template.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

/// A registration mapping of endpoint names to metadata.
///
/// Two shapes are accepted, mirroring the flat and namespaced registration
/// modes:
///
/// ```json
/// { "list": { "method": "get", "url": "/api/list" } }
/// ```
///
/// ```json
/// { "stock": { "list": { "method": "get", "url": "/api/stock/list" } } }
/// ```
///
/// Deserialization is untagged, so either shape loads directly from
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataMap {
    /// One flat namespace of `name -> Metadata`.
    Flat(BTreeMap<String, Metadata>),
    /// Namespaced mapping of `namespace -> name -> Metadata`.
    Namespaced(BTreeMap<String, BTreeMap<String, Metadata>>),
}

impl MetadataMap {
    /// Returns every `(key, metadata)` entry in registration order.
    ///
    /// Namespaced entries use dotted keys (`namespace.name`).
    #[must_use]
    pub fn entries(&self) -> Vec<(String, &Metadata)> {
        match self {
            Self::Flat(map) => map.iter().map(|(k, m)| (k.clone(), m)).collect(),
            Self::Namespaced(namespaces) => namespaces
                .iter()
                .flat_map(|(ns, map)| {
                    map.iter().map(move |(k, m)| (format!("{ns}.{k}"), m))
                })
                .collect(),
        }
    }

    /// Returns the total number of metadata entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(map) => map.len(),
            Self::Namespaced(namespaces) => namespaces.values().map(BTreeMap::len).sum(),
        }
    }

    /// Returns true when no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MetadataMap {
    fn default() -> Self {
        Self::Flat(BTreeMap::new())
    }
}

impl From<BTreeMap<String, Metadata>> for MetadataMap {
    fn from(map: BTreeMap<String, Metadata>) -> Self {
        Self::Flat(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_complete_metadata() {
        let meta = Metadata::new("GET", "/api/test");
        assert!(meta.validate("test").is_ok());
        assert_eq!(meta.method_lowercase(), "get");
    }

    #[test]
    fn test_validate_rejects_empty_method() {
        let meta = Metadata::new("", "/api/test");
        let err = meta.validate("test").unwrap_err();
        assert_eq!(
            err.to_string(),
            "api metadata [test]: 'method' or 'url' value not found"
        );
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let meta = Metadata::new("get", "   ");
        assert!(meta.validate("test").is_err());
    }

    #[test]
    fn test_label_prefers_name() {
        let meta = Metadata::new("get", "/api/test").with_name("fetch test");
        assert_eq!(meta.label(), "fetch test");
        assert_eq!(Metadata::new("get", "/api/test").label(), "/api/test");
    }

    #[test]
    fn test_flat_map_deserializes() {
        let map: MetadataMap = serde_json::from_value(json!({
            "test": { "method": "post", "url": "/api/test" }
        }))
        .unwrap();
        assert!(matches!(map, MetadataMap::Flat(_)));
        let entries = map.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "test");
    }

    #[test]
    fn test_namespaced_map_deserializes_with_dotted_keys() {
        let map: MetadataMap = serde_json::from_value(json!({
            "stock": {
                "list": { "method": "get", "url": "/api/stock/list", "name": "stock list" }
            }
        }))
        .unwrap();
        assert!(matches!(map, MetadataMap::Namespaced(_)));
        let entries = map.entries();
        assert_eq!(entries[0].0, "stock.list");
        assert_eq!(entries[0].1.name.as_deref(), Some("stock list"));
    }

    #[test]
    fn test_len_counts_namespaced_entries() {
        let map: MetadataMap = serde_json::from_value(json!({
            "a": { "one": { "method": "get", "url": "/1" } },
            "b": { "two": { "method": "get", "url": "/2" },
                   "three": { "method": "get", "url": "/3" } }
        }))
        .unwrap();
        assert_eq!(map.len(), 3);
        assert!(!map.is_empty());
    }
}

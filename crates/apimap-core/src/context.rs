//! Per-call context types.
//!
//! A [`CallContext`] is created for every invocation of a generated
//! endpoint and threaded through all three hooks of that call. It is the
//! single source of truth for the call's request data, transport overrides,
//! response and error state. Hooks mutate it through the explicit setters;
//! the orchestrator snapshots it at dispatch time.
//!
//! Contexts are shared as [`ContextCell`]s so the endpoint can republish the
//! current context immediately (visible to before-hooks and to external
//! inspection) and retain it after the call settles. A new call replaces the
//! retained cell; prior cells stay valid, never-again-mutated snapshots.

use crate::error::ApiError;
use crate::metadata::Metadata;
use crate::transport::{CancelToken, TransportResponse};
use crate::url;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Shared handle to one call's [`CallContext`].
pub type ContextCell = Arc<Mutex<CallContext>>;

/// The caller-supplied invocation payload.
///
/// # Example
///
/// ```
/// use apimap_core::CallData;
/// use serde_json::json;
///
/// let data = CallData::new()
///     .param("id", 123)
///     .query("o", "calvin")
///     .body(json!({ "a": 1 }));
/// assert_eq!(data.params["id"], json!(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallData {
    /// Query-string parameters.
    #[serde(default)]
    pub query: BTreeMap<String, Value>,
    /// URL template parameters.
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    /// JSON request body.
    #[serde(default)]
    pub body: Option<Value>,
}

impl CallData {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one query-string parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds one URL template parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl From<()> for CallData {
    fn from((): ()) -> Self {
        Self::default()
    }
}

/// Per-call transport overrides. Caller values always win over the values
/// derived from metadata and call data.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the metadata HTTP verb.
    pub method: Option<String>,
    /// Overrides the resolved URL.
    pub url: Option<String>,
    /// Replaces the derived query-string parameters.
    pub query: Option<BTreeMap<String, Value>>,
    /// Replaces the derived request body.
    pub body: Option<Value>,
    /// Additional request headers.
    pub headers: BTreeMap<String, String>,
    /// Per-call timeout.
    pub timeout: Option<Duration>,
    /// Cancellation token for this call.
    pub cancel: Option<CancelToken>,
    /// Opaque passthrough options forwarded to the transport verbatim.
    pub extra: BTreeMap<String, Value>,
}

impl RequestOptions {
    /// Creates empty options (no overrides).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the HTTP verb.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Overrides the dispatch URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Adds one request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets a per-call timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Adds one opaque passthrough option.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Mutable per-invocation state threaded through the hook pipeline.
///
/// One instance exists per call; the next call constructs a fresh context
/// rather than reusing this one, so error state is never cleared in place.
#[derive(Debug)]
pub struct CallContext {
    metadata: Arc<Metadata>,
    data: CallData,
    options: RequestOptions,
    response: Option<TransportResponse>,
    response_error: Option<ApiError>,
}

impl CallContext {
    /// Creates a fresh context for one invocation of `metadata`.
    #[must_use]
    pub fn new(metadata: Arc<Metadata>) -> Self {
        Self {
            metadata,
            data: CallData::default(),
            options: RequestOptions::default(),
            response: None,
            response_error: None,
        }
    }

    /// Returns the metadata this context was built from.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the invocation payload.
    #[must_use]
    pub fn data(&self) -> &CallData {
        &self.data
    }

    /// Returns the per-call transport overrides.
    #[must_use]
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Returns the transport response, set once after a successful dispatch.
    #[must_use]
    pub fn response(&self) -> Option<&TransportResponse> {
        self.response.as_ref()
    }

    /// Returns the error recorded on this call, if any.
    #[must_use]
    pub fn response_error(&self) -> Option<&ApiError> {
        self.response_error.as_ref()
    }

    /// Mutable access to the invocation payload, for in-place hook edits.
    pub fn data_mut(&mut self) -> &mut CallData {
        &mut self.data
    }

    /// Mutable access to the per-call overrides, for in-place hook edits.
    pub fn options_mut(&mut self) -> &mut RequestOptions {
        &mut self.options
    }

    /// Stores the invocation payload. Chainable.
    pub fn set_data(&mut self, data: impl Into<CallData>) -> &mut Self {
        self.data = data.into();
        self
    }

    /// Stores the per-call transport overrides. Chainable.
    pub fn set_request_options(&mut self, options: RequestOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Stores a successful transport response.
    ///
    /// Does not clear an existing error.
    pub fn set_response(&mut self, response: TransportResponse) {
        self.response = Some(response);
    }

    /// Normalizes and stores an error.
    ///
    /// Accepts anything convertible to [`ApiError`]: existing errors pass
    /// through unchanged, strings are wrapped as message errors, other JSON
    /// values are stored as opaque payloads. Never fails.
    pub fn set_error(&mut self, error: impl Into<ApiError>) {
        self.response_error = Some(error.into());
    }

    /// The HTTP verb lower-cased for dispatch.
    #[must_use]
    pub fn method(&self) -> String {
        self.metadata.method_lowercase()
    }

    /// The URL template resolved against the payload's `params`.
    #[must_use]
    pub fn resolved_url(&self) -> String {
        url::resolve(&self.metadata.url, &self.data.params)
    }

    /// Wraps this context in a shared cell.
    #[must_use]
    pub fn into_cell(self) -> ContextCell {
        Arc::new(Mutex::new(self))
    }
}

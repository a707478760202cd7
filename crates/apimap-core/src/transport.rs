//! The transport collaborator boundary.
//!
//! The core never performs network I/O itself. Everything it needs from an
//! HTTP client is captured by the [`Transport`] trait: take a fully merged
//! [`DispatchConfig`], return a [`TransportResponse`] or an
//! [`ApiError`](crate::error::ApiError). The shared transport instance must
//! tolerate concurrent in-flight requests; the core enforces no timeouts of
//! its own.
//!
//! Cancellation is cooperative: a [`CancelSource`] hands out a
//! [`CancelToken`] that a dispatch may race against. Triggering the source
//! settles the matching in-flight dispatch with an error whose message
//! equals the supplied reason; triggering after settlement is a no-op.

use crate::error::ApiResult;
use http::StatusCode;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// A boxed future, the return shape at the transport and hook seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The fully merged configuration for one dispatch.
///
/// Derived fields (method, resolved URL, query, body) are filled from the
/// call context; per-call [`RequestOptions`](crate::context::RequestOptions)
/// override them, caller always winning.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Lower-cased HTTP verb.
    pub method: String,
    /// Resolved URL (template placeholders already substituted).
    pub url: String,
    /// Query-string parameters.
    pub query: BTreeMap<String, Value>,
    /// JSON request body, if any.
    pub body: Option<Value>,
    /// Additional request headers.
    pub headers: BTreeMap<String, String>,
    /// Per-call timeout override.
    pub timeout: Option<Duration>,
    /// Cancellation token to race the dispatch against.
    pub cancel: Option<CancelToken>,
    /// Opaque passthrough options the core does not interpret.
    pub extra: BTreeMap<String, Value>,
}

/// The response reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Decoded response body.
    pub data: Value,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
}

impl TransportResponse {
    /// Creates a `200 OK` response around a body, convenient for tests and
    /// defaults.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            status: StatusCode::OK,
            data,
            headers: BTreeMap::new(),
        }
    }
}

/// The HTTP dispatch capability consumed by the request orchestrator.
///
/// Implementations must be safe for concurrent in-flight requests; one
/// instance is shared by every endpoint of a module.
pub trait Transport: Send + Sync {
    /// Issues one request described by `config`.
    fn dispatch(&self, config: DispatchConfig) -> BoxFuture<'static, ApiResult<TransportResponse>>;
}

#[derive(Debug, Default)]
struct CancelState {
    notify: Notify,
    reason: Mutex<Option<String>>,
}

/// A cancellation handle: an opaque token plus a trigger.
///
/// # Example
///
/// ```
/// use apimap_core::CancelSource;
///
/// let source = CancelSource::new();
/// let token = source.token();
/// source.cancel("Canceled by the user");
/// assert_eq!(token.reason().as_deref(), Some("Canceled by the user"));
/// ```
#[derive(Debug, Default)]
pub struct CancelSource {
    state: Arc<CancelState>,
}

impl CancelSource {
    /// Creates a new cancellation source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the token to attach to a dispatch.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken {
            state: Arc::clone(&self.state),
        }
    }

    /// Triggers cancellation with the given reason.
    ///
    /// The first reason wins; repeated triggers are no-ops. Cancelling after
    /// the dispatch has settled has no effect on the settled call.
    pub fn cancel(&self, reason: impl Into<String>) {
        {
            let mut slot = self.state.reason.lock();
            if slot.is_none() {
                *slot = Some(reason.into());
            }
        }
        self.state.notify.notify_waiters();
    }
}

/// The opaque token side of a [`CancelSource`].
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    /// Returns true once the source has been triggered.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.reason.lock().is_some()
    }

    /// Returns the cancellation reason once triggered.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.state.reason.lock().clone()
    }

    /// Resolves with the cancellation reason once the source is triggered.
    ///
    /// Resolves immediately when the token was cancelled before the await.
    pub async fn cancelled(&self) -> String {
        loop {
            let notified = self.state.notify.notified();
            if let Some(reason) = self.reason() {
                return reason;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_token_reflects_trigger_state() {
        let source = CancelSource::new();
        let token = source.token();
        assert!(!token.is_cancelled());
        assert!(token.reason().is_none());

        source.cancel("stop");
        assert!(token.is_cancelled());
        assert_eq!(token.reason().as_deref(), Some("stop"));
    }

    #[test]
    fn test_first_reason_wins() {
        let source = CancelSource::new();
        source.cancel("first");
        source.cancel("second");
        assert_eq!(source.token().reason().as_deref(), Some("first"));
    }

    #[test]
    fn test_cancelled_resolves_immediately_when_pre_triggered() {
        let source = CancelSource::new();
        source.cancel("early");
        assert_eq!(tokio_test::block_on(source.token().cancelled()), "early");
    }

    #[tokio::test]
    async fn test_cancelled_wakes_a_waiting_task() {
        let source = CancelSource::new();
        let token = source.token();
        let waiter = tokio::spawn(async move { token.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        source.cancel("late");

        let reason = waiter.await.expect("waiter task panicked");
        assert_eq!(reason, "late");
    }

    #[test]
    fn test_transport_response_ok_helper() {
        let response = TransportResponse::ok(json!({ "a": 1 }));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.data, json!({ "a": 1 }));
        assert!(response.headers.is_empty());
    }
}

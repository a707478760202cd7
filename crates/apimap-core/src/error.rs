//! Error types for apimap.
//!
//! [`ApiError`] is the single error type used throughout the workspace. It is
//! deliberately a `Clone`-able *value*: the same error is stored on the
//! [`CallContext`](crate::context::CallContext) for post-call inspection and
//! returned from the generated call, so it cannot carry non-clonable source
//! chains. Transport failures are flattened to a message plus an optional
//! HTTP status at the transport boundary.
//!
//! Cancellation produces a [`ApiError::Transport`] whose message equals the
//! cancellation reason. There is no dedicated cancellation variant:
//! cancellations are distinguishable from other transport failures only by
//! message content.

use serde_json::Value;
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard error type for apimap.
///
/// # Example
///
/// ```
/// use apimap_core::ApiError;
///
/// let err = ApiError::config("user.list", "'method' or 'url' value not found");
/// assert!(err.to_string().contains("user.list"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Endpoint metadata was rejected at registration time.
    ///
    /// Raised synchronously while building a module; fatal to the named
    /// entry only, sibling entries are unaffected.
    #[error("api metadata [{key}]: {message}")]
    Config {
        /// The metadata key (namespaced keys use `ns.name`).
        key: String,
        /// Human-readable reason the entry was rejected.
        message: String,
    },

    /// A plain message error, typically signalled by a hook or normalized
    /// from a string value.
    #[error("{0}")]
    Message(String),

    /// A failure surfaced by the transport collaborator.
    ///
    /// Covers network failures, non-2xx statuses and cancellation (where the
    /// message equals the cancellation reason).
    #[error("{message}")]
    Transport {
        /// Human-readable failure message.
        message: String,
        /// The HTTP status code, when the failure carries one.
        status: Option<u16>,
    },

    /// An opaque, non-string error payload stored as-is.
    #[error("{0}")]
    Payload(Value),
}

impl ApiError {
    /// Creates a configuration error naming the offending metadata key.
    #[must_use]
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a plain message error.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Creates a transport error without a status code.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a transport error carrying an HTTP status code.
    #[must_use]
    pub fn transport_status(message: impl Into<String>, status: u16) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Returns the HTTP status code attached to a transport error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true for errors rejected at registration time.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

impl From<String> for ApiError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for ApiError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<Value> for ApiError {
    /// Normalizes an arbitrary JSON value into an error: strings become
    /// [`ApiError::Message`], everything else is kept as an opaque
    /// [`ApiError::Payload`].
    fn from(value: Value) -> Self {
        match value {
            Value::String(message) => Self::Message(message),
            other => Self::Payload(other),
        }
    }
}

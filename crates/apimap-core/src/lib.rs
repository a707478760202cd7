//! Core types and traits for the apimap API-client generator.
//!
//! This crate holds the leaf types the rest of the workspace is built on:
//!
//! - [`Metadata`] / [`MetadataMap`]: declarative endpoint descriptions
//! - [`CallContext`]: the per-call mutable state threaded through the
//!   before/after/fallback hook pipeline
//! - [`ApiError`]: the error value flowing through contexts and results
//! - [`Transport`]: the boundary contract for the HTTP dispatch collaborator
//! - [`CancelSource`] / [`CancelToken`]: cooperative request cancellation
//!
//! Nothing in this crate performs network I/O; the transport trait is
//! implemented elsewhere (see `apimap-transport`) or by test doubles.

pub mod context;
pub mod error;
pub mod metadata;
pub mod transport;
pub mod url;

pub use context::{CallContext, CallData, ContextCell, RequestOptions};
pub use error::{ApiError, ApiResult};
pub use metadata::{Metadata, MetadataMap};
pub use transport::{
    BoxFuture, CancelSource, CancelToken, DispatchConfig, Transport, TransportResponse,
};

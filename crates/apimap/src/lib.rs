//! # apimap
//!
//! **Declarative HTTP API-client generator**
//!
//! Describe your API endpoints as data (a mapping of names to HTTP verb +
//! URL template) and apimap turns the mapping into callable endpoints. A
//! three-stage hook pipeline (before-request, after-response,
//! error-fallback) wraps every call, and a per-call [`CallContext`] threads
//! request/response state through the pipeline, retained on the endpoint for
//! post-call inspection.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use apimap::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ApiError> {
//!     let metadatas: MetadataMap = serde_json::from_value(json!({
//!         "info": { "method": "post", "url": "/api/{id}/info" }
//!     }))
//!     .expect("valid metadata");
//!
//!     let build = ApiModule::build(
//!         ModuleConfig::new(metadatas)
//!             .base(BaseConfig::new().base_url("http://localhost:7788")),
//!     )?;
//!     assert!(build.rejected.is_empty());
//!
//!     let module = build.module;
//!     let info = module.api().get("info").expect("registered");
//!     let body = info
//!         .call(CallData::new().param("id", 123), RequestOptions::new())
//!         .await?;
//!     println!("{body}");
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! call → [before] → dispatch → [after]    → resolve(body)
//!               ↘ error ----→ [fallback]   → reject(error)
//! ```
//!
//! Hooks resolve per kind by priority: instance hook → shared
//! [`HookRegistry`] → built-in default. All error paths (before-hook,
//! transport and after-hook failures) route through the fallback hook,
//! whose outcome is the final error.

// Re-export the building-block crates.
pub use apimap_core as core;
pub use apimap_middleware as middleware;
pub use apimap_transport as transport;

pub mod endpoint;
pub mod module;
pub mod registry;

pub use endpoint::Endpoint;
pub use module::{ApiModule, ModuleBuild, ModuleConfig, ModuleShared};
pub use registry::{ApiSet, RejectedMetadata};

// Flatten the types a typical caller needs.
pub use apimap_core::{
    ApiError, ApiResult, BoxFuture, CallContext, CallData, CancelSource, CancelToken, ContextCell,
    DispatchConfig, Metadata, MetadataMap, RequestOptions, Transport, TransportResponse,
};
pub use apimap_middleware::{hook_fn, FnHook, Hook, HookKind, HookOutcome, HookRegistry};
pub use apimap_transport::{BaseConfig, HttpTransport};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use apimap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::endpoint::Endpoint;
    pub use crate::module::{ApiModule, ModuleBuild, ModuleConfig};
    pub use apimap_core::{
        ApiError, ApiResult, CallContext, CallData, CancelSource, Metadata, MetadataMap,
        RequestOptions,
    };
    pub use apimap_middleware::{hook_fn, HookKind, HookOutcome, HookRegistry};
    pub use apimap_transport::BaseConfig;
}

//! The generated callable and its request orchestration.
//!
//! [`Endpoint::call`] drives the per-call state machine:
//!
//! 1. allocate a fresh [`CallContext`] and republish it on the endpoint
//!    (visible to before-hooks and to post-call inspection)
//! 2. run the before-hook; a signalled error, or an error already present
//!    on the context, diverts to the fallback path
//! 3. merge the dispatch configuration (caller options win over derived
//!    values) and dispatch through the shared transport
//! 4. on success, record the response and run the after-hook; on any error,
//!    normalize it onto the context and run the fallback-hook, whose
//!    outcome is the final error
//!
//! After-hook failures route through the fallback hook exactly like
//! before-hook and transport failures, keeping the three error paths
//! symmetric.
//!
//! Within one call the ordering is strict: before → dispatch →
//! after-or-fallback, with no reentrancy. Each call owns its own context;
//! the context cell retained on the endpoint is replaced (never mutated)
//! by the next call, so earlier cells stay valid snapshots.

use crate::module::ModuleShared;
use apimap_core::{
    ApiError, ApiResult, CallContext, CallData, ContextCell, DispatchConfig, Metadata,
    RequestOptions,
};
use apimap_middleware::{HookKind, HookOutcome};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// One callable API endpoint generated from a metadata entry.
#[derive(Debug)]
pub struct Endpoint {
    metadata: Arc<Metadata>,
    shared: Arc<ModuleShared>,
    last_context: Mutex<Option<ContextCell>>,
}

impl Endpoint {
    pub(crate) fn new(metadata: Arc<Metadata>, shared: Arc<ModuleShared>) -> Self {
        Self {
            metadata,
            shared,
            last_context: Mutex::new(None),
        }
    }

    /// Returns the metadata this endpoint was generated from.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the most recently created call context.
    ///
    /// `None` before the first invocation. The cell is published at the
    /// start of each call, so it is live while the call is in flight and a
    /// stable snapshot afterwards.
    #[must_use]
    pub fn context(&self) -> Option<ContextCell> {
        self.last_context.lock().clone()
    }

    /// Issues one request through the hook pipeline.
    ///
    /// Resolves with the transport-reported response body. All errors
    /// (hook-signalled, transport and cancellation) reject through the
    /// fallback hook.
    pub async fn call(
        &self,
        data: impl Into<CallData>,
        options: RequestOptions,
    ) -> ApiResult<Value> {
        let cell = {
            let mut ctx = CallContext::new(Arc::clone(&self.metadata));
            ctx.set_data(data).set_request_options(options);
            ctx.into_cell()
        };
        *self.last_context.lock() = Some(Arc::clone(&cell));

        let before = self.shared.runner().run(HookKind::Before, &cell).await;
        let pre_dispatch_error = match before {
            HookOutcome::Fail(err) => Some(err),
            HookOutcome::Proceed => cell.lock().response_error().cloned(),
        };
        if let Some(err) = pre_dispatch_error {
            return Err(self.fail(&cell, err).await);
        }

        let config = build_dispatch(&cell.lock());
        match self.shared.transport().dispatch(config).await {
            Ok(response) => {
                cell.lock().set_response(response);
                match self.shared.runner().run(HookKind::After, &cell).await {
                    HookOutcome::Fail(err) => Err(self.fail(&cell, err).await),
                    HookOutcome::Proceed => {
                        let body = cell
                            .lock()
                            .response()
                            .map(|r| r.data.clone())
                            .unwrap_or(Value::Null);
                        Ok(body)
                    }
                }
            }
            Err(err) => Err(self.fail(&cell, err).await),
        }
    }

    /// Records `err` on the context and runs the fallback hook; the hook's
    /// outcome decides the final error (an explicit failure replaces the
    /// recorded error and is re-applied to the context).
    async fn fail(&self, cell: &ContextCell, err: ApiError) -> ApiError {
        cell.lock().set_error(err);
        match self.shared.runner().run(HookKind::Fallback, cell).await {
            HookOutcome::Fail(replacement) => {
                cell.lock().set_error(replacement.clone());
                replacement
            }
            HookOutcome::Proceed => cell
                .lock()
                .response_error()
                .cloned()
                .unwrap_or_else(|| ApiError::message("request failed")),
        }
    }
}

/// Merges the derived dispatch values with the per-call overrides; the
/// caller always wins.
fn build_dispatch(ctx: &CallContext) -> DispatchConfig {
    let options = ctx.options();
    DispatchConfig {
        method: options
            .method
            .as_ref()
            .map_or_else(|| ctx.method(), |m| m.to_lowercase()),
        url: options.url.clone().unwrap_or_else(|| ctx.resolved_url()),
        query: options
            .query
            .clone()
            .unwrap_or_else(|| ctx.data().query.clone()),
        body: options.body.clone().or_else(|| ctx.data().body.clone()),
        headers: options.headers.clone(),
        timeout: options.timeout,
        cancel: options.cancel.clone(),
        extra: options.extra.clone(),
    }
}

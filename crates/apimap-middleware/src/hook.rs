//! The hook trait and supporting types.
//!
//! A hook receives the call's [`ContextCell`] and resolves to a
//! [`HookOutcome`]. The hook decides whether and when the call proceeds: the
//! orchestrator awaits the hook's future, so a future that never resolves
//! stalls that call indefinitely. That is the documented contract, not a
//! bug: the core enforces no hook timeouts.

use apimap_core::{ApiError, BoxFuture, ContextCell};
use std::future::Future;
use std::sync::Arc;

/// The three hook kinds of the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Runs before URL resolution and dispatch.
    Before,
    /// Runs after a successful dispatch, before settlement.
    After,
    /// Runs on the error path; its outcome is the final error.
    Fallback,
}

impl HookKind {
    /// Returns the kind name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Fallback => "fallback",
        }
    }
}

/// The result of running one hook.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// Continue the pipeline. On the fallback path this re-raises the error
    /// already recorded on the context.
    Proceed,
    /// Signal an error. On the before/after paths this diverts to the
    /// fallback hook; on the fallback path it replaces the final error.
    Fail(ApiError),
}

impl HookOutcome {
    /// Returns true for [`HookOutcome::Proceed`].
    #[must_use]
    pub const fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    /// Converts into the signalled error, if any.
    #[must_use]
    pub fn into_error(self) -> Option<ApiError> {
        match self {
            Self::Proceed => None,
            Self::Fail(err) => Some(err),
        }
    }
}

impl From<Result<(), ApiError>> for HookOutcome {
    fn from(result: Result<(), ApiError>) -> Self {
        match result {
            Ok(()) => Self::Proceed,
            Err(err) => Self::Fail(err),
        }
    }
}

/// A middleware hook.
///
/// Hooks mutate the call through the context cell's explicit setters
/// (`set_data`, `set_response`, `set_error`) and control continuation via
/// their returned [`HookOutcome`].
pub trait Hook: Send + Sync + 'static {
    /// Runs the hook against one call's context.
    fn run(&self, ctx: ContextCell) -> BoxFuture<'static, HookOutcome>;
}

/// A type-erased, shareable hook.
pub type BoxedHook = Arc<dyn Hook>;

/// A hook built from an async closure.
///
/// # Example
///
/// ```
/// use apimap_core::ContextCell;
/// use apimap_middleware::{FnHook, HookOutcome};
///
/// let hook = FnHook::new(|ctx: ContextCell| async move {
///     tracing::debug!(url = %ctx.lock().resolved_url(), "about to dispatch");
///     HookOutcome::Proceed
/// });
/// ```
pub struct FnHook<F> {
    func: F,
}

impl<F> FnHook<F> {
    /// Wraps an async closure as a hook.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Hook for FnHook<F>
where
    F: Fn(ContextCell) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HookOutcome> + Send + 'static,
{
    fn run(&self, ctx: ContextCell) -> BoxFuture<'static, HookOutcome> {
        Box::pin((self.func)(ctx))
    }
}

/// Wraps an async closure into a [`BoxedHook`].
pub fn hook_fn<F, Fut>(func: F) -> BoxedHook
where
    F: Fn(ContextCell) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HookOutcome> + Send + 'static,
{
    Arc::new(FnHook::new(func))
}

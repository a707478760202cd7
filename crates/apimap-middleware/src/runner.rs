//! Hook resolution and execution.
//!
//! The runner resolves the effective hook for a kind by priority (instance
//! hook, then shared-registry hook, then the built-in default) and runs it.
//! Built-in defaults:
//!
//! - **before/after**: proceed immediately, unless the context already
//!   carries an error, in which case they fail with it (passthrough).
//! - **fallback**: emit one diagnostic line when console reporting is
//!   enabled, then proceed (which re-raises the error recorded on the
//!   context).

use crate::hook::{BoxedHook, Hook, HookKind, HookOutcome};
use crate::registry::HookRegistry;
use apimap_core::ContextCell;
use std::fmt;
use std::sync::Arc;

/// Resolves and executes hooks for one module instance.
pub struct HookRunner {
    instance: HookRegistry,
    shared: Option<Arc<HookRegistry>>,
    console: bool,
}

impl HookRunner {
    /// Creates a runner with an optional shared registry.
    ///
    /// `console` gates the built-in fallback diagnostic line.
    #[must_use]
    pub fn new(shared: Option<Arc<HookRegistry>>, console: bool) -> Self {
        Self {
            instance: HookRegistry::new(),
            shared,
            console,
        }
    }

    /// Registers an instance hook for `kind`, replacing any previous one.
    pub fn set_instance(&self, kind: HookKind, hook: BoxedHook) {
        self.instance.set(kind, hook);
    }

    /// Registers a typed instance hook for `kind`.
    pub fn set_instance_hook<H: Hook>(&self, kind: HookKind, hook: H) {
        self.instance.set(kind, Arc::new(hook));
    }

    /// Returns whether console diagnostics are enabled.
    #[must_use]
    pub const fn console(&self) -> bool {
        self.console
    }

    fn resolve(&self, kind: HookKind) -> Option<BoxedHook> {
        self.instance
            .get(kind)
            .or_else(|| self.shared.as_ref().and_then(|shared| shared.get(kind)))
    }

    /// Runs the effective hook of `kind` against `ctx`.
    ///
    /// The returned outcome is whatever the hook decides; for an unresolved
    /// hook the kind's built-in default applies.
    pub async fn run(&self, kind: HookKind, ctx: &ContextCell) -> HookOutcome {
        match self.resolve(kind) {
            Some(hook) => hook.run(Arc::clone(ctx)).await,
            None => self.default_outcome(kind, ctx),
        }
    }

    fn default_outcome(&self, kind: HookKind, ctx: &ContextCell) -> HookOutcome {
        match kind {
            HookKind::Before | HookKind::After => ctx
                .lock()
                .response_error()
                .cloned()
                .map_or(HookOutcome::Proceed, HookOutcome::Fail),
            HookKind::Fallback => {
                if self.console {
                    let ctx = ctx.lock();
                    let message = ctx
                        .response_error()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    tracing::error!(
                        label = ctx.metadata().label(),
                        "[{}] [{}] failed with {}",
                        ctx.method().to_uppercase(),
                        ctx.resolved_url(),
                        message,
                    );
                }
                HookOutcome::Proceed
            }
        }
    }
}

impl fmt::Debug for HookRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRunner")
            .field("instance", &self.instance)
            .field("shared", &self.shared.is_some())
            .field("console", &self.console)
            .finish()
    }
}

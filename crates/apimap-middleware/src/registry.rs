//! Shared hook registry.
//!
//! The registry replaces the ambient process-wide hook state of older
//! designs with an explicit collaborator: construct one `Arc<HookRegistry>`
//! at startup, register defaults on it, and hand it to every module that
//! should fall back to those defaults when it has no instance hook of its
//! own. Intended lifecycle: set once at startup, read per call. Last
//! registration wins per kind.

use crate::hook::{BoxedHook, Hook, HookKind};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Shared default hooks, consulted when no instance hook is registered.
///
/// # Example
///
/// ```
/// use apimap_middleware::{hook_fn, HookKind, HookOutcome, HookRegistry};
/// use std::sync::Arc;
///
/// let shared = Arc::new(HookRegistry::new());
/// shared.set(HookKind::Before, hook_fn(|_ctx| async { HookOutcome::Proceed }));
/// assert!(shared.get(HookKind::Before).is_some());
/// ```
#[derive(Default)]
pub struct HookRegistry {
    before: RwLock<Option<BoxedHook>>,
    after: RwLock<Option<BoxedHook>>,
    fallback: RwLock<Option<BoxedHook>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: HookKind) -> &RwLock<Option<BoxedHook>> {
        match kind {
            HookKind::Before => &self.before,
            HookKind::After => &self.after,
            HookKind::Fallback => &self.fallback,
        }
    }

    /// Registers the default hook for `kind`, replacing any previous one.
    pub fn set(&self, kind: HookKind, hook: BoxedHook) {
        *self.slot(kind).write() = Some(hook);
    }

    /// Registers a default before-hook.
    pub fn set_before<H: Hook>(&self, hook: H) {
        self.set(HookKind::Before, Arc::new(hook));
    }

    /// Registers a default after-hook.
    pub fn set_after<H: Hook>(&self, hook: H) {
        self.set(HookKind::After, Arc::new(hook));
    }

    /// Registers a default fallback-hook.
    pub fn set_fallback<H: Hook>(&self, hook: H) {
        self.set(HookKind::Fallback, Arc::new(hook));
    }

    /// Returns the registered hook for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: HookKind) -> Option<BoxedHook> {
        self.slot(kind).read().clone()
    }

    /// Removes the registered hook for `kind`.
    pub fn clear(&self, kind: HookKind) {
        *self.slot(kind).write() = None;
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("before", &self.before.read().is_some())
            .field("after", &self.after.read().is_some())
            .field("fallback", &self.fallback.read().is_some())
            .finish()
    }
}

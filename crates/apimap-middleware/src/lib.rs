//! Hook pipeline for apimap.
//!
//! Every generated call runs up to three hooks around its dispatch:
//!
//! ```text
//! call → [before] → dispatch → [after]     → settle Ok
//!                 ↘ error    → [fallback]  → settle Err
//! ```
//!
//! This crate defines the hook model ([`Hook`], [`FnHook`], [`HookOutcome`]),
//! the shared [`HookRegistry`] consulted when no instance hook is registered,
//! and the [`HookRunner`] that resolves and executes the effective hook for a
//! kind.

pub mod hook;
pub mod registry;
pub mod runner;

pub use hook::{hook_fn, BoxedHook, FnHook, Hook, HookKind, HookOutcome};
pub use registry::HookRegistry;
pub use runner::HookRunner;

//! The module facade.
//!
//! [`ApiModule`] is the composition root: it owns the shared transport
//! instance, the hook runner and the generated endpoint set, and exposes the
//! registration entry points for instance-level hooks. Shared (cross-module)
//! default hooks arrive through an explicit [`HookRegistry`] in the
//! configuration rather than ambient process state.

use crate::registry::{self, ApiSet, RejectedMetadata};
use apimap_core::{ApiResult, CancelSource, MetadataMap, Transport};
use apimap_middleware::{Hook, HookKind, HookRegistry, HookRunner};
use apimap_transport::{BaseConfig, HttpTransport};
use std::fmt;
use std::sync::Arc;

/// Configuration for building an [`ApiModule`].
pub struct ModuleConfig {
    base: BaseConfig,
    metadatas: MetadataMap,
    console: bool,
    shared_hooks: Option<Arc<HookRegistry>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ModuleConfig {
    /// Creates a configuration around a metadata mapping.
    ///
    /// Console diagnostics default to enabled, matching the default fallback
    /// behavior callers expect out of the box.
    #[must_use]
    pub fn new(metadatas: impl Into<MetadataMap>) -> Self {
        Self {
            base: BaseConfig::default(),
            metadatas: metadatas.into(),
            console: true,
            shared_hooks: None,
            transport: None,
        }
    }

    /// Sets the transport base configuration (base URL, default headers,
    /// default timeout). Opaque to the pipeline, passed through verbatim.
    #[must_use]
    pub fn base(mut self, base: BaseConfig) -> Self {
        self.base = base;
        self
    }

    /// Enables or disables the built-in fallback diagnostic line.
    #[must_use]
    pub fn console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Attaches a shared hook registry consulted when no instance hook is
    /// registered for a kind.
    #[must_use]
    pub fn shared_hooks(mut self, shared: Arc<HookRegistry>) -> Self {
        self.shared_hooks = Some(shared);
        self
    }

    /// Replaces the default reqwest transport with a custom implementation.
    ///
    /// This is also the seam test suites use to inject scripted transports.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl fmt::Debug for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConfig")
            .field("base", &self.base)
            .field("entries", &self.metadatas.len())
            .field("console", &self.console)
            .field("shared_hooks", &self.shared_hooks.is_some())
            .field("transport_override", &self.transport.is_some())
            .finish()
    }
}

/// State shared by a module and every endpoint generated from it.
pub struct ModuleShared {
    transport: Arc<dyn Transport>,
    runner: HookRunner,
}

impl ModuleShared {
    /// Returns the shared transport instance.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub(crate) fn runner(&self) -> &HookRunner {
        &self.runner
    }
}

impl fmt::Debug for ModuleShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleShared")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

/// The outcome of building a module.
///
/// Metadata entries that failed validation are reported here, synchronously;
/// sibling entries register normally and stay callable.
#[derive(Debug)]
pub struct ModuleBuild {
    /// The built module.
    pub module: ApiModule,
    /// Entries rejected at registration, with their keys.
    pub rejected: Vec<RejectedMetadata>,
}

/// The module facade: shared transport + hook pipeline + endpoint set.
#[derive(Debug)]
pub struct ApiModule {
    shared: Arc<ModuleShared>,
    api: ApiSet,
}

impl ApiModule {
    /// Builds a module from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the default transport cannot be constructed
    /// from the base configuration. Per-entry metadata problems never fail
    /// the build; they are reported in [`ModuleBuild::rejected`].
    pub fn build(config: ModuleConfig) -> ApiResult<ModuleBuild> {
        let transport = match config.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(config.base)?),
        };

        let shared = Arc::new(ModuleShared {
            transport,
            runner: HookRunner::new(config.shared_hooks, config.console),
        });

        let (endpoints, rejected) = registry::build(&config.metadatas, &shared);
        for entry in &rejected {
            tracing::warn!(key = %entry.key, error = %entry.error, "metadata entry rejected");
        }

        Ok(ModuleBuild {
            module: Self {
                api: ApiSet::new(endpoints, Arc::clone(&shared)),
                shared,
            },
            rejected,
        })
    }

    /// Returns the generated endpoint set.
    #[must_use]
    pub fn api(&self) -> &ApiSet {
        &self.api
    }

    /// Returns the shared transport instance.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        self.shared.transport()
    }

    /// Registers the instance before-hook. Last registration wins.
    pub fn use_before<H: Hook>(&self, hook: H) {
        self.shared.runner.set_instance_hook(HookKind::Before, hook);
    }

    /// Registers the instance after-hook. Last registration wins.
    pub fn use_after<H: Hook>(&self, hook: H) {
        self.shared.runner.set_instance_hook(HookKind::After, hook);
    }

    /// Registers the instance fallback-hook. Last registration wins.
    pub fn use_fallback<H: Hook>(&self, hook: H) {
        self.shared
            .runner
            .set_instance_hook(HookKind::Fallback, hook);
    }

    /// Generates a cancellation handle.
    ///
    /// Attach the handle's token to a call via
    /// [`RequestOptions::cancel`](apimap_core::RequestOptions::cancel);
    /// triggering the handle settles that call's in-flight dispatch with an
    /// error whose message equals the supplied reason.
    #[must_use]
    pub fn cancellation_source(&self) -> CancelSource {
        CancelSource::new()
    }
}

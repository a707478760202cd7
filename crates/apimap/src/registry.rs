//! Metadata registry and endpoint set.
//!
//! Turns a [`MetadataMap`] into callable [`Endpoint`]s. Validation is per
//! entry: a metadata record missing its `method` or `url` is rejected with a
//! configuration error naming the key, while sibling entries register and
//! remain callable. Namespaced mappings register under dotted keys
//! (`namespace.name`).

use crate::endpoint::Endpoint;
use crate::module::ModuleShared;
use apimap_core::{ApiError, MetadataMap};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A metadata entry that failed registration.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedMetadata {
    /// The offending entry's key (dotted for namespaced mappings).
    pub key: String,
    /// Why the entry was rejected.
    pub error: ApiError,
}

/// Builds the endpoint mapping, collecting per-entry rejections.
pub(crate) fn build(
    metadatas: &MetadataMap,
    shared: &Arc<ModuleShared>,
) -> (BTreeMap<String, Arc<Endpoint>>, Vec<RejectedMetadata>) {
    let mut endpoints = BTreeMap::new();
    let mut rejected = Vec::new();

    for (key, metadata) in metadatas.entries() {
        match metadata.validate(&key) {
            Ok(()) => {
                let endpoint = Endpoint::new(Arc::new(metadata.clone()), Arc::clone(shared));
                endpoints.insert(key, Arc::new(endpoint));
            }
            Err(error) => rejected.push(RejectedMetadata { key, error }),
        }
    }

    (endpoints, rejected)
}

/// The generated mapping of names to callable endpoints.
///
/// Holds a back-reference to the owning module's shared state, exposed for
/// introspection only; dispatch never goes through it.
#[derive(Debug)]
pub struct ApiSet {
    endpoints: BTreeMap<String, Arc<Endpoint>>,
    module: Arc<ModuleShared>,
}

impl ApiSet {
    pub(crate) fn new(
        endpoints: BTreeMap<String, Arc<Endpoint>>,
        module: Arc<ModuleShared>,
    ) -> Self {
        Self { endpoints, module }
    }

    /// Looks up an endpoint by key (dotted for namespaced registrations).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<Endpoint>> {
        self.endpoints.get(key)
    }

    /// Looks up a namespaced endpoint.
    #[must_use]
    pub fn get_in(&self, namespace: &str, name: &str) -> Option<&Arc<Endpoint>> {
        self.endpoints.get(&format!("{namespace}.{name}"))
    }

    /// Returns every registered endpoint key.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Returns the number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true when nothing registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// The owning module's shared state. Introspection only.
    #[must_use]
    pub fn module(&self) -> &Arc<ModuleShared> {
        &self.module
    }
}

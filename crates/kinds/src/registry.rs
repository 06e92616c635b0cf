//! Kind registry
//!
//! Holds the typed kind adapters known at compile time and contributes them
//! to the descriptors discovered for a group-version.

use crate::adapter::KindAdapter;
use crate::builtin;
use crate::descriptor::ResourceDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registered kind adapters.
#[derive(Debug, Default, Clone)]
pub struct KindRegistry {
    adapters: Vec<Arc<dyn KindAdapter>>,
}

impl KindRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in kinds
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Adds an adapter
    pub fn register<A: KindAdapter + 'static>(&mut self, adapter: A) {
        self.adapters.push(Arc::new(adapter));
    }

    /// Finds an adapter by canonical name or short alias
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn KindAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.name() == name || a.short_name() == Some(name))
    }

    /// All registered adapters, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn KindAdapter>> {
        self.adapters.iter()
    }

    /// One descriptor per registered adapter
    pub fn descriptors(&self) -> Vec<ResourceDescriptor> {
        self.iter()
            .map(|a| ResourceDescriptor::from_adapter(Arc::clone(a)))
            .collect()
    }

    /// Contributes registered kinds of `group_version` to a name/alias map.
    ///
    /// Discovered descriptors of the same kind get the adapter attached.
    /// Registered kinds the server did not report are added under their name
    /// and alias, never replacing an existing key.
    pub fn contribute(
        &self,
        group_version: &str,
        descriptors: &mut HashMap<String, ResourceDescriptor>,
    ) {
        for registered in self
            .descriptors()
            .into_iter()
            .filter(|d| d.resource.api_version == group_version)
        {
            let mut attached = false;
            for descriptor in descriptors.values_mut() {
                if descriptor.is_kind(&registered.resource) {
                    descriptor.adopt_adapter(&registered);
                    attached = true;
                }
            }
            if attached {
                continue;
            }

            debug!(kind = %registered.resource.kind, group_version, "adding registered kind not reported by discovery");
            for key in registered.keys() {
                descriptors
                    .entry(key.to_string())
                    .or_insert_with(|| registered.clone());
            }
        }
    }
}

//! Resource descriptors
//!
//! A descriptor identifies one watchable kind and builds the list/watch
//! handle for its instances. Descriptors are created once at start-up and
//! never mutated afterwards.

use crate::adapter::KindAdapter;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client};
use std::sync::Arc;

/// One watchable kind.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// Canonical singular name (e.g. `deployment`)
    pub name: String,

    /// Short aliases (e.g. `deploy`)
    pub short_names: Vec<String>,

    /// Group/version/kind/plural used to build API handles
    pub resource: ApiResource,

    /// Whether instances live in a namespace
    pub namespaced: bool,

    adapter: Option<Arc<dyn KindAdapter>>,
}

impl ResourceDescriptor {
    /// Builds a descriptor from one entry of a discovery resource list.
    ///
    /// Returns `None` for subresources (`pods/log`, `deployments/scale`),
    /// which cannot be listed or watched on their own.
    pub fn from_discovery(group_version: &str, resource: &APIResource) -> Option<Self> {
        if resource.name.contains('/') {
            return None;
        }

        let (group, version) = split_group_version(group_version);
        let group = resource.group.as_deref().unwrap_or(group);
        let version = resource.version.as_deref().unwrap_or(version);
        let gvk = GroupVersionKind::gvk(group, version, &resource.kind);

        let name = if resource.singular_name.is_empty() {
            resource.kind.to_lowercase()
        } else {
            resource.singular_name.clone()
        };

        Some(Self {
            name,
            short_names: resource.short_names.clone().unwrap_or_default(),
            resource: ApiResource::from_gvk_with_plural(&gvk, &resource.name),
            namespaced: resource.namespaced,
            adapter: None,
        })
    }

    /// Builds a descriptor straight from a registered adapter.
    pub fn from_adapter(adapter: Arc<dyn KindAdapter>) -> Self {
        Self {
            name: adapter.name().to_string(),
            short_names: adapter.short_name().map(str::to_string).into_iter().collect(),
            resource: adapter.api_resource(),
            namespaced: adapter.namespaced(),
            adapter: Some(adapter),
        }
    }

    /// Takes over the typed adapter of a registered descriptor.
    pub fn adopt_adapter(&mut self, registered: &ResourceDescriptor) {
        self.adapter.clone_from(&registered.adapter);
    }

    /// Typed adapter, if the kind is registered
    pub fn adapter(&self) -> Option<&dyn KindAdapter> {
        self.adapter.as_deref()
    }

    /// True when `name` is the canonical name or one of the aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.short_names.iter().any(|s| s == name)
    }

    /// Canonical name followed by all aliases
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.short_names.iter().map(String::as_str))
    }

    /// True when `other` names the same group, version and kind.
    pub fn is_kind(&self, other: &ApiResource) -> bool {
        self.resource.group == other.group
            && self.resource.version == other.version
            && self.resource.kind == other.kind
    }

    /// Empty instance of this kind
    pub fn prototype(&self) -> DynamicObject {
        DynamicObject::new("", &self.resource)
    }

    /// List/watch handle, restricted to `namespace` when the kind is
    /// namespaced and a namespace is given.
    pub fn api(&self, client: Client, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) if self.namespaced && !ns.is_empty() => {
                Api::namespaced_with(client, ns, &self.resource)
            }
            _ => Api::all_with(client, &self.resource),
        }
    }
}

/// Splits `apps/v1` into `("apps", "v1")` and `v1` into `("", "v1")`.
pub fn split_group_version(group_version: &str) -> (&str, &str) {
    match group_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", group_version),
    }
}

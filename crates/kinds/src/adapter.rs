//! Typed kind adapters
//!
//! An adapter ties a kind name (and optional short alias) to the typed
//! k8s-openapi struct for that kind. It replaces loading kinds from native
//! plugins at start-up: every supported kind is registered at compile time.

use crate::error::KindError;
use kube::Resource;
use kube::core::{ApiResource, DynamicObject};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Capability of a registered kind.
pub trait KindAdapter: Send + Sync + fmt::Debug {
    /// Canonical (singular, lower-case) kind name, e.g. `deployment`
    fn name(&self) -> &str;

    /// Short alias, e.g. `dp`
    fn short_name(&self) -> Option<&str>;

    /// Group/version/kind/plural of the kind
    fn api_resource(&self) -> ApiResource;

    /// Whether instances live in a namespace
    fn namespaced(&self) -> bool;

    /// Converts an untyped instance into the structured value of its typed
    /// form: fields in declaration order, unknown fields dropped.
    fn normalize(&self, obj: &DynamicObject) -> Result<Value, KindError>;
}

/// Adapter backed by a k8s-openapi resource type.
pub struct TypedKind<K> {
    name: &'static str,
    short_name: Option<&'static str>,
    namespaced: bool,
    _kind: PhantomData<fn() -> K>,
}

impl<K> TypedKind<K> {
    /// Adapter for a namespaced kind
    pub const fn namespaced(name: &'static str, short_name: Option<&'static str>) -> Self {
        Self {
            name,
            short_name,
            namespaced: true,
            _kind: PhantomData,
        }
    }

    /// Adapter for a cluster-scoped kind
    pub const fn cluster(name: &'static str, short_name: Option<&'static str>) -> Self {
        Self {
            name,
            short_name,
            namespaced: false,
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for TypedKind<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedKind")
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("namespaced", &self.namespaced)
            .field("type", &std::any::type_name::<K>())
            .finish()
    }
}

impl<K> KindAdapter for TypedKind<K>
where
    K: Resource<DynamicType = ()> + Serialize + DeserializeOwned + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn short_name(&self) -> Option<&str> {
        self.short_name
    }

    fn api_resource(&self) -> ApiResource {
        ApiResource::erase::<K>(&())
    }

    fn namespaced(&self) -> bool {
        self.namespaced
    }

    fn normalize(&self, obj: &DynamicObject) -> Result<Value, KindError> {
        let resource = self.api_resource();
        if let Some(types) = &obj.types {
            if !types.kind.is_empty() && types.kind != resource.kind {
                return Err(KindError::Mismatch {
                    expected: resource.kind,
                    actual: types.kind.clone(),
                });
            }
        }

        // List items usually arrive without apiVersion/kind, which the typed
        // deserializers require.
        let mut value = serde_json::to_value(obj)?;
        if let Value::Object(map) = &mut value {
            map.insert("apiVersion".to_string(), Value::String(resource.api_version));
            map.insert("kind".to_string(), Value::String(resource.kind));
        }

        let typed: K = serde_json::from_value(value)?;
        Ok(serde_json::to_value(&typed)?)
    }
}

//! Mock ClusterClient for unit testing
//!
//! This module provides a mock implementation of ClusterClientTrait that can
//! be used in unit tests without a running cluster. Discovery data and
//! instances are stored in memory and added with the `add_*` helpers.

use crate::cluster_trait::ClusterClientTrait;
use crate::discovery::{is_core_group_version, with_core_group};
use crate::error::ClusterError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    APIGroup, APIResource, APIResourceList, GroupVersionForDiscovery,
};
use kube::core::{ApiResource, DynamicObject};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock ClusterClient for testing
#[derive(Clone, Default)]
pub struct MockClusterClient {
    pub(crate) groups: Arc<Mutex<Vec<APIGroup>>>,
    pub(crate) resources: Arc<Mutex<HashMap<String, Vec<APIResource>>>>,
    pub(crate) namespaces: Arc<Mutex<Vec<String>>>,
    // Keyed by "{apiVersion}/{plural}"
    pub(crate) instances: Arc<Mutex<HashMap<String, Vec<DynamicObject>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn instance_key(resource: &ApiResource) -> String {
    format!("{}/{}", resource.api_version, resource.plural)
}

impl MockClusterClient {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource kind under `group_version`, adding the API group
    /// when it is not known yet.
    pub fn add_resource(&self, group_version: &str, resource: APIResource) {
        if !is_core_group_version(group_version) {
            let (group, version) = group_version.split_once('/').unwrap_or(("", group_version));
            let mut groups = lock(&self.groups);
            let entry = GroupVersionForDiscovery {
                group_version: group_version.to_string(),
                version: version.to_string(),
            };
            match groups.iter_mut().find(|g| g.name == group) {
                Some(g) if !g.versions.contains(&entry) => g.versions.push(entry),
                Some(_) => {}
                None => groups.push(APIGroup {
                    name: group.to_string(),
                    versions: vec![entry.clone()],
                    preferred_version: Some(entry),
                    ..Default::default()
                }),
            }
        }
        lock(&self.resources)
            .entry(group_version.to_string())
            .or_default()
            .push(resource);
    }

    /// Convenience wrapper around `add_resource` for the common fields
    pub fn add_kind(
        &self,
        group_version: &str,
        plural: &str,
        singular: &str,
        kind: &str,
        short_names: &[&str],
        namespaced: bool,
    ) {
        self.add_resource(
            group_version,
            APIResource {
                name: plural.to_string(),
                singular_name: singular.to_string(),
                kind: kind.to_string(),
                namespaced,
                short_names: (!short_names.is_empty())
                    .then(|| short_names.iter().map(|s| s.to_string()).collect()),
                verbs: ["get", "list", "watch"].iter().map(|v| v.to_string()).collect(),
                ..Default::default()
            },
        );
    }

    /// Adds a namespace name
    pub fn add_namespace(&self, name: &str) {
        lock(&self.namespaces).push(name.to_string());
    }

    /// Adds an instance of `resource`
    pub fn add_instance(&self, resource: &ApiResource, obj: DynamicObject) {
        lock(&self.instances)
            .entry(instance_key(resource))
            .or_default()
            .push(obj);
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for MockClusterClient {
    async fn list_api_groups(&self) -> Result<Vec<APIGroup>, ClusterError> {
        Ok(with_core_group(lock(&self.groups).clone()))
    }

    async fn list_api_resources(&self, group_version: &str) -> Result<APIResourceList, ClusterError> {
        let resources = lock(&self.resources);
        let list = resources
            .get(group_version)
            .ok_or_else(|| ClusterError::NotFound(format!("group version {group_version}")))?;
        Ok(APIResourceList {
            group_version: group_version.to_string(),
            resources: list.clone(),
        })
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
        Ok(lock(&self.namespaces).clone())
    }

    async fn list_instances(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, ClusterError> {
        let instances = lock(&self.instances);
        let items = instances.get(&instance_key(resource)).cloned().unwrap_or_default();
        Ok(match namespace {
            Some(ns) if !ns.is_empty() => items
                .into_iter()
                .filter(|o| o.metadata.namespace.as_deref() == Some(ns))
                .collect(),
            _ => items,
        })
    }

    async fn get_instance(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ClusterError> {
        self.list_instances(resource, namespace)
            .await?
            .into_iter()
            .find(|o| o.metadata.name.as_deref() == Some(name))
            .ok_or_else(|| ClusterError::NotFound(format!("{}/{}", resource.kind, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::GroupVersionKind;

    #[tokio::test]
    async fn test_mock_discovery() {
        let mock = MockClusterClient::new();
        mock.add_kind("apps/v1", "deployments", "deployment", "Deployment", &["deploy"], true);
        mock.add_kind("v1", "configmaps", "configmap", "ConfigMap", &["cm"], true);

        let groups = mock.list_api_groups().await.expect("groups");
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["apps", "v1"]);

        let apps = mock.list_api_resources("apps/v1").await.expect("apps/v1");
        assert_eq!(apps.resources.len(), 1);
        assert_eq!(apps.resources[0].short_names, Some(vec!["deploy".to_string()]));

        assert!(matches!(
            mock.list_api_resources("batch/v1").await,
            Err(ClusterError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_instances_by_namespace() {
        let mock = MockClusterClient::new();
        let gvk = GroupVersionKind::gvk("", "v1", "ConfigMap");
        let resource = ApiResource::from_gvk_with_plural(&gvk, "configmaps");

        let mut a = DynamicObject::new("a", &resource);
        a.metadata.namespace = Some("default".to_string());
        let mut b = DynamicObject::new("b", &resource);
        b.metadata.namespace = Some("kube-system".to_string());
        mock.add_instance(&resource, a);
        mock.add_instance(&resource, b);

        let all = mock.list_instances(&resource, None).await.expect("list");
        assert_eq!(all.len(), 2);

        let default = mock.list_instances(&resource, Some("default")).await.expect("list");
        assert_eq!(default.len(), 1);
        assert_eq!(default[0].metadata.name.as_deref(), Some("a"));

        let b = mock.get_instance(&resource, None, "b").await.expect("get");
        assert_eq!(b.metadata.namespace.as_deref(), Some("kube-system"));
        assert!(mock.get_instance(&resource, Some("default"), "b").await.is_err());
    }
}

//! Kubernetes API client
//!
//! Implements `ClusterClientTrait` on top of `kube::Client`. Discovery goes
//! to `/api` for the core group and `/apis/{group-version}` otherwise.

use crate::cluster_trait::ClusterClientTrait;
use crate::discovery::{is_core_group_version, with_core_group};
use crate::error::ClusterError;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIGroup, APIResourceList};
use kube::api::ListParams;
use kube::config::KubeConfigOptions;
use kube::core::{ApiResource, DynamicObject};
use kube::{Api, Client, Config, ResourceExt};
use tracing::debug;

/// Kubernetes API client
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
}

impl std::fmt::Debug for ClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterClient")
            .field("default_namespace", &self.client.default_namespace())
            .finish()
    }
}

impl ClusterClient {
    /// Wraps an existing `kube::Client`
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client from the environment: `KUBECONFIG`, `~/.kube/config`, or the
    /// in-cluster service account
    pub async fn try_default() -> Result<Self, ClusterError> {
        Ok(Self::new(Client::try_default().await?))
    }

    /// Client for a named kubeconfig context
    pub async fn for_context(context: &str) -> Result<Self, ClusterError> {
        let options = KubeConfigOptions {
            context: Some(context.to_string()),
            ..Default::default()
        };
        let config = Config::from_kubeconfig(&options).await?;
        Ok(Self::new(Client::try_from(config)?))
    }

    /// Client for `context` when given, the default client otherwise
    pub async fn connect(context: Option<&str>) -> Result<Self, ClusterError> {
        match context {
            Some(context) if !context.is_empty() => Self::for_context(context).await,
            _ => Self::try_default().await,
        }
    }

    /// The underlying `kube::Client`, for building watch handles
    pub fn kube_client(&self) -> Client {
        self.client.clone()
    }

    fn instances_api(&self, resource: &ApiResource, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) if !ns.is_empty() => Api::namespaced_with(self.client.clone(), ns, resource),
            _ => Api::all_with(self.client.clone(), resource),
        }
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for ClusterClient {
    async fn list_api_groups(&self) -> Result<Vec<APIGroup>, ClusterError> {
        debug!("Listing API groups");
        let groups = self.client.list_api_groups().await?;
        Ok(with_core_group(groups.groups))
    }

    async fn list_api_resources(&self, group_version: &str) -> Result<APIResourceList, ClusterError> {
        if group_version.is_empty() {
            return Err(ClusterError::InvalidGroupVersion(
                "group version must not be empty".to_string(),
            ));
        }
        debug!(group_version, "Listing API resources");
        let list = if is_core_group_version(group_version) {
            self.client.list_core_api_resources(group_version).await?
        } else {
            self.client.list_api_group_resources(group_version).await?
        };
        Ok(list)
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_instances(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, ClusterError> {
        debug!(kind = %resource.kind, namespace = namespace.unwrap_or(""), "Listing instances");
        let list = self
            .instances_api(resource, namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items)
    }

    async fn get_instance(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ClusterError> {
        self.instances_api(resource, namespace)
            .get_opt(name)
            .await?
            .ok_or_else(|| ClusterError::NotFound(format!("{}/{}", resource.kind, name)))
    }
}

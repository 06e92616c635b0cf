//! ClusterClient trait for mocking
//!
//! This trait abstracts the ClusterClient to enable mocking in unit tests.
//! The concrete ClusterClient implements this trait, and tests use
//! `MockClusterClient` (feature `test-util`).

use crate::error::ClusterError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIGroup, APIResourceList};
use kube::core::{ApiResource, DynamicObject};

/// Trait for the cluster operations kubewatch performs outside the watch path
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterClientTrait: Send + Sync {
    /// API groups served by the cluster, core group (`v1`) included
    async fn list_api_groups(&self) -> Result<Vec<APIGroup>, ClusterError>;

    /// Resource kinds of one group-version (`v1`, `apps/v1`, ...)
    async fn list_api_resources(&self, group_version: &str) -> Result<APIResourceList, ClusterError>;

    /// Names of all namespaces
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError>;

    /// Instances of a kind, in one namespace or in all of them
    async fn list_instances(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, ClusterError>;

    /// One instance of a kind
    async fn get_instance(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ClusterError>;
}

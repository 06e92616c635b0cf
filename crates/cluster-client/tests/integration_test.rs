//! Integration tests for the cluster client
//!
//! These tests require a reachable cluster (KUBECONFIG or in-cluster
//! credentials). Run with `--ignored`.

use cluster_client::{ClusterClient, ClusterClientTrait};

#[tokio::test]
#[ignore] // Requires running cluster
async fn test_list_api_groups_includes_core() {
    let client = ClusterClient::try_default().await.expect("Failed to create client");

    let groups = client.list_api_groups().await.expect("Failed to list API groups");

    assert!(groups.iter().any(|g| g.name == "v1"), "core group missing");
}

#[tokio::test]
#[ignore]
async fn test_list_core_resources() {
    let client = ClusterClient::try_default().await.expect("Failed to create client");

    let resources = client.list_api_resources("v1").await.expect("Failed to list v1 resources");

    assert!(resources.resources.iter().any(|r| r.name == "configmaps"));
}

#[tokio::test]
#[ignore]
async fn test_list_namespaces() {
    let client = ClusterClient::try_default().await.expect("Failed to create client");

    let namespaces = client.list_namespaces().await.expect("Failed to list namespaces");

    println!("Found {} namespaces", namespaces.len());
    assert!(namespaces.iter().any(|ns| ns == "default"));
}

//! Unit tests for the resource catalog

use crate::access::{FieldAccess, Node};
use crate::catalog::{ResourceCatalog, discover, next_path_segments, select};
use crate::config::WatchConfig;
use crate::error::WatchError;
use cluster_client::MockClusterClient;
use kinds::KindRegistry;
use kube::core::DynamicObject;
use serde_json::json;

fn apps_cluster() -> MockClusterClient {
    let mock = MockClusterClient::new();
    mock.add_kind("apps/v1", "deployments", "deployment", "Deployment", &["deploy"], true);
    mock.add_kind("apps/v1", "statefulsets", "statefulset", "StatefulSet", &["sts"], true);
    mock.add_kind("apps/v1", "deployments/scale", "", "Scale", &[], true);
    mock.add_kind("v1", "configmaps", "configmap", "ConfigMap", &["cm"], true);
    mock.add_kind("v1", "namespaces", "namespace", "Namespace", &["ns"], false);
    mock
}

fn instance(api_version: &str, kind: &str, namespace: &str, name: &str, extra: serde_json::Value) -> DynamicObject {
    let mut value = json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "name": name, "namespace": namespace },
    });
    if let (Some(obj), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        obj.extend(extra.clone());
    }
    serde_json::from_value(value).expect("valid object")
}

async fn catalog(mock: &MockClusterClient, group_version: &str, kinds: &str) -> ResourceCatalog {
    let config = WatchConfig {
        group_version: group_version.to_string(),
        kinds: kinds.to_string(),
        ..Default::default()
    };
    ResourceCatalog::load(mock, &KindRegistry::builtin(), &config)
        .await
        .expect("catalog")
}

#[tokio::test]
async fn test_discover_keys_by_name_and_alias() {
    let mock = apps_cluster();
    let map = discover(&mock, &KindRegistry::new(), "apps/v1").await.expect("discover");

    let mut keys: Vec<_> = map.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["deploy", "deployment", "statefulset", "sts"]);
    assert_eq!(map["deploy"].name, "deployment");
}

#[tokio::test]
async fn test_discover_attaches_registered_adapters() {
    let mock = apps_cluster();
    let map = discover(&mock, &KindRegistry::builtin(), "apps/v1").await.expect("discover");

    assert!(map["deployment"].adapter().is_some());
    assert!(map["statefulset"].adapter().is_none());
}

#[tokio::test]
async fn test_discover_unknown_group_version_fails() {
    let mock = apps_cluster();
    let result = discover(&mock, &KindRegistry::builtin(), "batch/v1").await;
    assert!(matches!(result, Err(WatchError::Cluster(_))));
}

#[tokio::test]
async fn test_select_drops_unmatched_requested_names() {
    let mock = MockClusterClient::new();
    mock.add_kind("v1", "configmaps", "configmap", "ConfigMap", &["cm"], true);
    mock.add_kind("v1", "deploys", "deploy", "Deploy", &[], true);
    let discovered = discover(&mock, &KindRegistry::new(), "v1").await.expect("discover");

    let selected = select("deploy,nonexistent", "", &discovered);
    assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["deploy"]);
}

#[tokio::test]
async fn test_select_falls_back_to_everything() {
    let mock = apps_cluster();
    let discovered = discover(&mock, &KindRegistry::new(), "apps/v1").await.expect("discover");

    for requested in ["", "nonexistent", ",,"] {
        let selected = select(requested, "", &discovered);
        assert_eq!(
            selected.keys().collect::<Vec<_>>(),
            vec!["deployment", "statefulset"]
        );
    }
}

#[tokio::test]
async fn test_select_applies_exclusions_last() {
    let mock = apps_cluster();
    let discovered = discover(&mock, &KindRegistry::new(), "apps/v1").await.expect("discover");

    let selected = select("", "sts", &discovered);
    assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["deployment"]);

    let selected = select("deploy", "deployment", &discovered);
    assert!(selected.is_empty());
}

#[tokio::test]
async fn test_load_keeps_discovered_beside_selection() {
    let mock = apps_cluster();
    let catalog = catalog(&mock, "apps/v1", "sts").await;

    assert_eq!(catalog.group_version(), "apps/v1");
    assert_eq!(catalog.selected().keys().collect::<Vec<_>>(), vec!["statefulset"]);
    let mut discovered: Vec<_> = catalog.discovered().keys().cloned().collect();
    discovered.sort();
    assert_eq!(discovered, vec!["deploy", "deployment", "statefulset", "sts"]);
}

#[tokio::test]
async fn test_resolve_by_alias_and_unknown_kind() {
    let mock = apps_cluster();
    let catalog = catalog(&mock, "apps/v1", "").await;

    assert_eq!(catalog.resolve("sts").expect("alias").name, "statefulset");
    let err = catalog.resolve("pod").expect_err("not in apps/v1");
    assert_eq!(err.to_string(), "no kind apps/v1/pod");

    assert!(catalog.resolve_all("deploy,sts").is_ok());
    assert!(catalog.resolve_all("deploy,pod").is_err());
}

#[tokio::test]
async fn test_list_instance_names() {
    let mock = apps_cluster();
    let catalog = catalog(&mock, "v1", "").await;
    let cm = catalog.resolve("cm").expect("configmap").clone();
    mock.add_instance(&cm.resource, instance("v1", "ConfigMap", "default", "settings", json!({})));
    mock.add_instance(&cm.resource, instance("v1", "ConfigMap", "kube-system", "coredns", json!({})));

    let mut all = catalog.list_instance_names(&mock, &cm, "").await.expect("names");
    all.sort();
    assert_eq!(all, vec!["coredns", "settings"]);

    let scoped = catalog
        .list_instance_names(&mock, &cm, "kube-system")
        .await
        .expect("names");
    assert_eq!(scoped, vec!["coredns"]);
}

#[tokio::test]
async fn test_pick_random_instance_without_instances() {
    let mock = apps_cluster();
    let catalog = catalog(&mock, "apps/v1", "").await;
    let sts = catalog.resolve("sts").expect("statefulset").clone();

    let result = catalog.pick_random_instance(&mock, &sts, "").await;
    assert!(matches!(result, Err(WatchError::NoInstances(name)) if name == "statefulset"));
}

#[tokio::test]
async fn test_list_path_prefix_on_typed_kind() {
    let mock = apps_cluster();
    let catalog = catalog(&mock, "apps/v1", "").await;
    let deploy = catalog.resolve("deploy").expect("deployment").clone();
    mock.add_instance(
        &deploy.resource,
        instance(
            "apps/v1",
            "Deployment",
            "default",
            "web",
            json!({
                "spec": {
                    "replicas": 2,
                    "paused": false,
                    "selector": { "matchLabels": { "app": "web" } },
                    "template": {}
                }
            }),
        ),
    );

    let top = catalog.list_path_prefix(&mock, "deploy", "").await.expect("top level");
    assert_eq!(top, vec!["apiVersion", "kind", "metadata", "spec"]);

    let spec = catalog
        .list_path_prefix(&mock, "deploy", "spec,")
        .await
        .expect("spec level");
    assert!(spec.contains(&"spec,replicas".to_string()));
    assert!(spec.contains(&"spec,selector".to_string()));
    assert!(!spec.contains(&"spec,paused".to_string()));
}

#[tokio::test]
async fn test_list_path_prefix_offers_empty_map_entries() {
    let mock = apps_cluster();
    let catalog = catalog(&mock, "v1", "").await;
    let cm = catalog.resolve("cm").expect("configmap").clone();
    mock.add_instance(
        &cm.resource,
        instance(
            "v1",
            "ConfigMap",
            "default",
            "settings",
            json!({ "data": { "mode": "fast", "empty": "" } }),
        ),
    );

    let data = catalog
        .list_path_prefix(&mock, "cm", "data,")
        .await
        .expect("data level");
    assert_eq!(data, vec!["data,empty", "data,mode"]);
}

#[tokio::test]
async fn test_list_path_prefix_falls_back_to_prototype() {
    let mock = apps_cluster();
    let catalog = catalog(&mock, "apps/v1", "").await;

    let top = catalog
        .list_path_prefix(&mock, "sts", "")
        .await
        .expect("prototype fields");
    assert_eq!(top, vec!["apiVersion", "kind", "metadata"]);

    let typed = catalog
        .list_path_prefix(&mock, "deploy", "")
        .await
        .expect("typed prototype fields");
    assert!(typed.contains(&"kind".to_string()));
    assert!(!typed.contains(&"spec".to_string()));
}

#[test]
fn test_next_path_segments_stops_at_unknown_segment() {
    let node = Node::dynamic(json!({ "spec": { "replicas": 1, "template": { "x": 1 } } }));

    let mut walked = next_path_segments(&node, "spec,missing,deeper");
    walked.sort();
    assert_eq!(walked, vec!["spec,replicas", "spec,template"]);

    assert_eq!(next_path_segments(&node, "spec,template"), vec!["spec,template,x"]);
    assert!(node.get_field("spec").is_some());
}

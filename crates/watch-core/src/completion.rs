//! Shell completion providers
//!
//! Read-only queries over the cluster and the catalog. Errors propagate to
//! the caller, which turns them into "no suggestions".

use crate::catalog::{ResourceCatalog, split_csv};
use crate::config::WatchConfig;
use crate::error::WatchError;
use crate::filter::SPLIT;
use cluster_client::ClusterClientTrait;
use kinds::KindRegistry;

/// Every namespace name
pub async fn complete_namespaces(client: &dyn ClusterClientTrait) -> Result<Vec<String>, WatchError> {
    Ok(client.list_namespaces().await?)
}

/// Every served group-version, core `v1` included
pub async fn complete_group_versions(
    client: &dyn ClusterClientTrait,
) -> Result<Vec<String>, WatchError> {
    let groups = client.list_api_groups().await?;
    Ok(groups
        .into_iter()
        .flat_map(|g| g.versions.into_iter().map(|v| v.group_version))
        .collect())
}

/// Kind names and aliases completing the last segment of `to_complete`.
pub async fn complete_kinds(
    client: &dyn ClusterClientTrait,
    registry: &KindRegistry,
    config: &WatchConfig,
    to_complete: &str,
) -> Result<Vec<String>, WatchError> {
    let catalog = ResourceCatalog::load(client, registry, config).await?;
    Ok(kind_suggestions(
        catalog.discovered().keys().map(String::as_str),
        to_complete,
    ))
}

/// Completes the last comma-separated segment of `to_complete` from `keys`.
///
/// Keys already present in the list are skipped. Each suggestion keeps the
/// earlier segments (`deploy,c` gives `deploy,cm`). Sorted.
pub fn kind_suggestions<'a, I>(keys: I, to_complete: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let segments: Vec<&str> = to_complete.split(SPLIT).collect();
    let (last, given) = match segments.split_last() {
        Some((last, given)) => (*last, given),
        None => ("", &[][..]),
    };

    let mut suggestions: Vec<String> = keys
        .into_iter()
        .filter(|k| k.starts_with(last))
        .filter(|k| !segments.contains(k))
        .map(|k| {
            given
                .iter()
                .copied()
                .chain(std::iter::once(k))
                .collect::<Vec<_>>()
                .join(SPLIT)
        })
        .collect();
    suggestions.sort();
    suggestions.dedup();
    suggestions
}

/// Instance names of the configured kinds, minus the names already given.
///
/// Empty when no kind is configured.
pub async fn complete_names(
    client: &dyn ClusterClientTrait,
    registry: &KindRegistry,
    config: &WatchConfig,
) -> Result<Vec<String>, WatchError> {
    if split_csv(&config.kinds).next().is_none() {
        return Ok(Vec::new());
    }

    let catalog = ResourceCatalog::load(client, registry, config).await?;
    let mut names = Vec::new();
    for descriptor in catalog.resolve_all(&config.kinds)? {
        let found = catalog
            .list_instance_names(client, descriptor, &config.namespace)
            .await?;
        names.extend(found.into_iter().filter(|n| !config.names.contains(n)));
    }
    Ok(names)
}

/// Next field path level for every configured kind.
pub async fn complete_path_prefix(
    client: &dyn ClusterClientTrait,
    registry: &KindRegistry,
    config: &WatchConfig,
    to_complete: &str,
) -> Result<Vec<String>, WatchError> {
    let catalog = ResourceCatalog::load(client, registry, config).await?;
    let mut paths = Vec::new();
    for descriptor in catalog.resolve_all(&config.kinds)? {
        paths.extend(
            catalog
                .list_path_prefix(client, &descriptor.name, to_complete)
                .await?,
        );
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_client::MockClusterClient;
    use kube::core::DynamicObject;
    use serde_json::json;

    fn cluster() -> MockClusterClient {
        let mock = MockClusterClient::new();
        mock.add_kind("v1", "configmaps", "configmap", "ConfigMap", &["cm"], true);
        mock.add_kind("v1", "services", "service", "Service", &["svc"], true);
        mock.add_kind("apps/v1", "deployments", "deployment", "Deployment", &["deploy"], true);
        mock.add_namespace("default");
        mock.add_namespace("kube-system");
        mock
    }

    fn add_configmap(mock: &MockClusterClient, namespace: &str, name: &str) {
        let obj: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": name, "namespace": namespace },
            "data": { "mode": "fast" }
        }))
        .expect("valid object");
        let resource = kube::core::ApiResource::from_gvk_with_plural(
            &kube::core::GroupVersionKind::gvk("", "v1", "ConfigMap"),
            "configmaps",
        );
        mock.add_instance(&resource, obj);
    }

    #[test]
    fn test_kind_suggestions_complete_last_segment() {
        let keys = ["deployment", "deploy", "cm", "configmap", "service"];
        assert_eq!(
            kind_suggestions(keys, "deploy,c"),
            vec!["deploy,cm", "deploy,configmap"]
        );
    }

    #[test]
    fn test_kind_suggestions_skip_given_names() {
        let keys = ["deployment", "deploy", "cm"];
        assert_eq!(
            kind_suggestions(keys, "deploy,"),
            vec!["deploy,cm", "deploy,deployment"]
        );
    }

    #[test]
    fn test_kind_suggestions_empty_input_lists_everything() {
        let keys = ["svc", "cm"];
        assert_eq!(kind_suggestions(keys, ""), vec!["cm", "svc"]);
    }

    #[tokio::test]
    async fn test_complete_namespaces() {
        let mock = cluster();
        assert_eq!(
            complete_namespaces(&mock).await.expect("namespaces"),
            vec!["default", "kube-system"]
        );
    }

    #[tokio::test]
    async fn test_complete_group_versions_includes_core() {
        let mock = cluster();
        let versions = complete_group_versions(&mock).await.expect("group versions");
        assert!(versions.contains(&"v1".to_string()));
        assert!(versions.contains(&"apps/v1".to_string()));
    }

    #[tokio::test]
    async fn test_complete_kinds() {
        let mock = cluster();
        let config = WatchConfig::default();
        let kinds = complete_kinds(&mock, &KindRegistry::new(), &config, "s")
            .await
            .expect("kinds");
        assert_eq!(kinds, vec!["service", "svc"]);
    }

    #[tokio::test]
    async fn test_complete_names() {
        let mock = cluster();
        add_configmap(&mock, "default", "settings");
        add_configmap(&mock, "default", "features");
        add_configmap(&mock, "kube-system", "coredns");

        let none = complete_names(&mock, &KindRegistry::builtin(), &WatchConfig::default())
            .await
            .expect("no kinds");
        assert!(none.is_empty());

        let config = WatchConfig {
            kinds: "cm".to_string(),
            namespace: "default".to_string(),
            names: vec!["settings".to_string()],
            ..Default::default()
        };
        let names = complete_names(&mock, &KindRegistry::builtin(), &config)
            .await
            .expect("names");
        assert_eq!(names, vec!["features"]);
    }

    #[tokio::test]
    async fn test_complete_names_unknown_kind_fails() {
        let mock = cluster();
        let config = WatchConfig {
            kinds: "pod".to_string(),
            ..Default::default()
        };
        let result = complete_names(&mock, &KindRegistry::new(), &config).await;
        assert!(matches!(result, Err(WatchError::NoKind { .. })));
    }

    #[tokio::test]
    async fn test_complete_path_prefix() {
        let mock = cluster();
        add_configmap(&mock, "default", "settings");
        let config = WatchConfig {
            kinds: "cm".to_string(),
            ..Default::default()
        };

        let paths = complete_path_prefix(&mock, &KindRegistry::builtin(), &config, "data,")
            .await
            .expect("paths");
        assert_eq!(paths, vec!["data,mode"]);
    }
}

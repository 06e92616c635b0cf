//! Resource catalog
//!
//! Resolves kind names and aliases to descriptors. Built once at start-up
//! from discovery plus the kind registry, then passed by reference to
//! whatever needs kind resolution.

use crate::access::{FieldAccess, Node};
use crate::config::WatchConfig;
use crate::error::WatchError;
use crate::filter::SPLIT;
use cluster_client::ClusterClientTrait;
use kinds::{KindRegistry, ResourceDescriptor};
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Descriptors of one group-version, keyed by canonical name and every alias.
pub type DescriptorMap = HashMap<String, ResourceDescriptor>;

/// Discovers the kinds of `group_version`.
pub async fn discover(
    client: &dyn ClusterClientTrait,
    registry: &KindRegistry,
    group_version: &str,
) -> Result<DescriptorMap, WatchError> {
    let list = client.list_api_resources(group_version).await?;
    let mut descriptors = DescriptorMap::new();
    for resource in &list.resources {
        let Some(descriptor) = ResourceDescriptor::from_discovery(group_version, resource) else {
            continue;
        };
        for key in descriptor.keys() {
            descriptors.insert(key.to_string(), descriptor.clone());
        }
    }
    registry.contribute(group_version, &mut descriptors);
    debug!(group_version, keys = descriptors.len(), "discovered kinds");
    Ok(descriptors)
}

/// Narrows `discovered` to the requested kinds minus the excluded ones.
///
/// Unknown names are ignored on both sides. When no requested name matches,
/// every discovered kind is selected. The result is keyed by canonical name.
pub fn select(
    requested: &str,
    excluded: &str,
    discovered: &DescriptorMap,
) -> BTreeMap<String, ResourceDescriptor> {
    let mut selected: BTreeMap<String, ResourceDescriptor> = split_csv(requested)
        .filter_map(|name| discovered.get(name))
        .map(|d| (d.name.clone(), d.clone()))
        .collect();

    if selected.is_empty() {
        selected = discovered
            .values()
            .map(|d| (d.name.clone(), d.clone()))
            .collect();
    }

    for name in split_csv(excluded) {
        if let Some(d) = discovered.get(name) {
            selected.remove(&d.name);
        }
    }
    selected
}

/// Non-empty segments of a comma-separated list
pub fn split_csv(csv: &str) -> impl Iterator<Item = &str> {
    csv.split(SPLIT).map(str::trim).filter(|s| !s.is_empty())
}

/// Discovered and selected kinds of one group-version.
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    group_version: String,
    discovered: DescriptorMap,
    selected: BTreeMap<String, ResourceDescriptor>,
}

impl ResourceCatalog {
    /// Discovers the configured group-version and applies the kind selection.
    pub async fn load(
        client: &dyn ClusterClientTrait,
        registry: &KindRegistry,
        config: &WatchConfig,
    ) -> Result<Self, WatchError> {
        let discovered = discover(client, registry, &config.group_version).await?;
        Ok(Self::new(
            &config.group_version,
            discovered,
            &config.kinds,
            &config.exclude_kinds,
        ))
    }

    /// Catalog over already discovered kinds
    pub fn new(group_version: &str, discovered: DescriptorMap, requested: &str, excluded: &str) -> Self {
        let selected = select(requested, excluded, &discovered);
        info!(
            group_version,
            kinds = ?selected.keys().collect::<Vec<_>>(),
            "selected kinds"
        );
        Self {
            group_version: group_version.to_string(),
            discovered,
            selected,
        }
    }

    /// Group-version the kinds were discovered in
    pub fn group_version(&self) -> &str {
        &self.group_version
    }

    /// Every discovered kind, keyed by name and alias
    pub fn discovered(&self) -> &DescriptorMap {
        &self.discovered
    }

    /// Selected kinds, keyed by canonical name
    pub fn selected(&self) -> &BTreeMap<String, ResourceDescriptor> {
        &self.selected
    }

    /// Selected kind by canonical name or alias
    pub fn resolve(&self, kind: &str) -> Result<&ResourceDescriptor, WatchError> {
        self.selected
            .values()
            .find(|d| d.matches(kind))
            .ok_or_else(|| WatchError::NoKind {
                group_version: self.group_version.clone(),
                kind: kind.to_string(),
            })
    }

    /// Resolves every name of a comma-separated list, failing on the first
    /// unknown one.
    pub fn resolve_all(&self, kinds: &str) -> Result<Vec<&ResourceDescriptor>, WatchError> {
        split_csv(kinds).map(|k| self.resolve(k)).collect()
    }

    /// Names of the instances of `descriptor` in `namespace` (empty = all).
    pub async fn list_instance_names(
        &self,
        client: &dyn ClusterClientTrait,
        descriptor: &ResourceDescriptor,
        namespace: &str,
    ) -> Result<Vec<String>, WatchError> {
        let instances = client
            .list_instances(&descriptor.resource, namespace_scope(namespace))
            .await?;

        let mut names = Vec::with_capacity(instances.len());
        for obj in &instances {
            let name = match descriptor.adapter() {
                Some(_) => Node::for_instance(descriptor, obj)?
                    .get_field("metadata")
                    .and_then(|m| m.get_field("name"))
                    .and_then(|n| n.as_str().map(str::to_string)),
                None => obj.metadata.name.clone(),
            };
            if let Some(name) = name {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// A random live instance of `descriptor`, used as a schema sample.
    pub async fn pick_random_instance(
        &self,
        client: &dyn ClusterClientTrait,
        descriptor: &ResourceDescriptor,
        namespace: &str,
    ) -> Result<Node, WatchError> {
        let instances = client
            .list_instances(&descriptor.resource, namespace_scope(namespace))
            .await?;
        let obj = instances
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| WatchError::NoInstances(descriptor.name.clone()))?;
        Node::for_instance(descriptor, obj)
    }

    /// Field names one level below `prefix` in a live instance of `kind`,
    /// or in its empty prototype when there are no instances.
    ///
    /// Prefix segments are walked while they exist; the next level of the
    /// deepest reached field is returned, each entry joined with the walked
    /// segments (`spec,` gives `spec,replicas`, `spec,selector`, ...).
    pub async fn list_path_prefix(
        &self,
        client: &dyn ClusterClientTrait,
        kind: &str,
        prefix: &str,
    ) -> Result<Vec<String>, WatchError> {
        let descriptor = self.resolve(kind)?;
        let sample = match self.pick_random_instance(client, descriptor, "").await {
            Err(WatchError::NoInstances(_)) => {
                debug!(kind = %descriptor.name, "no live instances, sampling the prototype");
                Node::for_instance(descriptor, &descriptor.prototype())?
            }
            sample => sample?,
        };
        Ok(next_path_segments(&sample, prefix))
    }
}

/// Walks `prefix` into `root` and lists the next level of fields.
pub fn next_path_segments<A: FieldAccess>(root: &A, prefix: &str) -> Vec<String> {
    let mut walked: Vec<&str> = Vec::new();
    let mut fields = root.list_fields();
    let mut current: Option<Node> = None;

    for segment in split_csv(prefix) {
        if !fields.iter().any(|f| f == segment) {
            break;
        }
        let child = match &current {
            Some(node) => node.get_field(segment),
            None => root.get_field(segment),
        };
        let Some(child) = child else {
            break;
        };
        walked.push(segment);
        fields = child.list_fields();
        current = Some(child);
    }

    fields
        .into_iter()
        .map(|f| {
            walked
                .iter()
                .copied()
                .chain(std::iter::once(f.as_str()))
                .collect::<Vec<_>>()
                .join(SPLIT)
        })
        .collect()
}

fn namespace_scope(namespace: &str) -> Option<&str> {
    (!namespace.is_empty()).then_some(namespace)
}

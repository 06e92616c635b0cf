//! Object identity and the namespace/name event gate

use crate::metrics::FieldLabels;
use kube::ResourceExt;
use kube::core::{ApiResource, DynamicObject};
use std::fmt;
use tracing::info;

/// Identity of one watched object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentity {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ObjectIdentity {
    /// Identity of `obj`, an instance of `resource`
    pub fn new(resource: &ApiResource, obj: &DynamicObject) -> Self {
        Self {
            group: resource.group.clone(),
            version: resource.version.clone(),
            kind: resource.kind.clone(),
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
        }
    }

    /// Table key, `{kind}/{name}`
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }

    /// Gauge labels for one field of this object
    pub fn field_labels(&self, field: &str) -> FieldLabels {
        FieldLabels {
            group: self.group.clone(),
            version: self.version.clone(),
            kind: self.kind.clone(),
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            field: field.to_string(),
        }
    }
}

/// Lifecycle event delivered by the watch source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WatchAction::Create => "create",
            WatchAction::Update => "update",
            WatchAction::Delete => "delete",
        })
    }
}

/// Namespace/name selection applied to every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    namespace: String,
    names: Vec<String>,
}

impl EventFilter {
    pub fn new(namespace: &str, names: &[String]) -> Self {
        Self {
            namespace: namespace.to_string(),
            names: names.iter().filter(|n| !n.is_empty()).cloned().collect(),
        }
    }

    /// True when the object passes the namespace substring rule and matches
    /// at least one name substring. Unset rules always pass.
    pub fn accept(&self, id: &ObjectIdentity, action: WatchAction) -> bool {
        if !self.namespace.is_empty() && !id.namespace.contains(&self.namespace) {
            return false;
        }
        if !self.names.is_empty() && !self.names.iter().any(|n| id.name.contains(n.as_str())) {
            return false;
        }
        info!(
            action = %action,
            kind = %id.kind,
            namespace = %id.namespace,
            name = %id.name,
            "event accepted"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(namespace: &str, name: &str) -> ObjectIdentity {
        ObjectIdentity {
            group: "apps".to_string(),
            version: "v1".to_string(),
            kind: "Deployment".to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = EventFilter::default();
        assert!(filter.accept(&identity("", "a"), WatchAction::Create));
        assert!(filter.accept(&identity("kube-system", "coredns"), WatchAction::Delete));
    }

    #[test]
    fn test_namespace_substring() {
        let filter = EventFilter::new("system", &[]);
        assert!(filter.accept(&identity("kube-system", "coredns"), WatchAction::Update));
        assert!(!filter.accept(&identity("default", "web"), WatchAction::Update));
    }

    #[test]
    fn test_names_are_ored() {
        let filter = EventFilter::new("", &["web".to_string(), "db".to_string()]);
        assert!(filter.accept(&identity("default", "frontend-web"), WatchAction::Update));
        assert!(filter.accept(&identity("default", "db-0"), WatchAction::Update));
        assert!(!filter.accept(&identity("default", "cache"), WatchAction::Update));
    }

    #[test]
    fn test_all_rules_must_pass() {
        let filter = EventFilter::new("prod", &["web".to_string()]);
        assert!(filter.accept(&identity("prod", "web"), WatchAction::Create));
        assert!(!filter.accept(&identity("staging", "web"), WatchAction::Create));
        assert!(!filter.accept(&identity("prod", "db"), WatchAction::Create));
    }

    #[test]
    fn test_identity_from_object() {
        let resource = ApiResource {
            group: "apps".to_string(),
            version: "v1".to_string(),
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            plural: "deployments".to_string(),
        };
        let obj = DynamicObject::new("web", &resource).within("default");
        let id = ObjectIdentity::new(&resource, &obj);

        assert_eq!(id, identity("default", "web"));
        assert_eq!(id.key(), "Deployment/web");

        let labels = id.field_labels("spec/replicas");
        assert_eq!(
            labels.values(),
            ["apps", "v1", "Deployment", "default", "web", "spec/replicas"]
        );
    }
}

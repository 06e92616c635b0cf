//! core/v1 kinds

use crate::adapter::TypedKind;
use crate::registry::KindRegistry;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod};

/// Registers ConfigMap, Namespace and Pod
pub fn register(registry: &mut KindRegistry) {
    registry.register(TypedKind::<ConfigMap>::namespaced("configmap", Some("cm")));
    registry.register(TypedKind::<Namespace>::cluster("namespace", Some("ns")));
    registry.register(TypedKind::<Pod>::namespaced("pod", None));
}

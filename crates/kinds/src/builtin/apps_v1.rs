//! apps/v1 kinds

use crate::adapter::TypedKind;
use crate::registry::KindRegistry;
use k8s_openapi::api::apps::v1::Deployment;

/// Registers Deployment
pub fn register(registry: &mut KindRegistry) {
    registry.register(TypedKind::<Deployment>::namespaced("deployment", Some("dp")));
}

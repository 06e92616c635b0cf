//! Built-in kinds
//!
//! The typed kinds shipped with kubewatch, grouped by API group:
//! - core/v1: ConfigMap, Namespace, Pod
//! - apps/v1: Deployment
//! - autoscaling/v2: HorizontalPodAutoscaler

pub mod apps_v1;
pub mod autoscaling_v2;
pub mod core_v1;

use crate::registry::KindRegistry;

/// Registers every built-in kind
pub fn register_all(registry: &mut KindRegistry) {
    core_v1::register(registry);
    apps_v1::register(registry);
    autoscaling_v2::register(registry);
}

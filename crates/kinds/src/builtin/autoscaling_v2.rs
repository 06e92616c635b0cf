//! autoscaling/v2 kinds

use crate::adapter::TypedKind;
use crate::registry::KindRegistry;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;

/// Registers HorizontalPodAutoscaler
pub fn register(registry: &mut KindRegistry) {
    registry.register(TypedKind::<HorizontalPodAutoscaler>::namespaced(
        "horizontalpodautoscaler",
        Some("hpa"),
    ));
}

//! Discovery helpers shared by the real and mock clients

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIGroup, GroupVersionForDiscovery};

/// Name under which the core (legacy) API group is reported
pub const CORE_GROUP: &str = "v1";

/// The core group, which `/apis` does not list
pub fn core_group() -> APIGroup {
    let version = GroupVersionForDiscovery {
        group_version: CORE_GROUP.to_string(),
        version: CORE_GROUP.to_string(),
    };
    APIGroup {
        name: CORE_GROUP.to_string(),
        versions: vec![version.clone()],
        preferred_version: Some(version),
        ..Default::default()
    }
}

/// Appends the core group unless it is already present
pub fn with_core_group(mut groups: Vec<APIGroup>) -> Vec<APIGroup> {
    if !groups.iter().any(|g| g.name == CORE_GROUP) {
        groups.push(core_group());
    }
    groups
}

/// True for group-versions served under `/api` rather than `/apis`
pub fn is_core_group_version(group_version: &str) -> bool {
    !group_version.contains('/')
}

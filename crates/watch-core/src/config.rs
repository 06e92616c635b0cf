//! Watch session configuration
//!
//! Immutable for the lifetime of one session. Assembled by the binary from
//! flags and environment, logged at start-up.

use crate::error::WatchError;
use crate::event::EventFilter;
use crate::filter::PathFilter;
use crate::render::TableRenderer;
use serde::{Deserialize, Serialize};

/// Default group-version watched when none is given
pub const DEFAULT_GROUP_VERSION: &str = "v1";

/// Default metrics listen address
pub const DEFAULT_METRICS_ADDRESS: &str = ":6666";

/// Settings for one watch session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatchConfig {
    /// Requested kind names/aliases, comma separated (empty = all)
    pub kinds: String,

    /// Excluded kind names/aliases, comma separated
    pub exclude_kinds: String,

    /// Namespace substring (empty = any)
    pub namespace: String,

    /// Group-version to discover kinds in
    pub group_version: String,

    /// Name substrings, any of which must match (empty = any)
    pub names: Vec<String>,

    /// Show changes under `metadata.annotations`
    pub enable_annotations: bool,

    /// Compare sequences element by element instead of as multisets
    pub slice_ordering: bool,

    /// Maximum width of one table cell
    pub column_width_max: usize,

    /// Maximum width of one rendered line
    pub row_width_max: usize,

    /// Suppress resourceVersion, generation, managedFields and friends
    pub ignore_metadata: bool,

    /// Only show paths under this prefix (comma separated segments)
    pub path_prefix: String,

    /// Only show display paths matching this regex
    pub path_template: String,

    /// Scroll buffer capacity
    pub max_rows: usize,

    /// Metrics listen address (empty or `0` disables)
    pub metrics_address: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            kinds: String::new(),
            exclude_kinds: String::new(),
            namespace: String::new(),
            group_version: DEFAULT_GROUP_VERSION.to_string(),
            names: Vec::new(),
            enable_annotations: true,
            slice_ordering: true,
            column_width_max: 20,
            row_width_max: 80,
            ignore_metadata: true,
            path_prefix: String::new(),
            path_template: String::new(),
            max_rows: 20,
            metrics_address: DEFAULT_METRICS_ADDRESS.to_string(),
        }
    }
}

impl WatchConfig {
    /// Compiles the path filter chain. Fails on an invalid template.
    pub fn path_filter(&self) -> Result<PathFilter, WatchError> {
        PathFilter::new(self)
    }

    /// Namespace/name gate for raw events
    pub fn event_filter(&self) -> EventFilter {
        EventFilter::new(&self.namespace, &self.names)
    }

    /// Table renderer sized from the configured caps
    pub fn renderer(&self, color: bool) -> TableRenderer {
        TableRenderer::new(self.column_width_max, self.row_width_max, color)
    }

    /// True when a metrics endpoint should be served
    pub fn metrics_enabled(&self) -> bool {
        !self.metrics_address.is_empty() && self.metrics_address != "0"
    }
}

//! Controller-specific error types.
//!
//! This module defines error types specific to the kubewatch binary that are
//! not covered by the library crates' errors.

use cluster_client::ClusterError;
use kube_runtime::watcher;
use thiserror::Error;
use watch_core::WatchError;

/// Errors that can occur while running a watch session.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Cluster client error
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// Catalog, filter or rendering error
    #[error(transparent)]
    Core(#[from] WatchError),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// A watcher stopped before its initial list completed
    #[error("cache not sync: {kind}")]
    CacheNotSynced {
        /// Kind whose watcher never synced
        kind: String,
        /// Watch failure, when the watcher reported one
        #[source]
        source: Option<watcher::Error>,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metrics endpoint failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Selection resolved to no kinds at all
    #[error("no kinds to watch in {0}")]
    NothingToWatch(String),
}

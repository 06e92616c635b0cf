//! Core error types.

use cluster_client::ClusterError;
use kinds::KindError;
use thiserror::Error;

/// Errors that can occur in the watch pipeline and its discovery side.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Cluster API error
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// Typed kind conversion error
    #[error("Kind error: {0}")]
    Kind(#[from] KindError),

    /// Requested kind is not in the selected set
    #[error("no kind {group_version}/{kind}")]
    NoKind {
        /// Group-version that was searched
        group_version: String,
        /// Requested name or alias
        kind: String,
    },

    /// A kind has no live instances to sample
    #[error("no instances of {0}")]
    NoInstances(String),

    /// Path template is not a valid regular expression
    #[error("Invalid path template: {0}")]
    InvalidTemplate(#[from] regex::Error),

    /// Metric registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Terminal output error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

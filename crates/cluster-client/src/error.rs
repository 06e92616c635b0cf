//! Cluster client errors

use thiserror::Error;

/// Errors that can occur when talking to the Kubernetes API
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Kubernetes API or transport error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Kubeconfig could not be loaded
    #[error("Kubeconfig error: {0}")]
    Config(#[from] kube::config::KubeconfigError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Group-version string that cannot be queried
    #[error("Invalid group version: {0}")]
    InvalidGroupVersion(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

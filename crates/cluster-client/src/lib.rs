//! Kubernetes cluster client
//!
//! The API surface kubewatch needs from a cluster, behind a trait so the
//! catalog and completion code can be tested without one:
//!
//! - **Discovery**: API groups and the resource kinds of a group-version
//! - **Namespaces**: names of all namespaces
//! - **Instances**: list/get untyped instances of any kind
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{ClusterClient, ClusterClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ClusterClient::try_default().await?;
//! let resources = client.list_api_resources("apps/v1").await?;
//! for r in resources.resources {
//!     println!("{} ({})", r.name, r.kind);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod discovery;
pub mod error;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::ClusterClient;
pub use cluster_trait::ClusterClientTrait;
pub use discovery::*;
pub use error::ClusterError;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockClusterClient;

//! Shell completion entry point.
//!
//! Failures never reach the shell: they are logged and produce no
//! suggestions.

use crate::cli::{CompleteArgs, CompletionTarget};
use crate::error::ControllerError;
use cluster_client::{ClusterClient, ClusterClientTrait};
use kinds::KindRegistry;
use tracing::warn;
use watch_core::WatchError;
use watch_core::completion::{
    complete_group_versions, complete_kinds, complete_names, complete_namespaces,
    complete_path_prefix,
};

/// Suggestions for `args`, empty on any error.
pub async fn run(args: &CompleteArgs) -> Vec<String> {
    match suggestions(args).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!("completion of {:?} failed: {}", args.target, e);
            Vec::new()
        }
    }
}

async fn suggestions(args: &CompleteArgs) -> Result<Vec<String>, ControllerError> {
    let client = ClusterClient::connect(args.selection.context.as_deref()).await?;
    Ok(complete(&client, &KindRegistry::builtin(), args).await?)
}

/// Runs the completion provider for `args.target`.
pub async fn complete(
    client: &dyn ClusterClientTrait,
    registry: &KindRegistry,
    args: &CompleteArgs,
) -> Result<Vec<String>, WatchError> {
    let config = args.selection.config();
    match args.target {
        CompletionTarget::Namespace => complete_namespaces(client).await,
        CompletionTarget::GroupVersion => complete_group_versions(client).await,
        CompletionTarget::Kind => complete_kinds(client, registry, &config, &args.to_complete).await,
        CompletionTarget::Name => complete_names(client, registry, &config).await,
        CompletionTarget::PathPrefix => {
            complete_path_prefix(client, registry, &config, &args.to_complete).await
        }
    }
}

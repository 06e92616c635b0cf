//! kubewatch
//!
//! Watches Kubernetes resources of one group-version and prints every field
//! change of every object as a live, scrolling table. Numeric field values
//! are also exported as Prometheus gauges.
//!
//! The `complete` subcommand backs shell completion for kinds, namespaces,
//! group-versions, instance names and field path prefixes.

mod cli;
mod complete;
mod controller;
mod error;
mod server;
mod watcher;

use clap::Parser;
use cli::{Cli, Command};
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the table; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Install the ring crypto provider before any TLS client is built
    let _ = rustls::crypto::ring::default_provider().install_default();

    match Cli::parse().command {
        Command::Watch(args) => {
            let config = args.config();
            info!("Starting kubewatch");
            info!("Configuration: {}", serde_json::to_string(&config)?);

            let controller = Controller::new(config, args.selection.context.as_deref()).await?;
            controller.run().await?;
        }
        Command::Complete(args) => {
            for suggestion in complete::run(&args).await {
                println!("{suggestion}");
            }
        }
    }

    Ok(())
}

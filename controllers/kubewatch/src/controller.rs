//! Main controller implementation.
//!
//! This module contains the `Controller` struct that resolves the kinds to
//! watch, starts one watcher per kind plus the metrics endpoint, waits for
//! every watcher's initial sync and then runs until interrupted.

use crate::error::ControllerError;
use crate::server;
use crate::watcher::{self, KindWatcher};
use cluster_client::ClusterClient;
use kinds::KindRegistry;
use std::io::{IsTerminal, Stdout};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};
use watch_core::{
    DiffEngine, FieldValueGauges, MetricsSink, ResourceCatalog, Screen, WatchConfig, WatchError,
};

type Task = JoinHandle<Result<(), ControllerError>>;

/// One watch session.
pub struct Controller {
    config: WatchConfig,
    client: ClusterClient,
    catalog: ResourceCatalog,
    engine: Arc<DiffEngine<Stdout>>,
    gauges: Option<Arc<FieldValueGauges>>,
}

impl Controller {
    /// Connects to the cluster and resolves the kinds to watch.
    pub async fn new(config: WatchConfig, context: Option<&str>) -> Result<Self, ControllerError> {
        info!("Initializing kubewatch");
        if config.group_version.is_empty() {
            return Err(ControllerError::InvalidConfig(
                "group version must not be empty".to_string(),
            ));
        }

        let client = ClusterClient::connect(context).await?;
        let catalog = ResourceCatalog::load(&client, &KindRegistry::builtin(), &config).await?;
        if catalog.selected().is_empty() {
            return Err(ControllerError::NothingToWatch(
                catalog.group_version().to_string(),
            ));
        }

        let stdout = std::io::stdout();
        let color = stdout.is_terminal();
        let screen = Screen::new(config.max_rows, config.renderer(color), stdout);
        let mut engine = DiffEngine::new(config.path_filter()?, config.slice_ordering, screen);

        let gauges = if config.metrics_enabled() {
            let gauges = Arc::new(FieldValueGauges::new().map_err(WatchError::from)?);
            engine = engine.with_metrics(Arc::clone(&gauges) as Arc<dyn MetricsSink>);
            Some(gauges)
        } else {
            None
        };

        Ok(Self {
            config,
            client,
            catalog,
            engine: Arc::new(engine),
            gauges,
        })
    }

    /// Runs the session until Ctrl-C or a watcher failure.
    pub async fn run(self) -> Result<(), ControllerError> {
        let kinds: Vec<&str> = self.catalog.selected().keys().map(String::as_str).collect();
        println!("watching {kinds:?}");

        let mut tasks: Vec<Task> = Vec::new();
        if let Some(gauges) = &self.gauges {
            let address = self.config.metrics_address.clone();
            tasks.push(tokio::spawn(server::serve(address, Arc::clone(gauges))));
        }

        let mut readiness = Vec::new();
        for descriptor in self.catalog.selected().values() {
            let (tx, rx) = oneshot::channel();
            let api = descriptor.api(self.client.kube_client(), None);
            let watcher = KindWatcher::new(
                descriptor.clone(),
                api,
                Arc::clone(&self.engine),
                self.config.event_filter(),
            );
            tasks.push(tokio::spawn(watcher.run(tx)));
            readiness.push((descriptor.name.clone(), rx));
        }

        let synced = futures::future::try_join_all(
            readiness.into_iter().map(|(name, rx)| watcher::wait_ready(name, rx)),
        );

        tokio::select! {
            result = synced => {
                if let Err(e) = result {
                    error!("Failed to sync caches: {}", e);
                    abort_all(&tasks);
                    return Err(e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted before caches synced");
                abort_all(&tasks);
                return Ok(());
            }
        }
        info!("kubewatch running");

        let outcome = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                Ok(())
            }
            (result, _, _) = futures::future::select_all(tasks.iter_mut()) => match result {
                Ok(Ok(())) => Err(ControllerError::Watch("task exited".to_string())),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(ControllerError::Watch(format!("task panicked: {e}"))),
            },
        };
        abort_all(&tasks);
        outcome
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

fn abort_all(tasks: &[Task]) {
    for task in tasks {
        task.abort();
    }
}

//! Kubernetes resource watchers.
//!
//! One watcher per selected kind, each in its own task. Events of one kind
//! are handled in order, so the old/new snapshot pairing of an object
//! always follows the sequence the API server sent.

use crate::error::ControllerError;
use futures::TryStreamExt;
use kinds::ResourceDescriptor;
use kube::api::Api;
use kube::core::DynamicObject;
use kube::ResourceExt;
use kube_runtime::{WatchStreamExt, watcher};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use watch_core::{DiffEngine, EventFilter, ObjectIdentity, WatchAction};

/// Signals the end of the initial list, or the error that prevented it.
pub type Readiness = oneshot::Sender<Result<(), watcher::Error>>;

/// Waits for a watcher's initial list.
pub async fn wait_ready(
    kind: String,
    ready: oneshot::Receiver<Result<(), watcher::Error>>,
) -> Result<(), ControllerError> {
    match ready.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ControllerError::CacheNotSynced { kind, source: Some(e) }),
        Err(_) => Err(ControllerError::CacheNotSynced { kind, source: None }),
    }
}

/// Lifecycle event derived from the watch stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent {
    Created(DynamicObject),
    Updated {
        old: DynamicObject,
        new: DynamicObject,
    },
    Deleted(DynamicObject),
}

/// Last seen snapshot of every object of one kind.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    objects: HashMap<String, DynamicObject>,
    relisted: Option<HashSet<String>>,
}

fn object_key(obj: &DynamicObject) -> String {
    format!("{}/{}", obj.namespace().unwrap_or_default(), obj.name_any())
}

impl SnapshotStore {
    /// Records `obj`. Returns `None` when the stored snapshot has the same
    /// resourceVersion.
    pub fn apply(&mut self, obj: DynamicObject) -> Option<SnapshotEvent> {
        let key = object_key(&obj);
        match self.objects.insert(key, obj.clone()) {
            Some(old)
                if old.metadata.resource_version.is_some()
                    && old.metadata.resource_version == obj.metadata.resource_version =>
            {
                None
            }
            Some(old) => Some(SnapshotEvent::Updated { old, new: obj }),
            None => Some(SnapshotEvent::Created(obj)),
        }
    }

    /// Forgets `obj`, returning the last stored snapshot when there is one.
    pub fn delete(&mut self, obj: DynamicObject) -> SnapshotEvent {
        let stored = self.objects.remove(&object_key(&obj));
        SnapshotEvent::Deleted(stored.unwrap_or(obj))
    }

    /// Starts a re-list
    pub fn begin_relist(&mut self) {
        self.relisted = Some(HashSet::new());
    }

    /// Records an object delivered by the current re-list
    pub fn relisted(&mut self, obj: DynamicObject) -> Option<SnapshotEvent> {
        if let Some(seen) = self.relisted.as_mut() {
            seen.insert(object_key(&obj));
        }
        self.apply(obj)
    }

    /// Ends a re-list. Objects the re-list did not deliver are gone.
    pub fn finish_relist(&mut self) -> Vec<SnapshotEvent> {
        let Some(seen) = self.relisted.take() else {
            return Vec::new();
        };
        let gone: Vec<String> = self
            .objects
            .keys()
            .filter(|k| !seen.contains(*k))
            .cloned()
            .collect();
        gone.into_iter()
            .filter_map(|k| self.objects.remove(&k))
            .map(SnapshotEvent::Deleted)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

/// Watches one kind and feeds its events to the diff engine.
pub struct KindWatcher<W: Write> {
    descriptor: ResourceDescriptor,
    api: Api<DynamicObject>,
    engine: Arc<DiffEngine<W>>,
    filter: EventFilter,
}

impl<W: Write> KindWatcher<W> {
    pub fn new(
        descriptor: ResourceDescriptor,
        api: Api<DynamicObject>,
        engine: Arc<DiffEngine<W>>,
        filter: EventFilter,
    ) -> Self {
        Self {
            descriptor,
            api,
            engine,
            filter,
        }
    }

    /// Runs until the stream ends.
    ///
    /// `ready` fires once the initial list is complete, or carries the
    /// error that ended the watcher before that. Errors after the initial
    /// list are logged and the watcher backs off and resumes.
    pub async fn run(self, ready: Readiness) -> Result<(), ControllerError> {
        let kind = self.descriptor.resource.kind.clone();
        info!("Starting {} watcher", kind);

        let mut ready = Some(ready);
        let mut store = SnapshotStore::default();
        let mut stream = Box::pin(
            watcher(self.api.clone(), watcher::Config::default()).default_backoff(),
        );

        loop {
            let event = match stream.try_next().await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(e) => {
                    if let Some(tx) = ready.take() {
                        error!("{} watcher failed before initial sync: {}", kind, e);
                        let _ = tx.send(Err(e));
                        return Err(ControllerError::CacheNotSynced { kind, source: None });
                    }
                    warn!("{} watcher error, retrying: {}", kind, e);
                    continue;
                }
            };

            match event {
                watcher::Event::Init => {
                    debug!("{} watcher (re)listing", kind);
                    store.begin_relist();
                }
                watcher::Event::InitApply(obj) => {
                    if let Some(event) = store.relisted(obj) {
                        self.handle(event);
                    }
                }
                watcher::Event::InitDone => {
                    for event in store.finish_relist() {
                        self.handle(event);
                    }
                    if let Some(tx) = ready.take() {
                        info!("{} watcher synced {} objects", kind, store.len());
                        let _ = tx.send(Ok(()));
                    }
                }
                watcher::Event::Apply(obj) => {
                    if let Some(event) = store.apply(obj) {
                        self.handle(event);
                    }
                }
                watcher::Event::Delete(obj) => {
                    let event = store.delete(obj);
                    self.handle(event);
                }
            }
        }

        if ready.is_some() {
            return Err(ControllerError::CacheNotSynced { kind, source: None });
        }
        Err(ControllerError::Watch(format!("{kind} watch stream ended")))
    }

    fn handle(&self, event: SnapshotEvent) {
        let resource = &self.descriptor.resource;
        match event {
            SnapshotEvent::Created(obj) => {
                let id = ObjectIdentity::new(resource, &obj);
                self.filter.accept(&id, WatchAction::Create);
            }
            SnapshotEvent::Updated { old, new } => {
                let id = ObjectIdentity::new(resource, &new);
                if self.filter.accept(&id, WatchAction::Update) {
                    self.engine.diff_object(&id, &old, &new);
                }
            }
            SnapshotEvent::Deleted(obj) => {
                let id = ObjectIdentity::new(resource, &obj);
                if self.filter.accept(&id, WatchAction::Delete) {
                    self.engine.object_deleted(&id);
                }
            }
        }
    }
}

impl<W: Write> std::fmt::Debug for KindWatcher<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindWatcher")
            .field("kind", &self.descriptor.resource.kind)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

//! Diff engine
//!
//! Turns one update event into display rows and gauge updates. All event
//! handlers share one engine; the screen and the gauge bookkeeping each sit
//! behind a mutex.

use crate::buffer::DisplayRow;
use crate::diff::{Change, diff};
use crate::event::ObjectIdentity;
use crate::filter::PathFilter;
use crate::metrics::MetricsSink;
use crate::render::Screen;
use chrono::{DateTime, Local, TimeZone};
use kube::core::DynamicObject;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Marker printed for absent values
pub const NIL: &str = "<nil>";

const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Shared diff and presentation state for one watch session.
pub struct DiffEngine<W: Write> {
    filter: PathFilter,
    slice_ordering: bool,
    metrics: Option<Arc<dyn MetricsSink>>,
    screen: Mutex<Screen<W>>,
    // Fields with a live gauge, per object
    gauges: Mutex<HashMap<ObjectIdentity, HashSet<String>>>,
}

impl<W: Write> DiffEngine<W> {
    /// Engine without a metrics sink
    pub fn new(filter: PathFilter, slice_ordering: bool, screen: Screen<W>) -> Self {
        Self {
            filter,
            slice_ordering,
            metrics: None,
            screen: Mutex::new(screen),
            gauges: Mutex::new(HashMap::new()),
        }
    }

    /// Reports numeric values to `sink`
    pub fn with_metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// Diffs two snapshots of `id` and shows the surviving changes.
    ///
    /// Snapshots that cannot be compared count as unchanged.
    pub fn diff_object(&self, id: &ObjectIdentity, old: &DynamicObject, new: &DynamicObject) {
        let values = serde_json::to_value(old).and_then(|o| Ok((o, serde_json::to_value(new)?)));
        match values {
            Ok((old, new)) => {
                self.diff_values(id, &old, &new);
            }
            Err(e) => debug!(error = %e, key = %id.key(), "snapshot diff failed, skipping"),
        }
    }

    /// Diffs two structured snapshots of `id`.
    ///
    /// Returns the number of changes that survived filtering.
    pub fn diff_values(&self, id: &ObjectIdentity, old: &Value, new: &Value) -> usize {
        let rows: Vec<DisplayRow> = diff(old, new, self.slice_ordering)
            .into_iter()
            .filter_map(|change| {
                let path = self.filter.apply(&change.path)?;
                self.record(id, &path, &change);
                Some(DisplayRow::Change {
                    path,
                    from: display_value(change.from.as_ref()),
                    to: display_value(change.to.as_ref()),
                    op: change.kind.to_string(),
                })
            })
            .collect();

        if rows.is_empty() {
            return 0;
        }
        let count = rows.len();
        let mut batch = Vec::with_capacity(count + 1);
        batch.push(self.header(id));
        batch.extend(rows);
        self.push(batch);
        count
    }

    /// Clears every gauge of a deleted object and marks the deletion on
    /// screen with a header row.
    pub fn object_deleted(&self, id: &ObjectIdentity) {
        let fields = lock(&self.gauges).remove(id).unwrap_or_default();
        if let Some(sink) = &self.metrics {
            for field in &fields {
                sink.delete(&id.field_labels(field));
            }
        }
        self.push(vec![self.header(id)]);
    }

    /// Snapshot of the rows currently on screen
    pub fn rows(&self) -> Vec<DisplayRow> {
        lock(&self.screen).buffer().rows().cloned().collect()
    }

    /// Locked access to the screen
    pub fn screen(&self) -> MutexGuard<'_, Screen<W>> {
        lock(&self.screen)
    }

    fn record(&self, id: &ObjectIdentity, path: &str, change: &Change) {
        let Some(sink) = &self.metrics else {
            return;
        };
        let labels = id.field_labels(path);
        match change.to.as_ref() {
            None => {
                sink.delete(&labels);
                if let Some(fields) = lock(&self.gauges).get_mut(id) {
                    fields.remove(path);
                }
            }
            Some(Value::Number(n)) => {
                if let Some(value) = n.as_f64() {
                    sink.set(&labels, value);
                    lock(&self.gauges)
                        .entry(id.clone())
                        .or_default()
                        .insert(path.to_string());
                }
            }
            Some(_) => {}
        }
    }

    fn header(&self, id: &ObjectIdentity) -> DisplayRow {
        DisplayRow::Header {
            time: format_time(&Local::now()),
            key: id.key(),
        }
    }

    fn push(&self, rows: Vec<DisplayRow>) {
        if let Err(e) = lock(&self.screen).push(rows) {
            warn!(error = %e, "failed to render change table");
        }
    }
}

impl<W: Write> std::fmt::Debug for DiffEngine<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffEngine")
            .field("filter", &self.filter)
            .field("slice_ordering", &self.slice_ordering)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

/// Header timestamp: milliseconds with trailing zeros trimmed.
pub fn format_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let formatted = time.format(TIME_FORMAT).to_string();
    let trimmed = formatted.trim_end_matches('0');
    trimmed.strip_suffix('.').unwrap_or(trimmed).to_string()
}

/// Cell text for a change value.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NIL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// A poisoned lock only means another handler panicked mid-render; the
// buffer itself is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

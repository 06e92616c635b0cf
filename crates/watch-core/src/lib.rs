//! kubewatch core
//!
//! Turns pairs of object snapshots into a live, filtered table of field
//! changes.
//!
//! Pipeline, per update event:
//! 1. `event::EventFilter` gates the object by namespace and name
//! 2. `diff::diff` computes structural changes between the snapshots
//! 3. `filter::PathFilter` drops noise and rewrites surviving paths
//! 4. `engine::DiffEngine` turns survivors into display rows and gauges
//! 5. `render::Screen` appends rows to the bounded `buffer::ScrollBuffer`
//!    and redraws the whole window
//!
//! The discovery side (`catalog`, `access`, `completion`) resolves kind
//! names to descriptors and walks live objects generically for shell
//! completion.

pub mod access;
pub mod buffer;
pub mod catalog;
pub mod completion;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod event;
pub mod filter;
pub mod metrics;
pub mod render;

#[cfg(test)]
mod catalog_test;

pub use access::{FieldAccess, Node, Shape};
pub use buffer::{DisplayRow, ScrollBuffer};
pub use catalog::ResourceCatalog;
pub use config::WatchConfig;
pub use diff::{Change, ChangeKind};
pub use engine::DiffEngine;
pub use error::WatchError;
pub use event::{EventFilter, ObjectIdentity, WatchAction};
pub use filter::PathFilter;
pub use metrics::{FieldLabels, FieldValueGauges, MetricsSink};
pub use render::{Screen, TableRenderer};

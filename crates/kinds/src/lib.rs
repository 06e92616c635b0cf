//! kubewatch kind registry
//!
//! Describes the resource kinds kubewatch knows how to watch.
//!
//! Kinds come from two places:
//! - API discovery at start-up (`ResourceDescriptor::from_discovery`)
//! - A compile-time table of typed adapters (`KindRegistry::builtin`), which
//!   gives well-known kinds struct semantics during field-path completion

pub mod adapter;
pub mod builtin;
pub mod descriptor;
pub mod error;
pub mod registry;

pub use adapter::*;
pub use descriptor::*;
pub use error::*;
pub use registry::*;

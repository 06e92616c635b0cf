//! Generic field access over structured values.
//!
//! Object schemas are not known at compile time, so completion and prefix
//! lookups walk objects through the `FieldAccess` capability instead of
//! per-kind code. Two shapes are supported:
//!
//! - `Shape::Map`: untyped containers (`DynamicObject`, raw JSON). Objects
//!   expose every key.
//! - `Shape::Struct`: values produced from a typed struct. Objects expose
//!   fields in declaration order and hide zero-valued ones, so completion
//!   only offers fields that lead somewhere. Map-typed fields of those
//!   structs (`labels`, `data`, ...) are `Shape::Map` again.

use kinds::ResourceDescriptor;
use kube::core::DynamicObject;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fields that are free-form maps in the typed API structs.
pub const MAP_FIELDS: &[&str] = &[
    "allocatable",
    "annotations",
    "binaryData",
    "capacity",
    "data",
    "labels",
    "limits",
    "matchLabels",
    "nodeSelector",
    "overhead",
    "requests",
    "stringData",
];

/// Capability to enumerate and fetch child fields.
pub trait FieldAccess {
    /// Identifiers of the child fields at this level. Empty for scalars.
    fn list_fields(&self) -> Vec<String>;

    /// Child field by identifier, `None` when absent or not addressable.
    fn get_field(&self, id: &str) -> Option<Node>;
}

/// Object semantics of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Declared fields; zero values are treated as absent
    Struct,
    /// Free-form keys
    Map,
}

/// A structured value together with its object semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    value: Value,
    shape: Shape,
}

impl Node {
    /// Untyped node
    pub fn dynamic(value: Value) -> Self {
        Self {
            value,
            shape: Shape::Map,
        }
    }

    /// Node with struct semantics, built from a serializable typed value
    pub fn typed<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::structured(serde_json::to_value(value)?))
    }

    /// Node with struct semantics over an already-serialized typed value
    pub fn structured(value: Value) -> Self {
        Self {
            value,
            shape: Shape::Struct,
        }
    }

    /// Node for an instance of `descriptor`: typed when the kind has an
    /// adapter, untyped otherwise.
    pub fn for_instance(
        descriptor: &ResourceDescriptor,
        obj: &DynamicObject,
    ) -> Result<Self, crate::WatchError> {
        match descriptor.adapter() {
            Some(adapter) => Ok(Self::structured(adapter.normalize(obj)?)),
            None => Ok(Self::dynamic(serde_json::to_value(obj)?)),
        }
    }

    /// Underlying value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Object semantics
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Scalar string value, if this node holds one
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    fn child(&self, value: &Value) -> Node {
        Node {
            value: value.clone(),
            shape: self.shape,
        }
    }

    fn field(&self, name: &str, value: &Value) -> Node {
        let shape = match self.shape {
            Shape::Struct if MAP_FIELDS.contains(&name) => Shape::Map,
            shape => shape,
        };
        Node {
            value: value.clone(),
            shape,
        }
    }
}

/// True for the zero value of each JSON type.
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn list_value_fields(value: &Value, shape: Shape) -> Vec<String> {
    match value {
        Value::Object(map) => match shape {
            Shape::Struct => map
                .iter()
                .filter(|(_, v)| !is_zero(v))
                .map(|(k, _)| k.clone())
                .collect(),
            Shape::Map => map.keys().cloned().collect(),
        },
        // Scalar elements have nothing to complete into.
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, item)| !list_value_fields(item, shape).is_empty())
            .map(|(i, _)| i.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

impl FieldAccess for Node {
    fn list_fields(&self) -> Vec<String> {
        list_value_fields(&self.value, self.shape)
    }

    fn get_field(&self, id: &str) -> Option<Node> {
        match &self.value {
            Value::Array(items) => match id.parse::<usize>() {
                Ok(index) => items.get(index).map(|item| self.child(item)),
                Err(_) => {
                    debug!(field = id, "sequence index is not a non-negative integer");
                    None
                }
            },
            Value::Object(map) => {
                let field = map.get(id)?;
                match self.shape {
                    Shape::Struct if is_zero(field) => None,
                    _ => Some(self.field(id, field)),
                }
            }
            other => {
                warn!(kind = value_kind(other), field = id, "field access not supported");
                None
            }
        }
    }
}

impl FieldAccess for DynamicObject {
    fn list_fields(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(value) => Node::dynamic(value).list_fields(),
            Err(e) => {
                warn!(error = %e, "failed to serialize object for field access");
                Vec::new()
            }
        }
    }

    fn get_field(&self, id: &str) -> Option<Node> {
        match serde_json::to_value(self) {
            Ok(value) => Node::dynamic(value).get_field(id),
            Err(e) => {
                warn!(error = %e, "failed to serialize object for field access");
                None
            }
        }
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for &T {
    fn list_fields(&self) -> Vec<String> {
        (**self).list_fields()
    }

    fn get_field(&self, id: &str) -> Option<Node> {
        (**self).get_field(id)
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for Arc<T> {
    fn list_fields(&self) -> Vec<String> {
        (**self).list_fields()
    }

    fn get_field(&self, id: &str) -> Option<Node> {
        (**self).get_field(id)
    }
}

/// Every complete leaf path under `value`, depth first, segments joined with
/// `separator`.
pub fn list_object_fields<A: FieldAccess + ?Sized>(value: &A, separator: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for field in value.list_fields() {
        let children = value
            .get_field(&field)
            .map(|child| list_object_fields(&child, separator))
            .unwrap_or_default();
        if children.is_empty() {
            paths.push(field);
        } else {
            paths.extend(
                children
                    .into_iter()
                    .map(|child| format!("{field}{separator}{child}")),
            );
        }
    }
    paths
}

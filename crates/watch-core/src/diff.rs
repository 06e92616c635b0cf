//! Structural diff between two snapshots
//!
//! Snapshots are compared as JSON values. Objects are compared key by key,
//! sequences either index by index or as multisets, and everything else by
//! equality. Containers that appear or disappear are expanded to their
//! leaves so every entry points at a single value.

use serde_json::{Map, Value};
use std::fmt;

/// Kind of a single change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Field appeared
    Create,
    /// Field value changed
    Update,
    /// Field disappeared
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One difference between two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Field path from the root, one segment per level
    pub path: Vec<String>,
    pub kind: ChangeKind,
    /// Value before, `None` when the field did not exist
    pub from: Option<Value>,
    /// Value after, `None` when the field no longer exists
    pub to: Option<Value>,
}

/// Diffs `old` against `new`.
///
/// With `slice_ordering` sequences are compared index by index, so a pure
/// reordering shows up as updates. Without it, equal elements are matched
/// regardless of position and only the leftovers are reported: leftover
/// pairs are diffed against each other in order, the rest become creates or
/// deletes.
pub fn diff(old: &Value, new: &Value, slice_ordering: bool) -> Vec<Change> {
    let mut differ = Differ {
        slice_ordering,
        path: Vec::new(),
        changes: Vec::new(),
    };
    differ.compare(Some(old), Some(new));
    differ.changes
}

struct Differ {
    slice_ordering: bool,
    path: Vec<String>,
    changes: Vec<Change>,
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn is_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

impl Differ {
    fn compare(&mut self, old: Option<&Value>, new: Option<&Value>) {
        match (present(old), present(new)) {
            (None, None) => {}
            (None, Some(new)) => self.expand(new, ChangeKind::Create),
            (Some(old), None) => self.expand(old, ChangeKind::Delete),
            (Some(old), Some(new)) if old == new => {}
            (Some(Value::Object(old)), Some(Value::Object(new))) => self.compare_maps(old, new),
            (Some(Value::Array(old)), Some(Value::Array(new))) => {
                if self.slice_ordering {
                    self.compare_ordered(old, new)
                } else {
                    self.compare_unordered(old, new)
                }
            }
            (Some(old), Some(new)) => self.push(ChangeKind::Update, Some(old), Some(new)),
        }
    }

    fn compare_maps(&mut self, old: &Map<String, Value>, new: &Map<String, Value>) {
        for (key, old_value) in old {
            self.path.push(key.clone());
            self.compare(Some(old_value), new.get(key));
            self.path.pop();
        }
        for (key, new_value) in new.iter().filter(|(k, _)| !old.contains_key(*k)) {
            self.path.push(key.clone());
            self.compare(None, Some(new_value));
            self.path.pop();
        }
    }

    fn compare_ordered(&mut self, old: &[Value], new: &[Value]) {
        for i in 0..old.len().max(new.len()) {
            self.path.push(i.to_string());
            self.compare(old.get(i), new.get(i));
            self.path.pop();
        }
    }

    fn compare_unordered(&mut self, old: &[Value], new: &[Value]) {
        let mut matched = vec![false; new.len()];
        let mut removed = Vec::new();
        for (i, item) in old.iter().enumerate() {
            let hit = new
                .iter()
                .enumerate()
                .position(|(j, candidate)| !matched[j] && candidate == item);
            match hit {
                Some(j) => matched[j] = true,
                None => removed.push(i),
            }
        }
        let mut added = matched
            .iter()
            .enumerate()
            .filter(|(_, m)| !**m)
            .map(|(j, _)| j);

        for i in removed {
            match added.next() {
                Some(j) => {
                    self.path.push(j.to_string());
                    self.compare(Some(&old[i]), Some(&new[j]));
                    self.path.pop();
                }
                None => {
                    self.path.push(i.to_string());
                    self.compare(Some(&old[i]), None);
                    self.path.pop();
                }
            }
        }
        for j in added {
            self.path.push(j.to_string());
            self.compare(None, Some(&new[j]));
            self.path.pop();
        }
    }

    fn expand(&mut self, value: &Value, kind: ChangeKind) {
        if !is_container(value) {
            match kind {
                ChangeKind::Create => self.push(kind, None, Some(value)),
                _ => self.push(kind, Some(value), None),
            }
            return;
        }
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.path.push(key.clone());
                    self.expand_child(child, kind);
                    self.path.pop();
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.path.push(i.to_string());
                    self.expand_child(child, kind);
                    self.path.pop();
                }
            }
            _ => {}
        }
    }

    fn expand_child(&mut self, child: &Value, kind: ChangeKind) {
        if !child.is_null() {
            self.expand(child, kind);
        }
    }

    fn push(&mut self, kind: ChangeKind, from: Option<&Value>, to: Option<&Value>) {
        self.changes.push(Change {
            path: self.path.clone(),
            kind,
            from: from.cloned(),
            to: to.cloned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(changes: &[Change]) -> Vec<String> {
        changes.iter().map(|c| c.path.join(",")).collect()
    }

    #[test]
    fn test_equal_snapshots_have_no_changes() {
        let v = json!({ "spec": { "replicas": 3, "ports": [80, 443] } });
        assert!(diff(&v, &v, true).is_empty());
        assert!(diff(&v, &v, false).is_empty());
    }

    #[test]
    fn test_scalar_update() {
        let changes = diff(&json!({ "replicas": 3 }), &json!({ "replicas": 5 }), true);
        assert_eq!(
            changes,
            vec![Change {
                path: vec!["replicas".to_string()],
                kind: ChangeKind::Update,
                from: Some(json!(3)),
                to: Some(json!(5)),
            }]
        );
    }

    #[test]
    fn test_created_and_deleted_fields() {
        let changes = diff(
            &json!({ "a": 1, "gone": "x" }),
            &json!({ "a": 1, "added": true }),
            true,
        );
        assert_eq!(paths(&changes), vec!["gone", "added"]);
        assert_eq!(changes[0].kind, ChangeKind::Delete);
        assert_eq!(changes[0].to, None);
        assert_eq!(changes[1].kind, ChangeKind::Create);
        assert_eq!(changes[1].from, None);
    }

    #[test]
    fn test_null_is_absent() {
        let changes = diff(&json!({ "a": null }), &json!({ "a": 2 }), true);
        assert_eq!(changes[0].kind, ChangeKind::Create);
        assert!(diff(&json!({ "a": null }), &json!({}), true).is_empty());
    }

    #[test]
    fn test_new_container_expands_to_leaves() {
        let changes = diff(
            &json!({}),
            &json!({ "labels": { "app": "web", "tier": "front" } }),
            true,
        );
        assert_eq!(paths(&changes), vec!["labels,app", "labels,tier"]);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Create));
    }

    #[test]
    fn test_type_change_is_update() {
        let changes = diff(&json!({ "a": { "b": 1 } }), &json!({ "a": "flat" }), true);
        assert_eq!(paths(&changes), vec!["a"]);
        assert_eq!(changes[0].kind, ChangeKind::Update);
    }

    #[test]
    fn test_ordered_reorder_reports_updates() {
        let changes = diff(&json!({ "l": [1, 2] }), &json!({ "l": [2, 1] }), true);
        assert_eq!(paths(&changes), vec!["l,0", "l,1"]);
    }

    #[test]
    fn test_unordered_reorder_is_silent() {
        assert!(diff(&json!({ "l": [1, 2] }), &json!({ "l": [2, 1] }), false).is_empty());
    }

    #[test]
    fn test_unordered_added_element() {
        let changes = diff(&json!({ "l": ["a"] }), &json!({ "l": ["b", "a"] }), false);
        assert_eq!(paths(&changes), vec!["l,0"]);
        assert_eq!(changes[0].kind, ChangeKind::Create);
        assert_eq!(changes[0].to, Some(json!("b")));
    }

    #[test]
    fn test_unordered_pairs_leftovers() {
        let old = json!({ "c": [{ "name": "app", "image": "v1" }, { "name": "side" }] });
        let new = json!({ "c": [{ "name": "side" }, { "name": "app", "image": "v2" }] });
        let changes = diff(&old, &new, false);
        assert_eq!(paths(&changes), vec!["c,1,image"]);
        assert_eq!(changes[0].from, Some(json!("v1")));
        assert_eq!(changes[0].to, Some(json!("v2")));
    }

    #[test]
    fn test_shrinking_sequence() {
        let changes = diff(&json!([1, 2, 3]), &json!([1]), true);
        assert_eq!(paths(&changes), vec!["1", "2"]);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Delete));
    }

    #[test]
    fn test_change_kind_display() {
        assert_eq!(ChangeKind::Create.to_string(), "create");
        assert_eq!(ChangeKind::Update.to_string(), "update");
        assert_eq!(ChangeKind::Delete.to_string(), "delete");
    }
}

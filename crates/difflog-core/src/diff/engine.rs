//! Structural diff computation engine.
//!
//! [`compute_changes`] walks two snapshots in lockstep and emits one
//! [`Change`] per differing leaf path. [`compute_diff`] folds that list
//! into the added/deleted/updated partition trees.

use crate::diff::model::{Change, StructuralDiff};
use crate::diff::path::ChangePath;
use crate::snapshot::Snapshot;
use serde_json::{Map, Value};

/// Compute the leaf-level changes from `before` to `after`.
///
/// Rules, applied recursively from the root:
///
/// - equal values produce nothing
/// - two objects are compared key by key, two arrays index by index
/// - a key/index only in `after` is `Added` with its whole value
/// - a key/index only in `before` is `Deleted`
/// - anything else (scalar change, or a change of shape such as
///   object -> array or scalar -> object) is `Updated` with the new value
///
/// Each leaf path appears at most once, so the partitions are disjoint.
/// The result is ordered by path.
pub fn compute_changes(before: &Snapshot, after: &Snapshot) -> Vec<Change> {
    let mut out = Vec::new();
    walk_objects(before.as_map(), after.as_map(), &ChangePath::root(), &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

/// Compute the partition trees from `before` to `after`.
///
/// # Example
///
/// ```
/// use difflog_core::diff::compute_diff;
/// use difflog_core::snapshot::normalize;
/// use serde_json::json;
///
/// let before = normalize(&json!({"count": 1})).unwrap();
/// let after = normalize(&json!({"count": 2, "label": "a"})).unwrap();
/// let diff = compute_diff(&before, &after);
///
/// assert_eq!(diff.added.get("label"), Some(&json!("a")));
/// assert_eq!(diff.updated.get("count"), Some(&json!(2)));
/// assert!(diff.deleted.is_empty());
/// ```
pub fn compute_diff(before: &Snapshot, after: &Snapshot) -> StructuralDiff {
    StructuralDiff::from_changes(&compute_changes(before, after))
}

fn walk(lhs: &Value, rhs: &Value, path: &ChangePath, out: &mut Vec<Change>) {
    if lhs == rhs {
        return;
    }
    match (lhs, rhs) {
        (Value::Object(l), Value::Object(r)) => walk_objects(l, r, path, out),
        (Value::Array(l), Value::Array(r)) => walk_arrays(l, r, path, out),
        _ => out.push(Change::updated(path.clone(), rhs.clone())),
    }
}

fn walk_objects(
    lhs: &Map<String, Value>,
    rhs: &Map<String, Value>,
    path: &ChangePath,
    out: &mut Vec<Change>,
) {
    for (key, l_child) in lhs {
        let child_path = path.child(key.as_str());
        match rhs.get(key) {
            Some(r_child) => walk(l_child, r_child, &child_path, out),
            None => out.push(Change::deleted(child_path)),
        }
    }
    for (key, r_child) in rhs {
        if !lhs.contains_key(key) {
            out.push(Change::added(path.child(key.as_str()), r_child.clone()));
        }
    }
}

fn walk_arrays(lhs: &[Value], rhs: &[Value], path: &ChangePath, out: &mut Vec<Change>) {
    for index in 0..lhs.len().max(rhs.len()) {
        let child_path = path.child(index.to_string());
        match (lhs.get(index), rhs.get(index)) {
            (Some(l_child), Some(r_child)) => walk(l_child, r_child, &child_path, out),
            (Some(_), None) => out.push(Change::deleted(child_path)),
            (None, Some(r_child)) => out.push(Change::added(child_path, r_child.clone())),
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::ChangeKind;
    use crate::snapshot::normalize;
    use serde_json::json;

    fn snap(value: Value) -> Snapshot {
        normalize(&value).unwrap()
    }

    #[test]
    fn test_identical_snapshots_have_no_changes() {
        let a = snap(json!({"a": [1, {"b": null}]}));
        assert!(compute_changes(&a, &a).is_empty());
    }

    #[test]
    fn test_nested_object_partitions() {
        let before = snap(json!({"cfg": {"keep": 1, "drop": 2, "edit": 3}}));
        let after = snap(json!({"cfg": {"keep": 1, "edit": 4, "new": 5}}));
        let diff = compute_diff(&before, &after);

        assert_eq!(Value::Object(diff.added), json!({"cfg": {"new": 5}}));
        assert_eq!(Value::Object(diff.deleted), json!({"cfg": {"drop": null}}));
        assert_eq!(Value::Object(diff.updated), json!({"cfg": {"edit": 4}}));
    }

    #[test]
    fn test_arrays_diff_by_index() {
        let before = snap(json!({"xs": [1, 2, 3]}));
        let after = snap(json!({"xs": [1, 9]}));
        let diff = compute_diff(&before, &after);

        assert_eq!(Value::Object(diff.updated), json!({"xs": {"1": 9}}));
        assert_eq!(Value::Object(diff.deleted), json!({"xs": {"2": null}}));
        assert!(diff.added.is_empty());
    }

    #[test]
    fn test_shape_change_is_update() {
        let before = snap(json!({"v": {"a": 1}, "w": [1]}));
        let after = snap(json!({"v": 5, "w": {"0": 1}}));
        let changes = compute_changes(&before, &after);

        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Updated));
        assert_eq!(changes[0].path.to_string(), "/v");
        assert_eq!(changes[0].value, Some(json!(5)));
    }

    #[test]
    fn test_container_emptied_reports_deleted_leaves_only() {
        let before = snap(json!({"tags": {"a": 1, "b": 2}}));
        let after = snap(json!({"tags": {}}));
        let diff = compute_diff(&before, &after);

        assert_eq!(
            Value::Object(diff.deleted),
            json!({"tags": {"a": null, "b": null}})
        );
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn test_changes_sorted_by_path() {
        let before = snap(json!({}));
        let after = snap(json!({"b": 1, "a": 1, "c": 1}));
        let paths: Vec<String> = compute_changes(&before, &after)
            .iter()
            .map(|c| c.path.to_string())
            .collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
    }
}

//! Structural diff output types.
//!
//! Trees use `serde_json::Map` keyed by object key or sequence index, so a
//! diff serializes to the same nested shape as the snapshots it compares.

use crate::diff::path::ChangePath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which partition a leaf change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present after, absent before
    Added,
    /// Present before, absent after
    Deleted,
    /// Present on both sides with a different value or shape
    Updated,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Updated => "updated",
        }
    }
}

/// One leaf-level difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: ChangePath,
    /// New value for `Added`/`Updated`; `None` for `Deleted`
    pub value: Option<Value>,
}

impl Change {
    pub fn added(path: ChangePath, value: Value) -> Self {
        Self {
            kind: ChangeKind::Added,
            path,
            value: Some(value),
        }
    }

    pub fn deleted(path: ChangePath) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            path,
            value: None,
        }
    }

    pub fn updated(path: ChangePath, value: Value) -> Self {
        Self {
            kind: ChangeKind::Updated,
            path,
            value: Some(value),
        }
    }
}

/// The three partition trees of a diff.
///
/// Deleted leaves hold `null`. A key reached only through nested changes
/// holds a sub-tree containing just those changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralDiff {
    pub added: Map<String, Value>,
    pub deleted: Map<String, Value>,
    pub updated: Map<String, Value>,
}

impl StructuralDiff {
    /// Build the partition trees from a leaf change list.
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut diff = Self::default();
        for change in changes {
            let tree = match change.kind {
                ChangeKind::Added => &mut diff.added,
                ChangeKind::Deleted => &mut diff.deleted,
                ChangeKind::Updated => &mut diff.updated,
            };
            insert_at(
                tree,
                change.path.segments(),
                change.value.clone().unwrap_or(Value::Null),
            );
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }
}

/// Insert `value` at `segments`, creating intermediate objects as needed.
fn insert_at(tree: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut node = tree;
    for segment in parents {
        let slot = node
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Some(map) = slot.as_object_mut() else {
            return;
        };
        node = map;
    }
    node.insert(last.clone(), value);
}

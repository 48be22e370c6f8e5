//! One generation of the history log.

use crate::diff::{compute_changes, render_human_summary, Change, StructuralDiff};
use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The recorded difference between two consecutive snapshots.
///
/// Serializes as `{added, deleted, updated, before, after, asof}`.
/// Records handed out by the log are copies; editing one never affects
/// the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Paths present after but not before, with their new values
    pub added: Map<String, Value>,
    /// Paths present before but not after (leaves hold `null`)
    pub deleted: Map<String, Value>,
    /// Paths present on both sides whose value changed, with the new value
    pub updated: Map<String, Value>,
    /// Full previous snapshot
    pub before: Snapshot,
    /// Full new snapshot
    pub after: Snapshot,
    /// When the record was created
    pub asof: DateTime<Utc>,
}

impl DiffRecord {
    /// Diff `before` against `after` and stamp the result.
    pub fn new(before: Snapshot, after: Snapshot, asof: DateTime<Utc>) -> Self {
        let StructuralDiff {
            added,
            deleted,
            updated,
        } = StructuralDiff::from_changes(&compute_changes(&before, &after));
        Self {
            added,
            deleted,
            updated,
            before,
            after,
            asof,
        }
    }

    /// Leaf-level changes of this generation, ordered by path
    pub fn changes(&self) -> Vec<Change> {
        compute_changes(&self.before, &self.after)
    }

    /// True when the push repeated the previous snapshot
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }

    /// Markdown summary headed by the record's timestamp
    pub fn summary(&self) -> String {
        format!(
            "_asof {}_\n\n{}",
            self.asof.to_rfc3339(),
            render_human_summary(&self.changes())
        )
    }
}

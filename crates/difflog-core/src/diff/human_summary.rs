//! Human-readable summary renderer for structural diffs.

use crate::diff::model::{Change, ChangeKind};
use serde_json::Value;

/// Longest rendered value before it is shortened with an ellipsis.
const MAX_VALUE_CHARS: usize = 60;

/// Render a Markdown summary of a change list.
///
/// Sections appear in the fixed order added, updated, deleted and list
/// the JSON pointer of every leaf change. Output is deterministic for a
/// given change list. It is informational only.
pub fn render_human_summary(changes: &[Change]) -> String {
    let mut out = String::new();
    out.push_str("## Generation Diff\n\n");

    if changes.is_empty() {
        out.push_str("_No changes._\n");
        return out;
    }

    let count = |kind: ChangeKind| changes.iter().filter(|c| c.kind == kind).count();
    out.push_str(&format!(
        "**Changes**: {} ({} added, {} updated, {} deleted)\n\n",
        changes.len(),
        count(ChangeKind::Added),
        count(ChangeKind::Updated),
        count(ChangeKind::Deleted),
    ));

    for (kind, heading) in [
        (ChangeKind::Added, "Added"),
        (ChangeKind::Updated, "Updated"),
        (ChangeKind::Deleted, "Deleted"),
    ] {
        let section: Vec<&Change> = changes.iter().filter(|c| c.kind == kind).collect();
        if section.is_empty() {
            continue;
        }
        out.push_str(&format!("### {heading}\n\n"));
        for change in section {
            match (&change.kind, &change.value) {
                (ChangeKind::Deleted, _) | (_, None) => {
                    out.push_str(&format!("- `{}`\n", change.path));
                }
                (ChangeKind::Added, Some(value)) => {
                    out.push_str(&format!("- `{}`: `{}`\n", change.path, short(value)));
                }
                (ChangeKind::Updated, Some(value)) => {
                    out.push_str(&format!("- `{}` → `{}`\n", change.path, short(value)));
                }
            }
        }
        out.push('\n');
    }

    out
}

fn short(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= MAX_VALUE_CHARS {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(MAX_VALUE_CHARS - 1).collect();
    truncated.push('…');
    truncated
}

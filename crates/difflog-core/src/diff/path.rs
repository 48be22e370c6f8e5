//! Leaf paths inside a snapshot, rendered as RFC 6901 JSON pointers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered key/index segments from the snapshot root to a value.
///
/// Sequence indices are stored as their decimal string form, the same key
/// the diff trees use for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangePath(Vec<String>);

impl ChangePath {
    /// The root path (empty pointer)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path extended by one segment
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// First segment, i.e. the top-level snapshot key this path lives under
    pub fn top_level_key(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl fmt::Display for ChangePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{}", escape_segment(segment))?;
        }
        Ok(())
    }
}

/// Escape one pointer segment (`~` -> `~0`, `/` -> `~1`).
pub fn escape_segment(segment: &str) -> String {
    if !segment.contains('/') && !segment.contains('~') {
        return segment.to_string();
    }
    segment.replace('~', "~0").replace('/', "~1")
}

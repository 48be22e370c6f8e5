//! Canonical normalization of structured values into snapshots.

use crate::diff::path::ChangePath;
use crate::errors::{DiffLogError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Deepest container nesting a snapshot may have.
///
/// Normalizing, diffing and building partition trees all recurse once per
/// level, so this bounds their stack use. Values built in memory may nest
/// past serde_json's 128-level parse limit; only `canonical_json` text of
/// such a snapshot cannot be parsed back by a default `serde_json` reader.
pub const MAX_DEPTH: usize = 512;

/// A normalized, serialization-safe point-in-time copy of a value.
///
/// The root is always a JSON object. Snapshots are only produced by
/// [`normalize`] or deserialization, and are never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    /// The empty mapping, used as the "previous" side of the first push
    pub fn empty() -> Self {
        Self(Map::new())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The snapshot as a generic JSON value (a copy)
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Canonical compact JSON encoding.
    ///
    /// Structurally equal snapshots always encode to the same string.
    ///
    /// # Errors
    ///
    /// Returns `DiffLogError::Serialization` if encoding fails.
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

/// Normalize any serializable value into a [`Snapshot`].
///
/// The value is serialized into an owned `serde_json::Value`, which reduces
/// exotic shapes (dates, newtypes, enums) to their serialized form, then
/// every mapping is rewritten with its keys in ascending lexicographic
/// order.
///
/// # Errors
///
/// - `Serialization` - the serializer rejected the value (e.g. a map with
///   non-string keys)
/// - `DepthLimitExceeded` - the value nests deeper than [`MAX_DEPTH`]
/// - `NonObjectRoot` - the value does not serialize to a JSON object
///
/// # Example
///
/// ```
/// use difflog_core::snapshot::normalize;
/// use serde_json::json;
///
/// let a = normalize(&json!({"b": 2, "a": 1})).unwrap();
/// let b = normalize(&json!({"a": 1, "b": 2})).unwrap();
/// assert_eq!(a.canonical_json().unwrap(), b.canonical_json().unwrap());
/// ```
pub fn normalize<T: Serialize + ?Sized>(value: &T) -> Result<Snapshot> {
    let raw = serde_json::to_value(value)?;
    let sorted = sort_keys(raw, &ChangePath::root())?;

    match sorted {
        Value::Object(map) => Ok(Snapshot(map)),
        other => Err(DiffLogError::NonObjectRoot {
            found: kind_name(&other).to_string(),
        }),
    }
}

/// Recursively rebuild every object with sorted keys, enforcing the depth limit.
fn sort_keys(value: Value, path: &ChangePath) -> Result<Value> {
    let depth = path.depth() + 1;
    match value {
        Value::Object(map) => {
            check_depth(depth, path)?;
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let mut sorted = Map::new();
            for (key, child) in entries {
                let child = sort_keys(child, &path.child(key.as_str()))?;
                sorted.insert(key, child);
            }
            Ok(Value::Object(sorted))
        }
        Value::Array(items) => {
            check_depth(depth, path)?;
            items
                .into_iter()
                .enumerate()
                .map(|(index, child)| sort_keys(child, &path.child(index.to_string())))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        scalar => Ok(scalar),
    }
}

fn check_depth(depth: usize, path: &ChangePath) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(DiffLogError::DepthLimitExceeded {
            limit: MAX_DEPTH,
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Short JSON type name used in error messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! History log configuration.

use serde::{Deserialize, Serialize};

/// Default number of publish cycles one history log may run.
pub const DEFAULT_PUBLISH_LIMIT: u64 = 100_000;

/// Tunables for a [`HistoryLog`](crate::history::HistoryLog).
///
/// Every field has a default, so hosts can embed this in their own TOML or
/// JSON configuration and only override what they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Publish cycles allowed before the log refuses further pushes.
    ///
    /// Guards against a subscriber that pushes from inside its own
    /// callback and would otherwise recurse without bound.
    pub publish_limit: u64,
}

impl HistoryConfig {
    pub fn with_publish_limit(mut self, publish_limit: u64) -> Self {
        self.publish_limit = publish_limit;
        self
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            publish_limit: DEFAULT_PUBLISH_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        assert_eq!(HistoryConfig::default().publish_limit, 100_000);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: HistoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HistoryConfig::default());

        let config: HistoryConfig = serde_json::from_str(r#"{"publish_limit": 10}"#).unwrap();
        assert_eq!(config.publish_limit, 10);
    }
}

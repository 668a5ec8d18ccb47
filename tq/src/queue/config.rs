//! Queue configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Max simultaneously running tasks (values below 1 are raised to 1)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Minimum gap between task starts, in milliseconds (0 disables throttling)
    #[serde(rename = "throttle-ms", default)]
    pub throttle_ms: u64,
}

fn default_concurrency() -> usize {
    1
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            throttle_ms: 0,
        }
    }
}

impl QueueConfig {
    /// Get the throttle interval as a Duration
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.throttle_ms, 0);
    }

    #[test]
    fn test_throttle_duration() {
        let config = QueueConfig {
            throttle_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.throttle(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: QueueConfig = serde_json::from_str(r#"{"concurrency": 4}"#).unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.throttle_ms, 0);
    }

    #[test]
    fn test_yaml_kebab_field() {
        let config: QueueConfig = serde_yaml::from_str("concurrency: 2\nthrottle-ms: 100\n").unwrap();
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.throttle(), Duration::from_millis(100));
    }
}

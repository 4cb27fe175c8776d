//! Front-desk configuration.

use serde::{Deserialize, Serialize};

/// Tunable front-desk parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeskConfig {
    /// How long a called ticket stays on the now-serving board before the
    /// countdown reads expired. The board does not auto-advance the queue
    /// at expiry.
    pub call_duration_secs: u32,
    /// Attempts to re-number a ticket after a queue-number collision before
    /// giving up.
    pub issuance_retries: u32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            call_duration_secs: 120,
            issuance_retries: 3,
        }
    }
}

impl DeskConfig {
    /// Parse from a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Call duration as a chrono duration for countdown math.
    pub fn call_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.call_duration_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeskConfig::default();
        assert_eq!(config.call_duration_secs, 120);
        assert_eq!(config.call_duration(), chrono::Duration::minutes(2));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = DeskConfig::from_json(r#"{"call_duration_secs": 90}"#).unwrap();
        assert_eq!(config.call_duration_secs, 90);
        assert_eq!(config.issuance_retries, 3);

        let empty = DeskConfig::from_json("{}").unwrap();
        assert_eq!(empty, DeskConfig::default());
    }
}

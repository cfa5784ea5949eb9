use serde::{Deserialize, Serialize};

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_EVENT_CAPACITY: u32 = 64;

/// Root configuration for the Ciska host.
///
/// Keys the host does not know about are kept in `extra` so that content
/// code can store its own settings in the same file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tracing filter directive, e.g. `debug` or `ciska_message=trace`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Buffer size of the host-to-content event channel.
    pub event_capacity: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_default() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let config: AppConfig =
            serde_json::from_value(json!({"event_capacity": 8, "recent": ["a", "b"]})).unwrap();
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.extra["recent"], json!(["a", "b"]));

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["recent"], json!(["a", "b"]));
        assert!(back.get("log_level").is_none());
    }
}

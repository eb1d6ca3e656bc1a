//! TOML file configuration structures.
//!
//! These structs directly map to the `waitline.toml` file format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;
use waitline_sdk::objects::tasks::TASKS_PATH;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Origin of the waiter panel (e.g., "https://panel.example.com").
    pub origin: Url,
    /// Path of the task summary endpoint.
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,
}

fn default_tasks_path() -> String {
    TASKS_PATH.to_string()
}

/// Where the waiter identity comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity assigned to this agent.
    #[serde(default)]
    pub waiter_id: Option<String>,
    /// File holding a previously persisted identity, used when
    /// `waiter_id` is not set.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
origin = "https://panel.example.com"
tasks_path = "/api/waiter/tasks/"

[identity]
waiter_id = "17"
state_file = "/var/lib/waitline/waiter_id"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.origin.as_str(), "https://panel.example.com/");
        assert_eq!(config.server.tasks_path, "/api/waiter/tasks/");
        assert_eq!(config.identity.waiter_id.as_deref(), Some("17"));
        assert_eq!(
            config.identity.state_file,
            Some(PathBuf::from("/var/lib/waitline/waiter_id"))
        );
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
[server]
origin = "http://localhost:8000"
"#,
        )
        .unwrap();
        assert_eq!(config.server.tasks_path, TASKS_PATH);
        assert!(config.identity.waiter_id.is_none());
        assert!(config.identity.state_file.is_none());
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let result: Result<FileConfig, _> = toml::from_str(
            r#"
[server]
origin = "not a url"
"#,
        );
        assert!(result.is_err());
    }
}

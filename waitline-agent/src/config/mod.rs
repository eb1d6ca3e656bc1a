//! Configuration module for waitline-agent.
//!
//! Handles loading configuration from the TOML file and applying CLI
//! overrides. The reconnect policy is fixed and not configurable here.

pub mod file;

use crate::config::file::{FileConfig, IdentityConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;
use waitline_sdk::endpoint::waiter_channel_url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Validated agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub origin: Url,
    pub tasks_path: String,
    pub identity: IdentityConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    origin_override: Option<Url>,
    identity_override: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        origin_override: Option<Url>,
        identity_override: Option<String>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            origin_override,
            identity_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<AgentConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_from_str(&config_content)
    }

    fn load_from_str(&self, config_content: &str) -> Result<AgentConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(config_content)?;

        // Apply CLI overrides
        if let Some(origin) = &self.origin_override {
            file_config.server.origin = origin.clone();
        }
        if let Some(identity) = &self.identity_override {
            file_config.identity.waiter_id = Some(identity.clone());
        }

        self.validate(&file_config)?;

        Ok(AgentConfig {
            origin: file_config.server.origin,
            tasks_path: file_config.server.tasks_path,
            identity: file_config.identity,
        })
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        // The origin must map onto a WebSocket address
        waiter_channel_url(&config.server.origin, "").map_err(|e| {
            ConfigError::ValidationError(format!("server.origin {}: {e}", config.server.origin))
        })?;

        if !config.server.tasks_path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "server.tasks_path must be absolute, got {:?}",
                config.server.tasks_path
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[server]
origin = "http://localhost:8000"

[identity]
waiter_id = "5"
"#;

    #[test]
    fn test_load_without_overrides() {
        let config = ConfigLoader::new("unused.toml", None, None)
            .load_from_str(CONFIG)
            .unwrap();
        assert_eq!(config.origin.as_str(), "http://localhost:8000/");
        assert_eq!(config.identity.waiter_id.as_deref(), Some("5"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let loader = ConfigLoader::new(
            "unused.toml",
            Some(Url::parse("https://panel.example.com").unwrap()),
            Some("99".to_string()),
        );
        let config = loader.load_from_str(CONFIG).unwrap();
        assert_eq!(config.origin.as_str(), "https://panel.example.com/");
        assert_eq!(config.identity.waiter_id.as_deref(), Some("99"));
    }

    #[test]
    fn test_unsupported_origin_scheme() {
        let err = ConfigLoader::new("unused.toml", None, None)
            .load_from_str(
                r#"
[server]
origin = "ftp://localhost"
"#,
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_relative_tasks_path() {
        let err = ConfigLoader::new("unused.toml", None, None)
            .load_from_str(
                r#"
[server]
origin = "http://localhost"
tasks_path = "waiter/api/tasks/"
"#,
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new("/nonexistent/waitline.toml", None, None)
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}

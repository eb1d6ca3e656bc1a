//! Waiter identity resolution.
//!
//! Resolution order: an explicitly assigned id (CLI or config), then the
//! contents of the state file, then the empty string.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};
use waitline_core::IdentityResolver;

use crate::config::file::IdentityConfig;

/// Resolves the identity from configuration and the persisted state file.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredIdentity {
    waiter_id: Option<String>,
    state_file: Option<PathBuf>,
}

impl From<&IdentityConfig> for ConfiguredIdentity {
    fn from(config: &IdentityConfig) -> Self {
        Self {
            waiter_id: config.waiter_id.clone(),
            state_file: config.state_file.clone(),
        }
    }
}

impl ConfiguredIdentity {
    fn from_state_file(&self) -> Option<String> {
        let path = self.state_file.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let id = contents.trim();
                (!id.is_empty()).then(|| id.to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No persisted waiter identity");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read waiter identity");
                None
            }
        }
    }
}

impl IdentityResolver for ConfiguredIdentity {
    fn resolve(&self) -> String {
        if let Some(id) = self.waiter_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            return id.to_string();
        }
        self.from_state_file().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("waitline-identity-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_explicit_id_wins() {
        let path = temp_path();
        std::fs::write(&path, "from-file").unwrap();

        let identity = ConfiguredIdentity::from(&IdentityConfig {
            waiter_id: Some("explicit".to_string()),
            state_file: Some(path.clone()),
        });
        assert_eq!(identity.resolve(), "explicit");

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_state_file_fallback() {
        let path = temp_path();
        std::fs::write(&path, "  23\n").unwrap();

        let identity = ConfiguredIdentity::from(&IdentityConfig {
            waiter_id: Some("   ".to_string()),
            state_file: Some(path.clone()),
        });
        assert_eq!(identity.resolve(), "23");

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_nothing_known_is_empty() {
        let identity = ConfiguredIdentity::from(&IdentityConfig {
            waiter_id: None,
            state_file: Some(temp_path()),
        });
        assert_eq!(identity.resolve(), "");
        assert_eq!(ConfiguredIdentity::default().resolve(), "");
    }
}

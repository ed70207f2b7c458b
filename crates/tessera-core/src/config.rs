//! Provider configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use tessera_auth::DEFAULT_RESOURCE;
use tessera_session::{SessionOptions, DEFAULT_AVATAR, DEFAULT_STORAGE_KEY};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the slot database file
    pub database_path: PathBuf,
    /// Base URL of the auth API
    pub api_base_url: String,
    /// Name of the user collection under the base URL
    pub users_resource: String,
    /// Per-request timeout for auth API calls
    pub request_timeout_secs: u64,
    /// Slot the logged-in user is mirrored under
    pub storage_key: String,
    /// Avatar applied to users that have none
    pub default_avatar: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("tessera.db"),
            api_base_url: "http://localhost:3000".to_string(),
            users_resource: DEFAULT_RESOURCE.to_string(),
            request_timeout_secs: 10,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_avatar: DEFAULT_AVATAR.to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        data_local_dir(|name| std::env::var(name).ok())
            .map(|d| d.join("Tessera"))
            .unwrap_or_else(|| PathBuf::from(".tessera"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::new(self.storage_key.clone(), self.default_avatar.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(CoreError::Config("storage_key cannot be empty".to_string()));
        }
        if self.default_avatar.trim().is_empty() {
            return Err(CoreError::Config(
                "default_avatar cannot be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

/// Per-user data directory from the environment.
fn data_local_dir(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    env("XDG_DATA_HOME")
        .or_else(|| env("LOCALAPPDATA"))
        .map(PathBuf::from)
        .or_else(|| env("HOME").map(|h| PathBuf::from(h).join(".local/share")))
        .filter(|dir| !dir.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("/tmp/tessera-test"));
        assert_eq!(
            config.database_path,
            PathBuf::from("/tmp/tessera-test/tessera.db")
        );
        assert_eq!(config.storage_key, "usuario");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());

        let options = config.session_options();
        assert_eq!(options.storage_key, "usuario");
        assert_eq!(options.default_avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"api_base_url": "https://api.example.com", "storage_key": "user"}"#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.storage_key, "user");
        assert_eq!(config.users_resource, DEFAULT_RESOURCE);
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        let base = Config::new(PathBuf::from("/tmp"));

        let config = Config {
            storage_key: " ".to_string(),
            ..base.clone()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = Config {
            default_avatar: String::new(),
            ..base.clone()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = Config {
            request_timeout_secs: 0,
            ..base
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_data_local_dir_lookup_order() {
        fn env(
            vars: &'static [(&'static str, &'static str)],
        ) -> impl Fn(&str) -> Option<String> {
            move |name: &str| {
                vars.iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| value.to_string())
            }
        }

        assert_eq!(
            data_local_dir(env(&[("XDG_DATA_HOME", "/xdg"), ("HOME", "/home/a")])),
            Some(PathBuf::from("/xdg"))
        );
        assert_eq!(
            data_local_dir(env(&[("LOCALAPPDATA", "C:/Local")])),
            Some(PathBuf::from("C:/Local"))
        );
        assert_eq!(
            data_local_dir(env(&[("HOME", "/home/a")])),
            Some(PathBuf::from("/home/a/.local/share"))
        );
        assert_eq!(data_local_dir(env(&[("XDG_DATA_HOME", "")])), None);
        assert_eq!(data_local_dir(env(&[])), None);
    }
}

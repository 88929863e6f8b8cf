//! Application configuration
//!
//! Read from an optional TOML file, then overridden by environment
//! variables. Every field has a default so a missing file is not an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;

/// Environment variable holding the mentor API key
pub const API_KEY_ENV: &str = "ARISE_LLM_API_KEY";
pub const API_URL_ENV: &str = "ARISE_LLM_API_URL";
pub const MODEL_ENV: &str = "ARISE_LLM_MODEL";
pub const DATA_DIR_ENV: &str = "ARISE_DATA_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub profile: ProfileConfig,
    pub mentor: MentorConfig,
}

/// Where the snapshot lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one file per storage key
    pub data_dir: PathBuf,
    /// Namespaced key the snapshot is written under
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".arise"),
            key: crate::persistence::SNAPSHOT_KEY.to_string(),
        }
    }
}

/// Profile used when no snapshot exists (or it is unreadable)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub default_name: String,
    pub default_age: u32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            default_name: "Srujan".into(),
            default_age: 20,
        }
    }
}

/// Settings for the mentor's LLM backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MentorConfig {
    /// Base URL of the completion API. The wire format is detected from it.
    pub api_url: String,
    pub model: String,
    /// Request timeout. A timed-out exchange yields the fallback reply.
    pub timeout_secs: u64,
    pub max_tokens: u32,
    /// Only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            model: "gemini-2.5-flash".into(),
            timeout_secs: 30,
            max_tokens: 2048,
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Load config from `path` (if given and present) and apply env overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override file values with `ARISE_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(API_URL_ENV) {
            self.mentor.api_url = url;
        }
        if let Some(model) = lookup(MODEL_ENV) {
            self.mentor.model = model;
        }
        self.mentor.api_key = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty());
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.key must not be empty".into()));
        }
        if self.profile.default_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "profile.default_name must not be empty".into(),
            ));
        }
        if self.profile.default_age == 0 {
            return Err(ConfigError::Invalid(
                "profile.default_age must be positive".into(),
            ));
        }
        if self.mentor.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "mentor.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.key, "arise_app_data_v1");
        assert_eq!(config.profile.default_name, "Srujan");
        assert_eq!(config.profile.default_age, 20);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [profile]
            default_name = "Mina"

            [mentor]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.profile.default_name, "Mina");
        assert_eq!(config.profile.default_age, 20);
        assert_eq!(config.mentor.timeout_secs, 5);
        assert_eq!(config.mentor.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env_with(|name| match name {
            API_KEY_ENV => Some("secret".into()),
            MODEL_ENV => Some("claude-3-haiku-20240307".into()),
            DATA_DIR_ENV => Some("/tmp/arise".into()),
            _ => None,
        });
        assert_eq!(config.mentor.api_key.as_deref(), Some("secret"));
        assert_eq!(config.mentor.model, "claude-3-haiku-20240307");
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/arise"));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_with(|name| (name == API_KEY_ENV).then(|| "  ".to_string()));
        assert!(config.mentor.api_key.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_age() {
        let mut config = AppConfig::default();
        config.profile.default_age = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.mentor.timeout_secs, 30);
    }
}

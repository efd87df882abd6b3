//! Runtime configuration for store sessions.
//!
//! # Responsibility
//! - Resolve database path, slot key and logging settings.
//! - Keep environment parsing out of the FFI and CLI entry points.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `log_dir` is always absolute.

use crate::logging::default_log_level;
use crate::storage::DEFAULT_STORAGE_KEY;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "STICKYNOTE_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "STICKYNOTE_STORAGE_KEY";
pub const ENV_LOG_LEVEL: &str = "STICKYNOTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STICKYNOTE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "stickynote.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "stickynote-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStorageKey,
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStorageKey => write!(f, "storage key cannot be empty"),
            Self::RelativeLogDir(path) => {
                write!(f, "log dir must be an absolute path, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings for one store session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: temp.join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl StoreConfig {
    /// Resolves configuration from process environment over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(key) = read(ENV_STORAGE_KEY) {
            config.storage_key = key;
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if !self.log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(self.log_dir.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_STORAGE_KEY};
    use crate::storage::DEFAULT_STORAGE_KEY;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(config.db_path.ends_with("stickynote.sqlite3"));
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn environment_overrides_and_blank_values_are_ignored() {
        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, " /data/notes.db "),
            (ENV_STORAGE_KEY, "   "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/notes.db"));
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let error = StoreConfig::from_lookup(lookup(&[(ENV_LOG_DIR, "logs")])).unwrap_err();
        assert_eq!(error, ConfigError::RelativeLogDir(PathBuf::from("logs")));
    }
}

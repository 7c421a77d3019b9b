//! Runtime configuration for binaries embedding the core.
//!
//! Values come from `FIRMBOOK_*` environment variables with build-mode
//! defaults. Lookup is injectable so tests never touch the process env.

use crate::logging::{LogLevel, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "FIRMBOOK_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "FIRMBOOK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "FIRMBOOK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "firmbook.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmbookConfig {
    /// SQLite database file, created on first open.
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    /// Absolute log directory; file logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for FirmbookConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: LogLevel::build_default(),
            log_dir: None,
        }
    }
}

impl FirmbookConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(db_path) = read(DB_PATH_VAR) {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = read(LOG_LEVEL_VAR) {
            config.log_level = level.parse()?;
        }
        config.log_dir = read(LOG_DIR_VAR).map(PathBuf::from);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{FirmbookConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use crate::logging::LogLevel;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = FirmbookConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, FirmbookConfig::default());
        assert_eq!(config.db_path, PathBuf::from("firmbook.sqlite3"));
    }

    #[test]
    fn env_values_override_defaults() {
        let config = FirmbookConfig::from_lookup(lookup(&[
            (DB_PATH_VAR, "/srv/firmbook/data.db"),
            (LOG_LEVEL_VAR, "WARN"),
            (LOG_DIR_VAR, " /var/log/firmbook "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/srv/firmbook/data.db"));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/firmbook")));
    }

    #[test]
    fn blank_values_are_ignored_and_bad_levels_fail() {
        let config = FirmbookConfig::from_lookup(lookup(&[(DB_PATH_VAR, "  ")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("firmbook.sqlite3"));

        assert!(FirmbookConfig::from_lookup(lookup(&[(LOG_LEVEL_VAR, "chatty")])).is_err());
    }
}

//! Configuration management for kidcheck.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "kidcheck";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "kiosk.db";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "KIDCHECK_";

/// PIN accepted until the team sets their own.
pub const DEFAULT_TEAM_PIN: &str = "1234";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `KIDCHECK_`)
/// 2. TOML config file at `~/.config/kidcheck/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Team access configuration.
    pub access: AccessConfig,
    /// Kiosk display configuration.
    pub kiosk: KioskConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/kidcheck/kiosk.db`
    pub database_path: Option<PathBuf>,
}

/// Team access gate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// PIN used when none has been stored on this device.
    pub default_pin: String,
    /// Require the gate to be unlocked for admin commands.
    pub require_unlock: bool,
}

/// Kiosk display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// How often `present --watch` re-reads the store, in milliseconds.
    pub refresh_interval_ms: u64,
    /// Maximum number of name search matches.
    pub search_limit: usize,
    /// Public URL encoded by the printed QR code.
    pub site_url: String,
}

/// Export configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory CSV exports are written to.
    /// Defaults to the current directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            default_pin: DEFAULT_TEAM_PIN.to_string(),
            require_unlock: true,
        }
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 2000,
            search_limit: crate::registry::NAME_SEARCH_LIMIT,
            site_url: "https://emmanuel-ee.github.io/coventrycelebkids/".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::load_with_env(&config_file, ENV_PREFIX)
    }

    /// Top-level TOML tables map onto the config sections; nested env keys
    /// are split on `__` (`KIDCHECK_KIOSK__SEARCH_LIMIT`).
    fn load_with_env(config_file: &Path, env_prefix: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(env_prefix).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.access.default_pin.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "default_pin must not be blank".to_string(),
            });
        }

        if self.kiosk.refresh_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "refresh_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.kiosk.search_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "search_limit must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the refresh interval as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.kiosk.refresh_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.access.default_pin, "1234");
        assert!(config.access.require_unlock);
        assert_eq!(config.kiosk.refresh_interval_ms, 2000);
        assert_eq!(config.kiosk.search_limit, 20);
        assert!(config.storage.database_path.is_none());
        assert!(config.export.output_dir.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_blank_default_pin() {
        let mut config = Config::default();
        config.access.default_pin = "   ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_pin"));
    }

    #[test]
    fn test_validate_zero_refresh_interval() {
        let mut config = Config::default();
        config.kiosk.refresh_interval_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("refresh_interval_ms"));
    }

    #[test]
    fn test_validate_zero_search_limit() {
        let mut config = Config::default();
        config.kiosk.search_limit = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("search_limit"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("kiosk.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/kiosk.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/kiosk.sqlite")
        );
    }

    #[test]
    fn test_export_dir_default_is_cwd() {
        let config = Config::default();
        assert_eq!(config.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_refresh_interval() {
        let config = Config::default();
        assert_eq!(config.refresh_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("kidcheck"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[kiosk]\nrefresh_interval_ms = 500\n\n[access]\ndefault_pin = \"9999\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.kiosk.refresh_interval_ms, 500);
        assert_eq!(config.access.default_pin, "9999");
        assert_eq!(config.kiosk.search_limit, 20);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[kiosk]\nrefresh_interval_ms = 0\n").unwrap();

        let result = Config::load_from(Some(path));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_load_from_toml_file_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndatabase_path = \"/tmp/kiosk-test.db\"\n\n\
             [access]\nrequire_unlock = false\n\n\
             [kiosk]\nsearch_limit = 5\nsite_url = \"https://example.org/kids\"\n\n\
             [export]\noutput_dir = \"/tmp/exports\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/kiosk-test.db")
        );
        assert!(!config.access.require_unlock);
        assert_eq!(config.kiosk.search_limit, 5);
        assert_eq!(config.kiosk.site_url, "https://example.org/kids");
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_env_overrides_file() {
        // A prefix no other test reads, so setting it cannot race them.
        const PREFIX: &str = "KIDCHECKTEST_ENV_OVERRIDE_";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[kiosk]\nsearch_limit = 5\nrefresh_interval_ms = 750\n").unwrap();

        std::env::set_var(format!("{PREFIX}KIOSK__SEARCH_LIMIT"), "7");
        let config = Config::load_with_env(&path, PREFIX);
        std::env::remove_var(format!("{PREFIX}KIOSK__SEARCH_LIMIT"));

        let config = config.unwrap();
        assert_eq!(config.kiosk.search_limit, 7);
        assert_eq!(config.kiosk.refresh_interval_ms, 750);
    }

    #[test]
    fn test_access_config_deserialize() {
        let json = r#"{"require_unlock": false}"#;
        let access: AccessConfig = serde_json::from_str(json).unwrap();
        assert!(!access.require_unlock);
        assert_eq!(access.default_pin, "1234");
    }
}

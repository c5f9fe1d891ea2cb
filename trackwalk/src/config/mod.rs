//! Configuration file handling.
//!
//! Settings live in an INI file at `<config dir>/trackwalk/config.ini`:
//!
//! ```ini
//! [viewer]
//! sync_quiet_ms = 500
//! search_radius_m = 50
//! follow = true
//! pitch = 10
//! stale_results = apply
//!
//! [imagery]
//! api_key = ...
//! endpoint = https://maps.googleapis.com/maps/api/streetview/metadata
//! timeout_secs = 10
//!
//! [logging]
//! level = info
//! directory = ~/.local/share/trackwalk/logs
//! ```
//!
//! A missing file yields defaults. CLI arguments override file values.

mod keys;

pub use keys::ConfigKey;

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::imagery::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_METADATA_ENDPOINT, DEFAULT_SEARCH_RADIUS_M};
use crate::sync::{StalePolicy, SyncConfig, DEFAULT_QUIET_PERIOD};
use crate::viewer::DEFAULT_PITCH;

/// Errors from reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// A setting has a value of the wrong type.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not a known setting.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// `[viewer]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSection {
    pub sync_quiet_ms: u64,
    pub search_radius_m: f64,
    pub follow: bool,
    pub pitch: f64,
    pub stale_results: StalePolicy,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            sync_quiet_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            follow: true,
            pitch: DEFAULT_PITCH,
            stale_results: StalePolicy::Apply,
        }
    }
}

/// `[imagery]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagerySection {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ImagerySection {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_LOOKUP_TIMEOUT.as_secs(),
        }
    }
}

impl ImagerySection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSection {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Directory for log files.
    pub directory: PathBuf,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: default_log_dir(),
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub viewer: ViewerSection,
    pub imagery: ImagerySection,
    pub logging: LoggingSection,
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trackwalk")
        .join("config.ini")
}

/// Default log directory.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trackwalk")
        .join("logs")
}

impl ConfigFile {
    /// Load from [`config_file_path`], falling back to defaults if absent.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => ConfigError::Parse {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section())).set(key.name(), value);
            }
        }
        ini.write_to_file(path).map_err(io_err)
    }

    /// Synchronizer settings from the `[viewer]` section.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            quiet_period: Duration::from_millis(self.viewer.sync_quiet_ms),
            search_radius_m: self.viewer.search_radius_m,
            follow: self.viewer.follow,
            pitch: self.viewer.pitch,
            stale_policy: self.viewer.stale_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_defaults_match_sync_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.sync_config(), SyncConfig::default());
        assert!(config.imagery.api_key.is_none());
        assert_eq!(config.imagery.timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.viewer.follow = false;
        config.viewer.sync_quiet_ms = 250;
        config.viewer.stale_results = StalePolicy::Discard;
        config.imagery.api_key = Some("secret".to_string());
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.sync_config().quiet_period, Duration::from_millis(250));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[viewer]\nsearch_radius_m = 75\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.viewer.search_radius_m, 75.0);
        assert!(config.viewer.follow);
    }

    #[test]
    fn test_load_invalid_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[viewer]\nfollow = sometimes\n").unwrap();

        let result = ConfigFile::load_from(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::UnknownKey("viewer.speed".to_string());
        assert!(err.to_string().contains("viewer.speed"));
    }
}

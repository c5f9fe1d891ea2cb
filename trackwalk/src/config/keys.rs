//! Typed configuration keys in `section.name` form.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile, ConfigResult};
use crate::sync::StalePolicy;

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ViewerSyncQuietMs,
    ViewerSearchRadiusM,
    ViewerFollow,
    ViewerPitch,
    ViewerStaleResults,
    ImageryApiKey,
    ImageryEndpoint,
    ImageryTimeoutSecs,
    LoggingLevel,
    LoggingDirectory,
}

const ALL_KEYS: [ConfigKey; 10] = [
    ConfigKey::ViewerSyncQuietMs,
    ConfigKey::ViewerSearchRadiusM,
    ConfigKey::ViewerFollow,
    ConfigKey::ViewerPitch,
    ConfigKey::ViewerStaleResults,
    ConfigKey::ImageryApiKey,
    ConfigKey::ImageryEndpoint,
    ConfigKey::ImageryTimeoutSecs,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
];

impl ConfigKey {
    /// Every known key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// INI section holding this key.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ViewerSyncQuietMs
            | ConfigKey::ViewerSearchRadiusM
            | ConfigKey::ViewerFollow
            | ConfigKey::ViewerPitch
            | ConfigKey::ViewerStaleResults => "viewer",
            ConfigKey::ImageryApiKey | ConfigKey::ImageryEndpoint | ConfigKey::ImageryTimeoutSecs => {
                "imagery"
            }
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    /// Key name within its section.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ViewerSyncQuietMs => "sync_quiet_ms",
            ConfigKey::ViewerSearchRadiusM => "search_radius_m",
            ConfigKey::ViewerFollow => "follow",
            ConfigKey::ViewerPitch => "pitch",
            ConfigKey::ViewerStaleResults => "stale_results",
            ConfigKey::ImageryApiKey => "api_key",
            ConfigKey::ImageryEndpoint => "endpoint",
            ConfigKey::ImageryTimeoutSecs => "timeout_secs",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Current value as a string (empty if unset).
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ViewerSyncQuietMs => config.viewer.sync_quiet_ms.to_string(),
            ConfigKey::ViewerSearchRadiusM => config.viewer.search_radius_m.to_string(),
            ConfigKey::ViewerFollow => config.viewer.follow.to_string(),
            ConfigKey::ViewerPitch => config.viewer.pitch.to_string(),
            ConfigKey::ViewerStaleResults => config.viewer.stale_results.to_string(),
            ConfigKey::ImageryApiKey => config.imagery.api_key.clone().unwrap_or_default(),
            ConfigKey::ImageryEndpoint => config.imagery.endpoint.clone(),
            ConfigKey::ImageryTimeoutSecs => config.imagery.timeout_secs.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
        }
    }

    /// Parse `value` and store it in `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        match self {
            ConfigKey::ViewerSyncQuietMs => config.viewer.sync_quiet_ms = self.parse(value)?,
            ConfigKey::ViewerSearchRadiusM => {
                let radius: f64 = self.parse(value)?;
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(self.invalid(value, "must be a positive number"));
                }
                config.viewer.search_radius_m = radius;
            }
            ConfigKey::ViewerFollow => config.viewer.follow = parse_bool(value).ok_or_else(|| {
                self.invalid(value, "expected true/false")
            })?,
            ConfigKey::ViewerPitch => config.viewer.pitch = self.parse(value)?,
            ConfigKey::ViewerStaleResults => {
                config.viewer.stale_results = value
                    .parse::<StalePolicy>()
                    .map_err(|reason| self.invalid(value, &reason))?
            }
            ConfigKey::ImageryApiKey => {
                config.imagery.api_key = (!value.is_empty()).then(|| value.to_string())
            }
            ConfigKey::ImageryEndpoint => {
                if value.is_empty() {
                    return Err(self.invalid(value, "endpoint cannot be empty"));
                }
                config.imagery.endpoint = value.to_string();
            }
            ConfigKey::ImageryTimeoutSecs => config.imagery.timeout_secs = self.parse(value)?,
            ConfigKey::LoggingLevel => config.logging.level = value.to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory = PathBuf::from(value),
        }
        Ok(())
    }

    fn parse<T>(&self, value: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        value
            .parse::<T>()
            .map_err(|e| self.invalid(value, &e.to_string()))
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.to_string() == s.trim())
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

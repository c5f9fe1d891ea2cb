//! Common utilities shared across CLI commands.

use trackwalk::config::ConfigFile;
use trackwalk::sync::SyncConfig;

use crate::error::CliError;

/// Resolve the imagery API key: CLI takes precedence, then config.
pub fn resolve_api_key(cli_api_key: Option<String>, config: &ConfigFile) -> Result<String, CliError> {
    cli_api_key
        .filter(|key| !key.trim().is_empty())
        .or_else(|| config.imagery.api_key.clone())
        .ok_or_else(|| {
            CliError::Config(
                "Street View lookups require an API key. \
                 Set imagery.api_key with 'trackwalk config set' or use --api-key"
                    .to_string(),
            )
        })
}

/// Resolve synchronizer settings from CLI flags and config.
pub fn resolve_sync_config(no_follow: bool, config: &ConfigFile) -> SyncConfig {
    let mut sync = config.sync_config();
    if no_follow {
        sync.follow = false;
    }
    sync
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_key_wins() {
        let mut config = ConfigFile::default();
        config.imagery.api_key = Some("from-config".to_string());

        let key = resolve_api_key(Some("from-cli".to_string()), &config).unwrap();
        assert_eq!(key, "from-cli");
    }

    #[test]
    fn test_falls_back_to_config_key() {
        let mut config = ConfigFile::default();
        config.imagery.api_key = Some("from-config".to_string());

        assert_eq!(resolve_api_key(None, &config).unwrap(), "from-config");
        assert_eq!(
            resolve_api_key(Some("  ".to_string()), &config).unwrap(),
            "from-config"
        );
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = resolve_api_key(None, &ConfigFile::default());
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_no_follow_overrides_config() {
        let config = ConfigFile::default();
        assert!(resolve_sync_config(false, &config).follow);
        assert!(!resolve_sync_config(true, &config).follow);
    }
}

// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{RawWatcherConfig, WatcherConfig};
use crate::errors::{Result, WatchError};

impl TryFrom<RawWatcherConfig> for WatcherConfig {
    type Error = WatchError;

    fn try_from(raw: RawWatcherConfig) -> std::result::Result<Self, Self::Error> {
        let config = WatcherConfig {
            base_path: raw.base_path,
            recursive: raw.recursive,
            poll_interval: Duration::from_millis(raw.poll_interval_ms),
            reference_advance: raw.reference_advance,
        };
        validate_config(&config)?;
        Ok(config)
    }
}

/// Check the invariants a watcher relies on.
///
/// Whether `base_path` actually exists is checked when the watcher is built,
/// not here, so a config can be parsed before the directory is created.
pub fn validate_config(cfg: &WatcherConfig) -> Result<()> {
    if cfg.base_path.as_os_str().is_empty() {
        return Err(WatchError::ConfigError(
            "base_path must not be empty".to_string(),
        ));
    }

    if cfg.poll_interval.is_zero() {
        return Err(WatchError::ConfigError(
            "poll_interval must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

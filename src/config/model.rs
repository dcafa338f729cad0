// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::ReferenceAdvance;

/// Default pause between two scans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Watcher configuration as read from TOML.
///
/// ```toml
/// base_path = "./data"
/// recursive = true
/// poll_interval_ms = 500
/// reference_advance = "cycle"
/// ```
///
/// Only `base_path` is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWatcherConfig {
    /// Root directory to scan.
    pub base_path: PathBuf,

    /// Descend into subdirectories (default `true`).
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// Pause between scans, in milliseconds (default 500).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub reference_advance: ReferenceAdvance,
}

fn default_recursive() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

/// Validated watcher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    pub base_path: PathBuf,
    pub recursive: bool,
    pub poll_interval: Duration,
    pub reference_advance: ReferenceAdvance,
}

impl WatcherConfig {
    /// Configuration for `base_path` with every other field at its default.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            recursive: default_recursive(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            reference_advance: ReferenceAdvance::default(),
        }
    }
}

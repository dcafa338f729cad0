// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::model::{RawWatcherConfig, WatcherConfig};
use crate::errors::Result;

/// Parse a TOML document into a validated `WatcherConfig`.
///
/// `base_path` is taken verbatim; relative paths resolve against the
/// process working directory when the watcher is built.
pub fn from_toml_str(contents: &str) -> Result<WatcherConfig> {
    let raw: RawWatcherConfig = toml::from_str(contents)?;
    WatcherConfig::try_from(raw)
}

/// Load a configuration file from a given path and return the raw
/// `RawWatcherConfig`.
///
/// This only performs TOML deserialization; it does **not** perform
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWatcherConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: RawWatcherConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// A relative `base_path` is resolved against the directory containing the
/// config file, so a config next to the data it describes keeps working
/// regardless of the working directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WatcherConfig> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;

    if raw.base_path.is_relative() {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                raw.base_path = parent.join(&raw.base_path);
            }
        }
    }

    WatcherConfig::try_from(raw)
}

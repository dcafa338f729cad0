#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use dirwatch::{ReferenceAdvance, WatcherConfig};
use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

/// Builder for `WatcherConfig` to simplify test setup.
pub struct WatcherConfigBuilder {
    config: WatcherConfig,
}

impl WatcherConfigBuilder {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            config: WatcherConfig::new(base_path),
        }
    }

    pub fn recursive(mut self, val: bool) -> Self {
        self.config.recursive = val;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval = Duration::from_millis(ms);
        self
    }

    pub fn reference_advance(mut self, val: ReferenceAdvance) -> Self {
        self.config.reference_advance = val;
        self
    }

    pub fn build(self) -> WatcherConfig {
        self.config
    }
}

/// Lays out a temporary directory tree with controlled modification times.
///
/// The directory is removed when the builder is dropped.
pub struct TreeBuilder {
    dir: TempDir,
}

impl TreeBuilder {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn dir(&self, rel: &str) -> io::Result<PathBuf> {
        let path = self.join(rel);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn file(&self, rel: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn set_mtime(&self, rel: &str, mtime: SystemTime) -> io::Result<()> {
        set_file_mtime(self.join(rel), FileTime::from_system_time(mtime))
    }

    /// Set the mtime of the root and everything below it.
    ///
    /// Children are stamped before their parent directory so the parent
    /// keeps the requested time.
    pub fn backdate_all(&self, mtime: SystemTime) -> io::Result<()> {
        backdate(self.dir.path(), FileTime::from_system_time(mtime))
    }
}

fn backdate(path: &Path, mtime: FileTime) -> io::Result<()> {
    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            backdate(&entry?.path(), mtime)?;
        }
    }
    set_file_mtime(path, mtime)
}

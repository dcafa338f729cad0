// src/watch/event.rs

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::fs::EntryInfo;

/// A detected change: one entry whose modification time is strictly after
/// the reference time it was compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path of the entry, as reached from the watcher's base path.
    pub path: PathBuf,
    /// Snapshot taken when the entry was visited.
    pub info: EntryInfo,
    /// Reference time the entry was compared against.
    pub reference_time: SystemTime,
    /// Modification time of the entry.
    pub modified: SystemTime,
}

impl ChangeEvent {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.info.is_dir
    }
}

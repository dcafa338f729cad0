// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// Snapshot of a single filesystem entry, taken while walking the tree.
///
/// Nothing is kept between poll cycles; a fresh snapshot is produced every
/// time an entry is visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub len: u64,
    pub modified: SystemTime,
}

impl EntryInfo {
    /// Final path component, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Abstract, read-only filesystem interface used by the scanner.
pub trait FileSystem: Send + Sync + Debug {
    /// Metadata for `path`. Symlinks are not followed.
    fn metadata(&self, path: &Path) -> Result<EntryInfo>;

    /// Return a list of entries in a directory.
    /// Returns full paths, in no particular order.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Whether `path` is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn metadata(&self, path: &Path) -> Result<EntryInfo> {
        let meta = fs::symlink_metadata(path)
            .with_context(|| format!("reading metadata of {:?}", path))?;
        let modified = meta
            .modified()
            .with_context(|| format!("reading modification time of {:?}", path))?;

        Ok(EntryInfo {
            path: path.to_path_buf(),
            is_dir: meta.is_dir(),
            is_symlink: meta.file_type().is_symlink(),
            len: meta.len(),
            modified,
        })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry.with_context(|| format!("reading entry in dir {:?}", path))?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

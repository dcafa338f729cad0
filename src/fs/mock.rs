// src/fs/mock.rs

use super::{EntryInfo, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub enum MockKind {
    File { len: u64 },
    Dir(Vec<String>), // List of child names
    Symlink(PathBuf),
}

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub kind: MockKind,
    pub modified: SystemTime,
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    failing_read_dir: HashSet<PathBuf>,
    failing_metadata: HashSet<PathBuf>,
}

/// In-memory filesystem with explicit modification times.
///
/// Clones share the same tree, so a test can keep one handle and mutate
/// mtimes while a watcher owns another.
///
/// Parent directories are created implicitly with an mtime of
/// `UNIX_EPOCH`, so they never count as changed unless a test says so.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_file(&self, path: impl AsRef<Path>, len: u64, modified: SystemTime) {
        self.insert(path.as_ref(), MockKind::File { len }, modified);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref();
        let mut state = self.lock();
        if let Some(existing) = state.entries.get_mut(path) {
            existing.modified = modified;
            return;
        }
        drop(state);
        self.insert(path, MockKind::Dir(Vec::new()), modified);
    }

    /// Change the mtime of an existing entry. Returns `false` if it is missing.
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) -> bool {
        match self.lock().entries.get_mut(path.as_ref()) {
            Some(entry) => {
                entry.modified = modified;
                true
            }
            None => false,
        }
    }

    /// Add a symlink at `path` pointing to `target`, with the link's own mtime.
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl Into<PathBuf>, modified: SystemTime) {
        self.insert(path.as_ref(), MockKind::Symlink(target.into()), modified);
    }

    /// Make `read_dir` on `path` fail from now on.
    pub fn fail_read_dir(&self, path: impl AsRef<Path>) {
        self.lock().failing_read_dir.insert(path.as_ref().to_path_buf());
    }

    /// Make `metadata` on `path` fail from now on.
    pub fn fail_metadata(&self, path: impl AsRef<Path>) {
        self.lock().failing_metadata.insert(path.as_ref().to_path_buf());
    }

    fn insert(&self, path: &Path, kind: MockKind, modified: SystemTime) {
        let mut state = self.lock();
        let path = path.to_path_buf();
        state.entries.insert(path.clone(), MockEntry { kind, modified });

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir_entry(&mut state.entries, parent);
                Self::link_child(&mut state.entries, parent, &path);
            }
        }
    }

    fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if entries.contains_key(path) {
            return;
        }
        entries.insert(
            path.to_path_buf(),
            MockEntry {
                kind: MockKind::Dir(Vec::new()),
                modified: SystemTime::UNIX_EPOCH,
            },
        );
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && parent != path {
                Self::ensure_dir_entry(entries, parent);
                Self::link_child(entries, parent, path);
            }
        }
    }

    fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
        if let Some(MockEntry {
            kind: MockKind::Dir(children),
            ..
        }) = entries.get_mut(parent)
        {
            if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }

    /// Resolve symlinks in every component of `path`. The last component is
    /// only resolved when `follow_last` is set, mirroring `lstat` vs `stat`.
    fn resolve(entries: &HashMap<PathBuf, MockEntry>, path: &Path, follow_last: bool) -> PathBuf {
        let mut resolved = PathBuf::new();
        let mut components = path.components().peekable();
        while let Some(component) = components.next() {
            resolved.push(component);
            let is_last = components.peek().is_none();
            if is_last && !follow_last {
                break;
            }
            // Bounded so a link cycle ends in a lookup miss instead of a hang.
            for _ in 0..8 {
                match entries.get(&resolved) {
                    Some(MockEntry {
                        kind: MockKind::Symlink(target),
                        ..
                    }) => resolved = target.clone(),
                    _ => break,
                }
            }
        }
        resolved
    }
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> Result<EntryInfo> {
        let state = self.lock();
        if state.failing_metadata.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(&Self::resolve(&state.entries, path, false)) {
            Some(entry) => Ok(EntryInfo {
                path: path.to_path_buf(),
                is_dir: matches!(entry.kind, MockKind::Dir(_)),
                is_symlink: matches!(entry.kind, MockKind::Symlink(_)),
                len: match entry.kind {
                    MockKind::File { len } => len,
                    MockKind::Dir(_) | MockKind::Symlink(_) => 0,
                },
                modified: entry.modified,
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.lock();
        if state.failing_read_dir.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        let resolved = Self::resolve(&state.entries, path, true);
        match state.entries.get(&resolved) {
            // Children are listed under the path that was asked for, like std::fs.
            Some(MockEntry {
                kind: MockKind::Dir(children),
                ..
            }) => Ok(children.iter().map(|name| path.join(name)).collect()),
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.lock();
        let resolved = Self::resolve(&state.entries, path, true);
        matches!(
            state.entries.get(&resolved),
            Some(MockEntry {
                kind: MockKind::Dir(_),
                ..
            })
        )
    }
}

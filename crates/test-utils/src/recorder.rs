use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use dirwatch::{ChangeEvent, ChangeHandler, WatchError};

/// A fake handler that:
/// - records every change event and walk error it receives
/// - fails for entries whose file name was registered with `fail_on`.
///
/// Clones share the same log, so a test can keep one clone while the
/// watcher owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
    walk_errors: Arc<Mutex<Vec<PathBuf>>>,
    fail_on: Arc<Mutex<HashSet<String>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return an error from `on_change` for every entry named `name`.
    pub fn fail_on(self, name: &str) -> Self {
        self.fail_on.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Recorded paths, in call order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.events().into_iter().map(|e| e.path).collect()
    }

    /// Recorded file names, in call order.
    pub fn names(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.info.file_name().map(str::to_string))
            .collect()
    }

    /// How many times an entry named `name` was reported.
    pub fn count_named(&self, name: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.info.file_name() == Some(name))
            .count()
    }

    pub fn walk_errors(&self) -> Vec<PathBuf> {
        self.walk_errors.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
        self.walk_errors.lock().unwrap().clear();
    }
}

impl ChangeHandler for RecordingHandler {
    fn on_change(&mut self, event: &ChangeEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());

        let fail = match event.info.file_name() {
            Some(name) => self.fail_on.lock().unwrap().contains(name),
            None => false,
        };
        if fail {
            return Err(anyhow!("refusing change on {:?}", event.path));
        }
        Ok(())
    }

    fn on_walk_error(&mut self, path: &Path, _error: &WatchError) -> anyhow::Result<()> {
        self.walk_errors.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

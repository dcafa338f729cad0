// src/watch/handler.rs

//! Caller-supplied callbacks.
//!
//! A `ChangeHandler` is the only extension point of the watcher. Any
//! `FnMut(&ChangeEvent) -> anyhow::Result<()>` closure is a handler.

use std::path::Path;

use crate::errors::WatchError;
use crate::watch::event::ChangeEvent;

pub trait ChangeHandler {
    /// Called for every entry modified after the reference time.
    ///
    /// Returning an error prunes the subtree rooted at that entry for the
    /// current cycle. The walk continues with the next sibling and the
    /// watcher keeps polling.
    fn on_change(&mut self, event: &ChangeEvent) -> anyhow::Result<()>;

    /// Called when an entry could not be inspected or a directory could not
    /// be listed. The entry is skipped either way; the default ignores it.
    fn on_walk_error(&mut self, path: &Path, error: &WatchError) -> anyhow::Result<()> {
        let _ = (path, error);
        Ok(())
    }
}

impl<F> ChangeHandler for F
where
    F: FnMut(&ChangeEvent) -> anyhow::Result<()>,
{
    fn on_change(&mut self, event: &ChangeEvent) -> anyhow::Result<()> {
        self(event)
    }
}

// src/watch/mod.rs

//! Polling change detection.
//!
//! This module is responsible for:
//! - Walking the tree under a base path and comparing each entry's mtime
//!   against a moving reference time (`scan`).
//! - Driving that walk periodically from a background tokio task, with a
//!   handle to stop it (`watcher`).
//! - The handler contract callers implement (`handler`, `event`).
//!
//! It never writes to the filesystem and keeps no history between cycles.

pub mod event;
pub mod handler;
pub mod scan;
pub mod watcher;

pub use event::ChangeEvent;
pub use handler::ChangeHandler;
pub use scan::{scan_cycle, ScanOptions, ScanReport};
pub use watcher::{DirectoryWatcher, WatcherHandle};

// src/lib.rs

//! Polling directory watcher.
//!
//! `dirwatch` detects modifications under a base directory by re-scanning the
//! tree at a fixed interval and reporting every entry whose modification time
//! is newer than a moving reference time. It does not use OS change
//! notifications, so it works anywhere `std::fs` metadata does.
//!
//! ```no_run
//! use std::time::Duration;
//! use dirwatch::{ChangeEvent, DirectoryWatcher};
//!
//! # async fn demo() -> dirwatch::errors::Result<()> {
//! let mut watcher = DirectoryWatcher::new("./data")?;
//! watcher.set_poll_interval(Duration::from_millis(250));
//! watcher.set_recursive(false);
//!
//! let handle = watcher.watch(|event: &ChangeEvent| -> anyhow::Result<()> {
//!     println!("changed: {}", event.path.display());
//!     Ok(())
//! })?;
//!
//! // ... later
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

pub use config::WatcherConfig;
pub use errors::{Result, WatchError};
pub use fs::{EntryInfo, FileSystem, RealFileSystem};
pub use types::ReferenceAdvance;
pub use watch::{ChangeEvent, ChangeHandler, DirectoryWatcher, ScanReport, WatcherHandle};

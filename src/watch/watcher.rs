// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{validate_config, WatcherConfig};
use crate::errors::{Result, WatchError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::ReferenceAdvance;
use crate::watch::handler::ChangeHandler;
use crate::watch::scan::{scan_cycle, ScanOptions, ScanReport};

/// Polling watcher for a single base directory.
///
/// Configure it with the setters, then either call [`poll_once`] from your
/// own loop or hand it to [`watch`], which consumes it and polls in the
/// background.
///
/// [`poll_once`]: DirectoryWatcher::poll_once
/// [`watch`]: DirectoryWatcher::watch
pub struct DirectoryWatcher {
    config: WatcherConfig,
    reference_time: SystemTime,
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("config", &self.config)
            .field("reference_time", &self.reference_time)
            .finish_non_exhaustive()
    }
}

impl DirectoryWatcher {
    /// Watcher for `base_path` with recursion on, a 500 ms poll interval and
    /// the reference time set to now.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_config(WatcherConfig::new(base_path))
    }

    pub fn from_config(config: WatcherConfig) -> Result<Self> {
        Self::with_file_system(config, Arc::new(RealFileSystem))
    }

    /// Build a watcher that reads through `fs` instead of `std::fs`.
    pub fn with_file_system(config: WatcherConfig, fs: Arc<dyn FileSystem>) -> Result<Self> {
        validate_config(&config)?;
        if !fs.is_dir(&config.base_path) {
            return Err(WatchError::NotADirectory(config.base_path));
        }

        Ok(Self {
            config,
            reference_time: SystemTime::now(),
            fs,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    /// Pause between two scans. The default is 500 milliseconds.
    pub fn set_poll_interval(&mut self, poll_interval: Duration) {
        self.config.poll_interval = poll_interval;
    }

    pub fn recursive(&self) -> bool {
        self.config.recursive
    }

    /// Whether subdirectories are descended into. The default is `true`.
    pub fn set_recursive(&mut self, recursive: bool) {
        self.config.recursive = recursive;
    }

    pub fn reference_advance(&self) -> ReferenceAdvance {
        self.config.reference_advance
    }

    pub fn set_reference_advance(&mut self, advance: ReferenceAdvance) {
        self.config.reference_advance = advance;
    }

    /// Entries modified at or before this instant are considered seen.
    pub fn reference_time(&self) -> SystemTime {
        self.reference_time
    }

    /// Override the reference time, e.g. to report entries that changed
    /// shortly before the watcher was created.
    pub fn set_reference_time(&mut self, reference_time: SystemTime) {
        self.reference_time = reference_time;
    }

    /// Run one poll cycle on the current thread, without sleeping.
    pub fn poll_once<H>(&mut self, handler: &mut H) -> ScanReport
    where
        H: ChangeHandler + ?Sized,
    {
        let options = ScanOptions {
            recursive: self.config.recursive,
            reference_advance: self.config.reference_advance,
        };
        scan_cycle(
            self.fs.as_ref(),
            &self.config.base_path,
            options,
            &mut self.reference_time,
            handler,
        )
    }

    /// Start polling in a background tokio task and return immediately.
    ///
    /// The task scans, sleeps for the poll interval and repeats until it is
    /// stopped through the returned handle. Dropping the handle (or calling
    /// [`WatcherHandle::detach`]) leaves it running for the lifetime of the
    /// runtime. Handler calls are strictly sequential.
    ///
    /// Fails if the configuration is invalid or no tokio runtime is active.
    pub fn watch<H>(self, handler: H) -> Result<WatcherHandle<H>>
    where
        H: ChangeHandler + Send + 'static,
    {
        validate_config(&self.config)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| WatchError::NoRuntime)?;

        info!(
            base = ?self.config.base_path,
            "listening for changes on {}",
            self.config.base_path.display()
        );

        let span = info_span!("dirwatch", base = %self.config.base_path.display());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = runtime.spawn(poll_loop(self, handler, stop_rx).instrument(span));

        Ok(WatcherHandle {
            stop: Some(stop_tx),
            task,
        })
    }
}

/// Background loop behind [`DirectoryWatcher::watch`].
///
/// Each walk runs on the blocking pool; watcher and handler move into the
/// blocking closure and come back out with the report.
async fn poll_loop<H>(
    mut watcher: DirectoryWatcher,
    mut handler: H,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<H>
where
    H: ChangeHandler + Send + 'static,
{
    // Cleared once the handle is dropped; from then on nobody can stop us.
    let mut stop_armed = true;
    let mut cycle: u64 = 0;

    loop {
        cycle += 1;
        let scanned = tokio::task::spawn_blocking(move || {
            let report = watcher.poll_once(&mut handler);
            (watcher, handler, report)
        })
        .await;

        let (next_watcher, next_handler, report) = match scanned {
            Ok(parts) => parts,
            Err(err) => {
                warn!(cycle, error = %err, "poll cycle task failed; watcher stopped");
                return Err(WatchError::TaskFailed(err.to_string()));
            }
        };
        watcher = next_watcher;
        handler = next_handler;
        debug!(cycle, changed = report.changed, "sleeping until next poll");

        let sleep = tokio::time::sleep(watcher.poll_interval());
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => break,
                res = &mut stop_rx, if stop_armed => match res {
                    Ok(()) => {
                        debug!(cycle, "stop requested; watcher exiting");
                        return Ok(handler);
                    }
                    Err(_) => {
                        debug!("watcher handle dropped; polling until process exit");
                        stop_armed = false;
                    }
                },
            }
        }
    }
}

/// Handle for a running background watch.
///
/// Dropping it detaches the poll loop, which then runs until the runtime
/// shuts down.
pub struct WatcherHandle<H> {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<H>>,
}

impl<H> std::fmt::Debug for WatcherHandle<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl<H> WatcherHandle<H> {
    /// Stop polling and wait for the loop to exit.
    ///
    /// A cycle already in progress completes first. Returns the handler so
    /// callers can inspect whatever it accumulated.
    pub async fn stop(mut self) -> Result<H> {
        if let Some(stop) = self.stop.take() {
            if stop.send(()).is_err() {
                debug!("poll loop already finished while stopping");
            }
        }

        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(WatchError::TaskFailed(err.to_string())),
        }
    }

    /// Let the loop run until the process exits.
    pub fn detach(self) {}

    /// `true` once the poll loop has ended (stopped or failed).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

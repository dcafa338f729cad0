// src/watch/scan.rs

//! One poll cycle: walk the tree, compare mtimes, call the handler.
//!
//! This is the synchronous core of the watcher. It knows nothing about
//! tokio or sleeping; [`crate::watch::watcher`] drives it in a loop.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::errors::WatchError;
use crate::fs::FileSystem;
use crate::types::ReferenceAdvance;
use crate::watch::event::ChangeEvent;
use crate::watch::handler::ChangeHandler;

/// Per-cycle settings for [`scan_cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub recursive: bool,
    pub reference_advance: ReferenceAdvance,
}

/// Counters describing one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Entries whose metadata was read.
    pub visited: usize,
    /// Entries passed to the handler.
    pub changed: usize,
    /// Errors returned by the handler.
    pub handler_errors: usize,
    /// Entries that could not be inspected or listed.
    pub walk_errors: usize,
    /// Directories whose children were skipped because the handler failed.
    pub pruned: usize,
}

/// Move `reference` forward to the current time. Never moves it backwards.
pub(crate) fn advance_to_now(reference: &mut SystemTime) {
    let now = SystemTime::now();
    if now > *reference {
        *reference = now;
    }
}

/// Run a single poll cycle rooted at `base`.
///
/// Entries are visited depth-first, parents before children, siblings in
/// sorted path order. `base` itself is visited first. Without recursion its
/// direct children are visited but never descended into.
///
/// A `base` that is a symlink to a directory is walked through the link; its
/// reported mtime is still the link's own. Symlinks below `base` are not
/// followed.
///
/// Every entry whose mtime is strictly after the reference time is passed to
/// `handler`. How `reference` moves is governed by
/// [`ScanOptions::reference_advance`]; either way it never decreases.
pub fn scan_cycle<H>(
    fs: &dyn FileSystem,
    base: &Path,
    options: ScanOptions,
    reference: &mut SystemTime,
    handler: &mut H,
) -> ScanReport
where
    H: ChangeHandler + ?Sized,
{
    let cycle_reference = *reference;
    let mut report = ScanReport::default();

    // (path, depth below base)
    let mut stack: Vec<(PathBuf, usize)> = vec![(base.to_path_buf(), 0)];

    while let Some((path, depth)) = stack.pop() {
        let info = match fs.metadata(&path) {
            Ok(info) => info,
            Err(err) => {
                report_walk_error(handler, &mut report, &path, err);
                continue;
            }
        };
        report.visited += 1;
        trace!(?path, depth, modified = ?info.modified, "visiting entry");

        // Symlinks are never followed, except when the base itself is one.
        let walkable = if depth == 0 && info.is_symlink {
            fs.is_dir(&path)
        } else {
            info.is_dir && !info.is_symlink
        };
        let mut descend = walkable && (depth == 0 || options.recursive);

        let compared_against = match options.reference_advance {
            ReferenceAdvance::Cycle => cycle_reference,
            ReferenceAdvance::PerMatch => *reference,
        };

        if info.modified > compared_against {
            report.changed += 1;
            let event = ChangeEvent {
                path: path.clone(),
                modified: info.modified,
                reference_time: compared_against,
                info,
            };

            if let Err(err) = handler.on_change(&event) {
                report.handler_errors += 1;
                debug!(?path, error = %err, "handler returned an error; pruning entry");
                if descend {
                    descend = false;
                    report.pruned += 1;
                }
            }

            if options.reference_advance == ReferenceAdvance::PerMatch {
                advance_to_now(reference);
            }
        }

        if !descend {
            continue;
        }

        match fs.read_dir(&path) {
            Ok(mut children) => {
                children.sort();
                // Reversed so the smallest path is popped first.
                stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
            }
            Err(err) => report_walk_error(handler, &mut report, &path, err),
        }
    }

    if options.reference_advance == ReferenceAdvance::Cycle {
        advance_to_now(reference);
    }

    debug!(
        base = ?base,
        visited = report.visited,
        changed = report.changed,
        handler_errors = report.handler_errors,
        walk_errors = report.walk_errors,
        "poll cycle complete"
    );

    report
}

fn report_walk_error<H>(
    handler: &mut H,
    report: &mut ScanReport,
    path: &Path,
    err: anyhow::Error,
) where
    H: ChangeHandler + ?Sized,
{
    report.walk_errors += 1;
    let err = WatchError::from(err);
    debug!(?path, error = %err, "could not inspect entry; skipping");

    if let Err(handler_err) = handler.on_walk_error(path, &err) {
        report.handler_errors += 1;
        debug!(?path, error = %handler_err, "walk error handler returned an error");
    }
}

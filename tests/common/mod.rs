#![allow(dead_code)]

use std::time::{Duration, SystemTime};

use dirwatch::fs::mock::MockFileSystem;

pub use dirwatch_test_utils::builders;
pub use dirwatch_test_utils::recorder::RecordingHandler;
pub use dirwatch_test_utils::{init_tracing, wait_until, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Base directory used by every mock tree.
pub const BASE: &str = "/base";

/// Fixed reference time for mock trees, far enough from the epoch that
/// offsets in both directions are meaningful.
pub fn t0() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000)
}

/// `t0` shifted by `secs` seconds (negative means earlier).
pub fn at(secs: i64) -> SystemTime {
    if secs >= 0 {
        t0() + Duration::from_secs(secs as u64)
    } else {
        t0() - Duration::from_secs(secs.unsigned_abs())
    }
}

/// Mock filesystem with an old, empty base directory.
pub fn mock_base() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_dir(BASE, at(-100));
    fs
}

pub fn base_path(rel: &str) -> std::path::PathBuf {
    std::path::Path::new(BASE).join(rel)
}

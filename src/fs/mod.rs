//! Filesystem primitives.
//!
//! Each primitive comes in two flavours with the same naming convention:
//! `x` is the async form (runs on tokio and suspends the calling task) and
//! `x_sync` blocks the calling thread. Both route every failure through
//! [`CopyError`](crate::CopyError).

mod blocking;
mod nonblocking;

use std::path::Path;

pub use blocking::{
    chmod_sync, close_sync, copy_file_sync, lstat_sync, make_dir_sync, make_dir_sync_on,
    stat_sync, utimes_sync,
};
pub(crate) use blocking::{copy_staged, staging_file};
pub use nonblocking::{
    ReadStream, chmod, close, lstat, make_dir, make_dir_on, open_read_stream, open_write_stream,
    stat, utimes,
};

/// Metadata returned by [`stat`]/[`lstat`] and their blocking forms.
pub type StatRecord = std::fs::Metadata;

/// What a directory creation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeDirOutcome {
    /// The directory exists now (it may have existed before).
    Created,
    /// The path is a Windows drive root; nothing was attempted.
    SkippedDriveRoot,
}

impl MakeDirOutcome {
    /// Whether creation was skipped rather than performed.
    #[must_use]
    pub fn is_skipped(self) -> bool {
        self == Self::SkippedDriveRoot
    }
}

fn log_drive_root_skip(path: &Path) {
    #[cfg(feature = "tracing")]
    tracing::info!(path = %path.display(), "skipping root directory");
    #[cfg(not(feature = "tracing"))]
    let _ = path;
}

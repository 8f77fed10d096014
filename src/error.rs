//! Error types for cpfile.
//!
//! Every filesystem call made by this crate is routed through [`CopyError`],
//! which names the operation that failed, the path(s) it was working on, and
//! keeps the original [`io::Error`] as its source.
//!
//! # Operations
//!
//! | Operation | Message |
//! |-----------|---------|
//! | [`Operation::Stat`] | ``Cannot stat path `p`: …`` |
//! | [`Operation::Lstat`] | ``lstat `p` failed: …`` |
//! | [`Operation::Utimes`] | ``utimes `p` failed: …`` |
//! | [`Operation::Chmod`] | ``chmod `p` failed: …`` |
//! | [`Operation::MakeDir`] | ``Cannot create directory `p`: …`` |
//! | [`Operation::Copy`] | ``Cannot copy from `a` to `b`: …`` |
//! | [`Operation::Read`] | ``Cannot read from `p`: …`` |
//! | [`Operation::Write`] | ``Cannot write to `p`: …`` |
//! | [`Operation::Close`] | ``Cannot close `p`: …`` |

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for cpfile operations.
///
/// This is a type alias for `std::result::Result<T, CopyError>`.
pub type Result<T> = std::result::Result<T, CopyError>;

/// The filesystem operation a [`CopyError`] was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Operation {
    /// `stat` (follows symlinks)
    Stat,
    /// `lstat` (does not follow symlinks)
    Lstat,
    /// Setting access/modification times
    Utimes,
    /// Setting permission bits
    Chmod,
    /// Recursive directory creation
    MakeDir,
    /// Whole-file copy
    Copy,
    /// Opening or reading a source stream
    Read,
    /// Opening or writing a destination stream
    Write,
    /// Flushing and releasing a stream
    Close,
}

impl Operation {
    /// Short lowercase name, handy for logs and machine output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stat => "stat",
            Self::Lstat => "lstat",
            Self::Utimes => "utimes",
            Self::Chmod => "chmod",
            Self::MakeDir => "mkdir",
            Self::Copy => "copy",
            Self::Read => "read",
            Self::Write => "write",
            Self::Close => "close",
        }
    }

    fn describe(self, path: &Path, destination: Option<&Path>) -> String {
        let p = path.display();
        match (self, destination) {
            (Self::Copy, Some(dst)) => {
                format!("Cannot copy from `{}` to `{}`", p, dst.display())
            }
            (Self::Copy, None) => format!("Cannot copy from `{p}`"),
            (Self::Stat, _) => format!("Cannot stat path `{p}`"),
            (Self::Lstat, _) => format!("lstat `{p}` failed"),
            (Self::Utimes, _) => format!("utimes `{p}` failed"),
            (Self::Chmod, _) => format!("chmod `{p}` failed"),
            (Self::MakeDir, _) => format!("Cannot create directory `{p}`"),
            (Self::Read, _) => format!("Cannot read from `{p}`"),
            (Self::Write, _) => format!("Cannot write to `{p}`"),
            (Self::Close, _) => format!("Cannot close `{p}`"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by every operation in this crate.
///
/// The message always names the operation and the path(s) involved. The
/// original OS error is kept as the [`source`](std::error::Error::source)
/// and its kind and raw code are exposed through [`kind`](Self::kind) and
/// [`raw_os_error`](Self::raw_os_error).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct CopyError {
    operation: Operation,
    path: PathBuf,
    destination: Option<PathBuf>,
    message: String,
    #[source]
    source: io::Error,
}

impl CopyError {
    /// Wrap `raw` as a failure of `operation` on `path`.
    pub fn wrap(operation: Operation, path: impl AsRef<Path>, raw: io::Error) -> Self {
        Self::build(operation, path.as_ref().to_path_buf(), None, raw)
    }

    /// Wrap `raw` as a failure of `operation` from `source` to `destination`.
    pub fn wrap_pair(
        operation: Operation,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        raw: io::Error,
    ) -> Self {
        Self::build(
            operation,
            source.as_ref().to_path_buf(),
            Some(destination.as_ref().to_path_buf()),
            raw,
        )
    }

    fn build(
        operation: Operation,
        path: PathBuf,
        destination: Option<PathBuf>,
        raw: io::Error,
    ) -> Self {
        let message = format!(
            "{}: {}",
            operation.describe(&path, destination.as_deref()),
            raw
        );
        Self {
            operation,
            path,
            destination,
            message,
            source: raw,
        }
    }

    /// The operation that failed.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The path the operation was acting on (the source, for copies).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The destination path, for two-path operations.
    #[must_use]
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// The full human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped OS error.
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }

    /// Kind of the wrapped OS error.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    /// Raw OS error code of the cause, if it came from the OS.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.source.raw_os_error()
    }

    /// Whether the cause indicates "no space left on device".
    ///
    /// # Platform Support
    ///
    /// | Platform | Error Detection |
    /// |----------|-----------------|
    /// | Unix | `ENOSPC` (errno 28) |
    /// | Windows | `ERROR_DISK_FULL` (0x70) |
    #[must_use]
    pub fn is_no_space(&self) -> bool {
        is_no_space_error(&self.source)
    }

    /// Take the wrapped OS error, dropping the context.
    #[must_use]
    pub fn into_io_error(self) -> io::Error {
        self.source
    }
}

impl From<CopyError> for io::Error {
    fn from(err: CopyError) -> Self {
        io::Error::new(err.kind(), err)
    }
}

/// Check if an IO error indicates "no space left on device".
pub(crate) fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        // The raw errno may be present even when kind() isn't StorageFull
        if let Some(raw_error) = error.raw_os_error() {
            const ENOSPC: i32 = 28;
            return raw_error == ENOSPC;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_DISK_FULL: i32 = 112;
            return raw_error == ERROR_DISK_FULL;
        }
    }

    false
}

/// Attach operation and path context to an `io::Result`.
pub(crate) trait IoResultExt<T> {
    fn wrap_err(self, operation: Operation, path: &Path) -> Result<T>;

    fn wrap_err_pair(self, operation: Operation, source: &Path, destination: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn wrap_err(self, operation: Operation, path: &Path) -> Result<T> {
        self.map_err(|e| CopyError::wrap(operation, path, e))
    }

    fn wrap_err_pair(self, operation: Operation, source: &Path, destination: &Path) -> Result<T> {
        self.map_err(|e| CopyError::wrap_pair(operation, source, destination, e))
    }
}

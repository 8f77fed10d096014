//! Async filesystem primitives on tokio.
//!
//! These mirror the blocking primitives one to one. Calls that tokio has no
//! native async form for (setting file times) run on the blocking pool via
//! [`tokio::task::spawn_blocking`].

use crate::error::{IoResultExt, Operation, Result};
use crate::options::{ReadOptions, WriteOptions};
use crate::platform::Platform;
use filetime::FileTime;
use std::fs::{Metadata, Permissions};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncSeekExt, AsyncWriteExt, BufReader, ReadBuf,
    SeekFrom,
};
use tokio::task;

use super::{MakeDirOutcome, log_drive_root_skip};

/// Stat `path`, following symlinks.
pub async fn stat(path: impl AsRef<Path>) -> Result<Metadata> {
    let path = path.as_ref();
    fs::metadata(path).await.wrap_err(Operation::Stat, path)
}

/// Stat `path` without following a trailing symlink.
pub async fn lstat(path: impl AsRef<Path>) -> Result<Metadata> {
    let path = path.as_ref();
    fs::symlink_metadata(path)
        .await
        .wrap_err(Operation::Lstat, path)
}

/// Set access and modification times of `path`.
pub async fn utimes(path: impl AsRef<Path>, atime: FileTime, mtime: FileTime) -> Result<()> {
    let path = path.as_ref();
    let owned = path.to_path_buf();
    task::spawn_blocking(move || filetime::set_file_times(&owned, atime, mtime))
        .await
        .unwrap_or_else(|join_err| Err(io::Error::other(join_err)))
        .wrap_err(Operation::Utimes, path)
}

/// Set permission bits of `path`.
pub async fn chmod(path: impl AsRef<Path>, permissions: Permissions) -> Result<()> {
    let path = path.as_ref();
    fs::set_permissions(path, permissions)
        .await
        .wrap_err(Operation::Chmod, path)
}

/// Create `path` and any missing ancestors.
///
/// Same policy as [`make_dir_sync`](crate::make_dir_sync): existing
/// directories are fine, and Windows drive roots are skipped before any call
/// is made.
pub async fn make_dir(path: impl AsRef<Path>) -> Result<MakeDirOutcome> {
    make_dir_on(Platform::current(), path.as_ref()).await
}

/// [`make_dir`] with an explicit platform policy.
pub async fn make_dir_on(platform: Platform, path: &Path) -> Result<MakeDirOutcome> {
    if platform.skips_make_dir(path) {
        log_drive_root_skip(path);
        return Ok(MakeDirOutcome::SkippedDriveRoot);
    }
    fs::create_dir_all(path)
        .await
        .wrap_err(Operation::MakeDir, path)?;
    Ok(MakeDirOutcome::Created)
}

/// A buffered source stream returned by [`open_read_stream`].
///
/// By the time it is handed out the first chunk is already buffered (or
/// end-of-file was seen), so open and permission errors have surfaced.
/// The file handle is released when the stream is dropped.
#[derive(Debug)]
pub struct ReadStream {
    inner: BufReader<File>,
    path: PathBuf,
}

impl ReadStream {
    /// The path this stream reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unwrap into the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<File> {
        self.inner
    }
}

impl AsyncRead for ReadStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncBufRead for ReadStream {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        Pin::new(&mut self.get_mut().inner).poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        Pin::new(&mut self.get_mut().inner).consume(amt);
    }
}

/// Open `path` for sequential reading and wait until it is readable.
///
/// Waits for the first buffered chunk (or end-of-file) before returning so
/// that a missing or unreadable file fails here rather than on first read.
///
/// # Errors
///
/// Open, seek and readiness failures are all [`Operation::Read`].
pub async fn open_read_stream(path: impl AsRef<Path>, options: &ReadOptions) -> Result<ReadStream> {
    let path = path.as_ref();
    let mut file = File::open(path).await.wrap_err(Operation::Read, path)?;
    if let Some(start) = options.start {
        file.seek(SeekFrom::Start(start))
            .await
            .wrap_err(Operation::Read, path)?;
    }

    let mut inner = BufReader::with_capacity(options.buffer_size, file);
    inner.fill_buf().await.wrap_err(Operation::Read, path)?;

    Ok(ReadStream {
        inner,
        path: path.to_path_buf(),
    })
}

/// Open `path` for writing, creating it if needed.
///
/// With [`WriteOptions::exclusive`] an existing file fails with
/// [`io::ErrorKind::AlreadyExists`] instead of being truncated.
pub async fn open_write_stream(path: impl AsRef<Path>, options: &WriteOptions) -> Result<File> {
    let path = path.as_ref();
    let mut open = OpenOptions::new();
    open.write(true);
    if options.overwrite {
        open.create(true).truncate(true);
    } else {
        open.create_new(true);
    }
    open.open(path).await.wrap_err(Operation::Write, path)
}

/// Flush pending writes of `file` to disk and release it.
pub async fn close(mut file: File, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    file.flush().await.wrap_err(Operation::Close, path)?;
    file.sync_all().await.wrap_err(Operation::Close, path)
}

// =============================================================================
// Tests
// =============================================================================

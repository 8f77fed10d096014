//! Whole-file copy with metadata.
//!
//! [`copy_with_metadata_sync`] and [`copy_with_metadata`] compose the
//! primitives in [`crate::fs`]: stat the source, create the destination's
//! parent directories, copy the bytes, then carry timestamps and
//! permissions over. Bytes are staged in a temp file beside the destination
//! and renamed over it, so the destination is either the old file or the
//! complete new one.

use crate::error::{CopyError, IoResultExt, Operation, Result};
use crate::fs::{
    ReadStream, chmod, close, copy_staged, make_dir, make_dir_sync, open_read_stream, stat,
    stat_sync, staging_file, utimes, utimes_sync,
};
use crate::options::CopyOptions;
use filetime::FileTime;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tokio::task;

/// Result of a single file copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The file was copied.
    Copied {
        /// Number of bytes written to the destination
        bytes: u64,
    },
    /// The destination existed and `overwrite` was off.
    Skipped,
}

impl CopyOutcome {
    /// Whether bytes were actually copied.
    #[must_use]
    pub fn is_copied(self) -> bool {
        matches!(self, Self::Copied { .. })
    }
}

/// Copy `source` to `destination`, blocking the current thread.
///
/// Missing parent directories of `destination` are created. The bytes go
/// through a temp file that is renamed over `destination`, with the source
/// permission bits unless [`CopyOptions::without_permissions`] is set;
/// timestamps are then set from the source's metadata.
///
/// # Errors
///
/// Every failure is a [`CopyError`]. A directory `source` fails with an
/// [`Operation::Copy`] error of kind [`io::ErrorKind::IsADirectory`], and
/// so does copying a file onto itself (kind [`io::ErrorKind::InvalidInput`]).
///
/// # Example
///
/// ```no_run
/// use cpfile::{CopyOptions, copy_with_metadata_sync};
///
/// let outcome = copy_with_metadata_sync("notes.txt", "backup/notes.txt", &CopyOptions::default())?;
/// assert!(outcome.is_copied());
/// # Ok::<(), cpfile::CopyError>(())
/// ```
pub fn copy_with_metadata_sync(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: &CopyOptions,
) -> Result<CopyOutcome> {
    let (src, dst) = (source.as_ref(), destination.as_ref());

    let src_meta = stat_sync(src)?;
    check_source_is_file(&src_meta, src, dst)?;

    if let Some(parent) = parent_dir(dst) {
        make_dir_sync(parent)?;
    }

    let existing = existing_destination(stat_sync(dst))?;
    if existing.is_some() && !options.overwrite {
        log_skip(dst);
        return Ok(CopyOutcome::Skipped);
    }
    check_destination(&src_meta, existing.as_ref(), src, dst)?;

    let staged = copy_staged(src, dst, !options.overwrite, options.preserve_permissions);
    let bytes = match staged.wrap_err_pair(Operation::Copy, src, dst) {
        Ok(bytes) => bytes,
        Err(e) if is_skip(&e, options) => {
            log_skip(dst);
            return Ok(CopyOutcome::Skipped);
        }
        Err(e) => return Err(e),
    };

    if options.preserve_timestamps {
        let (atime, mtime) = file_times(&src_meta);
        utimes_sync(dst, atime, mtime)?;
    }

    Ok(CopyOutcome::Copied { bytes })
}

/// Copy `source` to `destination` on the tokio runtime.
///
/// The source is opened and its first chunk buffered before anything
/// happens at the destination, so an unreadable source never leaves an
/// empty destination file behind. Bytes are streamed through a
/// `buffer_size` buffer into a temp file beside `destination`, which
/// replaces it once everything is written and synced. Read failures name
/// the source and write failures name the destination.
///
/// # Errors
///
/// Every failure is a [`CopyError`]. A directory `source` fails with an
/// [`Operation::Copy`] error of kind [`io::ErrorKind::IsADirectory`], and
/// so does copying a file onto itself (kind [`io::ErrorKind::InvalidInput`]).
pub async fn copy_with_metadata(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: &CopyOptions,
) -> Result<CopyOutcome> {
    let (src, dst) = (source.as_ref(), destination.as_ref());

    let src_meta = stat(src).await?;
    check_source_is_file(&src_meta, src, dst)?;

    let mut reader = open_read_stream(src, &options.read_options()).await?;

    if let Some(parent) = parent_dir(dst) {
        make_dir(parent).await?;
    }

    let existing = existing_destination(stat(dst).await)?;
    if existing.is_some() && !options.overwrite {
        log_skip(dst);
        return Ok(CopyOutcome::Skipped);
    }
    check_destination(&src_meta, existing.as_ref(), src, dst)?;

    let (mut writer, temp_path) = create_staging(dst, options.preserve_permissions).await?;
    let bytes = pipe(&mut reader, &mut writer, src, dst).await?;
    drop(reader);
    close(writer, dst).await?;

    match persist(temp_path, dst, options.overwrite).await {
        Ok(()) => {}
        Err(e) if is_skip(&e, options) => {
            log_skip(dst);
            return Ok(CopyOutcome::Skipped);
        }
        Err(e) => return Err(e),
    }

    if options.preserve_timestamps || options.preserve_permissions {
        // Re-read: the source's atime may have moved while we read it
        let src_meta = stat(src).await?;
        if options.preserve_timestamps {
            let (atime, mtime) = file_times(&src_meta);
            utimes(dst, atime, mtime).await?;
        }
        if options.preserve_permissions {
            chmod(dst, src_meta.permissions()).await?;
        }
    }

    Ok(CopyOutcome::Copied { bytes })
}

async fn pipe(reader: &mut ReadStream, writer: &mut File, src: &Path, dst: &Path) -> Result<u64> {
    let mut total: u64 = 0;
    loop {
        let chunk = reader.fill_buf().await.wrap_err(Operation::Read, src)?;
        if chunk.is_empty() {
            break;
        }
        let n = chunk.len();
        writer
            .write_all(chunk)
            .await
            .wrap_err(Operation::Write, dst)?;
        reader.consume(n);
        total += n as u64;
    }
    // tokio hands writes to the blocking pool; their errors surface here
    writer.flush().await.wrap_err(Operation::Write, dst)?;
    Ok(total)
}

/// Open the temp file for `dst` as a tokio file. Dropping the returned
/// path removes the temp file.
async fn create_staging(dst: &Path, keep_mode: bool) -> Result<(File, TempPath)> {
    let target = dst.to_path_buf();
    let temp = task::spawn_blocking(move || staging_file(&target, keep_mode))
        .await
        .unwrap_or_else(|join_err| Err(io::Error::other(join_err)))
        .wrap_err(Operation::Write, dst)?;
    let (file, path) = temp.into_parts();
    Ok((File::from_std(file), path))
}

async fn persist(temp: TempPath, dst: &Path, overwrite: bool) -> Result<()> {
    let target = dst.to_path_buf();
    task::spawn_blocking(move || {
        let persisted = if overwrite {
            temp.persist(&target)
        } else {
            temp.persist_noclobber(&target)
        };
        persisted.map_err(|e| e.error)
    })
    .await
    .unwrap_or_else(|join_err| Err(io::Error::other(join_err)))
    .wrap_err(Operation::Write, dst)
}

/// `Some` metadata when the destination exists, `None` when it does not.
fn existing_destination(result: Result<Metadata>) -> Result<Option<Metadata>> {
    match result {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Refuse to replace the source itself or anything that is not a file.
fn check_destination(
    src_meta: &Metadata,
    existing: Option<&Metadata>,
    src: &Path,
    dst: &Path,
) -> Result<()> {
    let Some(dst_meta) = existing else {
        return Ok(());
    };
    let refused = if dst_meta.is_dir() {
        io::Error::new(
            io::ErrorKind::IsADirectory,
            "illegal operation on a directory",
        )
    } else if is_same_file(src_meta, dst_meta, src, dst) {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "source and destination are the same file",
        )
    } else if !dst_meta.is_file() {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination is not a regular file",
        )
    } else {
        return Ok(());
    };
    Err(CopyError::wrap_pair(Operation::Copy, src, dst, refused))
}

#[cfg(unix)]
fn is_same_file(src_meta: &Metadata, dst_meta: &Metadata, _src: &Path, _dst: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    src_meta.dev() == dst_meta.dev() && src_meta.ino() == dst_meta.ino()
}

#[cfg(not(unix))]
fn is_same_file(_src_meta: &Metadata, _dst_meta: &Metadata, src: &Path, dst: &Path) -> bool {
    match (std::fs::canonicalize(src), std::fs::canonicalize(dst)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn check_source_is_file(meta: &Metadata, src: &Path, dst: &Path) -> Result<()> {
    if meta.is_dir() {
        return Err(CopyError::wrap_pair(
            Operation::Copy,
            src,
            dst,
            io::Error::new(
                io::ErrorKind::IsADirectory,
                "illegal operation on a directory",
            ),
        ));
    }
    Ok(())
}

fn is_skip(err: &CopyError, options: &CopyOptions) -> bool {
    !options.overwrite && err.kind() == io::ErrorKind::AlreadyExists
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn file_times(meta: &Metadata) -> (FileTime, FileTime) {
    (
        FileTime::from_last_access_time(meta),
        FileTime::from_last_modification_time(meta),
    )
}

fn log_skip(dst: &Path) {
    #[cfg(feature = "tracing")]
    tracing::debug!(path = %dst.display(), "destination exists, not overwriting");
    #[cfg(not(feature = "tracing"))]
    let _ = dst;
}

// =============================================================================
// Tests
// =============================================================================

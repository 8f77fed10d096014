//! Blocking filesystem primitives.

use crate::error::{IoResultExt, Operation, Result};
use crate::options::CopyFlags;
use crate::platform::Platform;
use filetime::FileTime;
use std::fs::{self, File, Metadata, Permissions};
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

use super::{MakeDirOutcome, log_drive_root_skip};

/// Stat `path`, following symlinks.
pub fn stat_sync(path: impl AsRef<Path>) -> Result<Metadata> {
    let path = path.as_ref();
    fs::metadata(path).wrap_err(Operation::Stat, path)
}

/// Stat `path` without following a trailing symlink.
pub fn lstat_sync(path: impl AsRef<Path>) -> Result<Metadata> {
    let path = path.as_ref();
    fs::symlink_metadata(path).wrap_err(Operation::Lstat, path)
}

/// Set access and modification times of `path`.
pub fn utimes_sync(path: impl AsRef<Path>, atime: FileTime, mtime: FileTime) -> Result<()> {
    let path = path.as_ref();
    filetime::set_file_times(path, atime, mtime).wrap_err(Operation::Utimes, path)
}

/// Set permission bits of `path`.
pub fn chmod_sync(path: impl AsRef<Path>, permissions: Permissions) -> Result<()> {
    let path = path.as_ref();
    fs::set_permissions(path, permissions).wrap_err(Operation::Chmod, path)
}

/// Create `path` and any missing ancestors.
///
/// Succeeds without doing anything if the directory already exists. On
/// Windows a bare drive root such as `C:\` is never created; the call
/// returns [`MakeDirOutcome::SkippedDriveRoot`] instead.
pub fn make_dir_sync(path: impl AsRef<Path>) -> Result<MakeDirOutcome> {
    make_dir_sync_on(Platform::current(), path.as_ref())
}

/// [`make_dir_sync`] with an explicit platform policy.
pub fn make_dir_sync_on(platform: Platform, path: &Path) -> Result<MakeDirOutcome> {
    if platform.skips_make_dir(path) {
        log_drive_root_skip(path);
        return Ok(MakeDirOutcome::SkippedDriveRoot);
    }
    fs::create_dir_all(path).wrap_err(Operation::MakeDir, path)?;
    Ok(MakeDirOutcome::Created)
}

/// Copy the contents of `source` to `destination`.
///
/// The bytes land in a temp file beside `destination`, which then replaces
/// it with one rename; the source permissions come over with them. A failed
/// copy leaves the destination untouched. See [`CopyFlags`] for exclusive
/// creation and copy-on-write clones.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Any failure is reported as [`Operation::Copy`] naming both paths. With
/// [`CopyFlags::EXCL`] an existing destination fails with
/// [`io::ErrorKind::AlreadyExists`] and is left untouched.
pub fn copy_file_sync(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    flags: CopyFlags,
) -> Result<u64> {
    let (src, dst) = (source.as_ref(), destination.as_ref());
    copy_with_flags(src, dst, flags).wrap_err_pair(Operation::Copy, src, dst)
}

/// Flush `file` to disk and release it.
pub fn close_sync(file: File, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    file.sync_all().wrap_err(Operation::Close, path)
}

fn copy_with_flags(src: &Path, dst: &Path, flags: CopyFlags) -> io::Result<u64> {
    let exclusive = flags.contains(CopyFlags::EXCL);

    if flags.contains(CopyFlags::FICLONE_FORCE) {
        return clone_file(src, dst, exclusive);
    }

    if flags.contains(CopyFlags::FICLONE) {
        match clone_file(src, dst, exclusive) {
            Ok(bytes) => return Ok(bytes),
            Err(e) if exclusive && e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
            Err(_) => {}
        }
    }

    copy_staged(src, dst, exclusive, true)
}

/// Byte copy into a temp file beside `dst`, then an atomic rename over it.
///
/// The destination is never opened for writing, so a failed copy leaves it
/// as it was and copying a file onto itself keeps its contents. With
/// `keep_mode` off the temp file is created `0o666` less the umask on Unix.
pub(crate) fn copy_staged(
    src: &Path,
    dst: &Path,
    exclusive: bool,
    keep_mode: bool,
) -> io::Result<u64> {
    let mut reader = File::open(src)?;
    let src_meta = reader.metadata()?;

    // Fail before doing the work; persist_noclobber still guards the race.
    if exclusive && fs::symlink_metadata(dst).is_ok() {
        return Err(already_exists(dst));
    }

    let mut temp = staging_file(dst, keep_mode)?;
    // io::copy uses copy_file_range on Linux for File -> File
    let bytes = io::copy(&mut reader, temp.as_file_mut())?;
    if keep_mode {
        fs::set_permissions(temp.path(), src_meta.permissions())?;
    }
    let persisted = if exclusive {
        temp.persist_noclobber(dst)
    } else {
        temp.persist(dst)
    };
    persisted.map_err(|e| e.error)?;
    Ok(bytes)
}

/// Create the temp file a copy into `dst` is staged through.
pub(crate) fn staging_file(dst: &Path, keep_mode: bool) -> io::Result<NamedTempFile> {
    let dir = parent_or_cwd(dst);
    #[cfg(unix)]
    if !keep_mode {
        use std::os::unix::fs::PermissionsExt;
        return tempfile::Builder::new()
            .permissions(Permissions::from_mode(0o666))
            .tempfile_in(dir);
    }
    #[cfg(not(unix))]
    let _ = keep_mode;
    NamedTempFile::new_in(dir)
}

#[cfg(feature = "reflink")]
fn clone_file(src: &Path, dst: &Path, exclusive: bool) -> io::Result<u64> {
    if exclusive && fs::symlink_metadata(dst).is_ok() {
        return Err(already_exists(dst));
    }
    let len = fs::metadata(src)?.len();
    let temp = tempfile::Builder::new()
        .make_in(parent_or_cwd(dst), |path| reflink_copy::reflink(src, path))?;
    if exclusive {
        temp.persist_noclobber(dst).map_err(|e| e.error)?;
    } else {
        temp.persist(dst).map_err(|e| e.error)?;
    }
    Ok(len)
}

#[cfg(not(feature = "reflink"))]
fn clone_file(_src: &Path, _dst: &Path, _exclusive: bool) -> io::Result<u64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "copy-on-write clones require the `reflink` feature",
    ))
}

fn parent_or_cwd(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn already_exists(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("destination already exists: {}", path.display()),
    )
}

// =============================================================================
// Tests
// =============================================================================

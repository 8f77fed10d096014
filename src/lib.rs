//! # cpfile
//!
//! Copy a single file together with its timestamps and permissions, with
//! errors that say what failed and where.
//!
//! ## Core Features
//!
//! - **Contextual errors**: every failure is a [`CopyError`] naming the
//!   operation and path(s), with the OS error kept as its source
//! - **Blocking and async**: each primitive exists as `x_sync` (blocks the
//!   thread) and `x` (async, on tokio)
//! - **Parent creation**: missing destination directories are created
//! - **Metadata preserving**: access/modification times and permission bits
//! - **Staged copies**: bytes go to a temp file that is renamed over the
//!   destination, so a failed copy never leaves a half-written file;
//!   [`CopyFlags::EXCL`] makes the rename no-clobber
//! - **Windows drive roots**: `make_dir("C:\\")` is skipped instead of failing
//!
//! ## Quick Start
//!
//! ```no_run
//! use cpfile::{CopyOptions, copy_with_metadata_sync};
//!
//! copy_with_metadata_sync("src/notes.txt", "backup/2024/notes.txt", &CopyOptions::default())?;
//! # Ok::<(), cpfile::CopyError>(())
//! ```
//!
//! The async form runs on tokio:
//!
//! ```no_run
//! use cpfile::{CopyOptions, copy_with_metadata};
//!
//! # async fn run() -> cpfile::Result<()> {
//! let options = CopyOptions::default().without_overwrite();
//! let outcome = copy_with_metadata("in.bin", "out/in.bin", &options).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Primitives
//!
//! | Async | Blocking | Operation |
//! |-------|----------|-----------|
//! | [`stat`] | [`stat_sync`] | [`Operation::Stat`] |
//! | [`lstat`] | [`lstat_sync`] | [`Operation::Lstat`] |
//! | [`utimes`] | [`utimes_sync`] | [`Operation::Utimes`] |
//! | [`chmod`] | [`chmod_sync`] | [`Operation::Chmod`] |
//! | [`make_dir`] | [`make_dir_sync`] | [`Operation::MakeDir`] |
//! | | [`copy_file_sync`] | [`Operation::Copy`] |
//! | [`open_read_stream`] | | [`Operation::Read`] |
//! | [`open_write_stream`] | | [`Operation::Write`] |
//! | [`close`] | [`close_sync`] | [`Operation::Close`] |
//!
//! ## Errors
//!
//! ```no_run
//! use std::io;
//!
//! match cpfile::stat_sync("missing.txt") {
//!     Err(e) if e.kind() == io::ErrorKind::NotFound => eprintln!("{e}"),
//!     other => { other?; }
//! }
//! # Ok::<(), cpfile::CopyError>(())
//! ```
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Diagnostics (drive-root skips, no-clobber skips) via tracing |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] |
//! | `reflink` | Copy-on-write clones for [`CopyFlags::FICLONE`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod copy;
mod error;
mod fs;
mod options;
mod platform;

pub use copy::{CopyOutcome, copy_with_metadata, copy_with_metadata_sync};
pub use error::{CopyError, Operation, Result};
pub use fs::{
    MakeDirOutcome, ReadStream, StatRecord, chmod, chmod_sync, close, close_sync, copy_file_sync,
    lstat, lstat_sync, make_dir, make_dir_on, make_dir_sync, make_dir_sync_on, open_read_stream,
    open_write_stream, stat, stat_sync, utimes, utimes_sync,
};
pub use options::{CopyFlags, CopyOptions, DEFAULT_BUFFER_SIZE, ReadOptions, WriteOptions};
pub use platform::{Platform, is_drive_root};

pub use filetime::FileTime;

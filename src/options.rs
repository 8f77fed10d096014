//! Configuration options for copy operations.
//!
//! This module provides [`CopyOptions`] for the whole-file copy,
//! [`CopyFlags`] for the raw [`copy_file_sync`](crate::copy_file_sync)
//! primitive, and the stream options [`ReadOptions`] and [`WriteOptions`].
//!
//! # Example
//!
//! ```
//! use cpfile::CopyOptions;
//!
//! let options = CopyOptions::default()
//!     .without_overwrite()
//!     .without_timestamps();
//! ```

use std::ops::{BitOr, BitOrAssign};

/// Default buffer size for stream copies (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Options for [`copy_with_metadata`](crate::copy_with_metadata) and
/// [`copy_with_metadata_sync`](crate::copy_with_metadata_sync).
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `overwrite` | `true` | Replace an existing destination |
/// | `preserve_timestamps` | `true` | Copy atime/mtime from the source |
/// | `preserve_permissions` | `true` | Copy permission bits from the source |
/// | `buffer_size` | 64 KiB | Read buffer for the async copy |
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Whether to replace an existing destination (default: true)
    ///
    /// When false, an existing destination is left alone and the copy
    /// reports [`CopyOutcome::Skipped`](crate::CopyOutcome::Skipped).
    pub overwrite: bool,

    /// Whether to preserve access and modification times (default: true)
    pub preserve_timestamps: bool,

    /// Whether to preserve permission bits (default: true)
    pub preserve_permissions: bool,

    /// Read buffer size for the async copy (default: 64 KiB)
    pub buffer_size: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            preserve_timestamps: true,
            preserve_permissions: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl CopyOptions {
    /// Leave an existing destination untouched
    #[must_use]
    pub fn without_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }

    /// Set whether an existing destination is replaced
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Disable timestamp preservation
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.preserve_timestamps = false;
        self
    }

    /// Disable permission preservation
    ///
    /// The destination then keeps whatever mode it was created with.
    #[must_use]
    pub fn without_permissions(mut self) -> Self {
        self.preserve_permissions = false;
        self
    }

    /// Set the async read buffer size
    ///
    /// Value is clamped to at least 4 KiB.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096);
        self
    }

    pub(crate) fn read_options(&self) -> ReadOptions {
        ReadOptions::default().with_buffer_size(self.buffer_size)
    }
}

/// Flags for [`copy_file_sync`](crate::copy_file_sync).
///
/// Flags combine with `|`:
///
/// ```
/// use cpfile::CopyFlags;
///
/// let flags = CopyFlags::EXCL | CopyFlags::FICLONE;
/// assert!(flags.contains(CopyFlags::EXCL));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CopyFlags(u8);

impl CopyFlags {
    /// Plain copy, replacing any existing destination.
    pub const NONE: Self = Self(0);
    /// Fail with `AlreadyExists` if the destination exists.
    pub const EXCL: Self = Self(1);
    /// Try a copy-on-write clone, falling back to a byte copy.
    pub const FICLONE: Self = Self(1 << 1);
    /// Clone or fail; never falls back to a byte copy.
    pub const FICLONE_FORCE: Self = Self(1 << 2);

    /// Whether every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CopyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CopyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Options for [`open_read_stream`](crate::open_read_stream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Buffer capacity of the returned stream (default: 64 KiB)
    pub buffer_size: usize,
    /// Byte offset to start reading from (default: beginning)
    pub start: Option<u64>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            start: None,
        }
    }
}

impl ReadOptions {
    /// Set the buffer capacity (at least 1 byte)
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Start reading at byte `offset`
    #[must_use]
    pub fn with_start(mut self, offset: u64) -> Self {
        self.start = Some(offset);
        self
    }
}

/// Options for [`open_write_stream`](crate::open_write_stream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Truncate an existing file (true) or require a new one (false)
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

impl WriteOptions {
    /// Fail with `AlreadyExists` instead of truncating
    #[must_use]
    pub fn exclusive() -> Self {
        Self { overwrite: false }
    }
}

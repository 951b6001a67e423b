//! Core types shared by the sync paths.

use bitflags::bitflags;

/// Largest byte offset a file can address (`i64::MAX`).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// File descriptor as seen by callers of the syscall-style entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fd(pub i32);

/// Type of the object behind an open file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Block device.
    BlockDevice,
    /// Character device.
    CharDevice,
    /// Named pipe.
    Fifo,
    /// Unix socket.
    Socket,
}

impl FileType {
    /// Returns `true` if a byte range of this object can be synced.
    ///
    /// Pipes, sockets and character devices have no seekable data cache.
    #[inline]
    pub const fn supports_range_sync(self) -> bool {
        matches!(
            self,
            FileType::File | FileType::BlockDevice | FileType::Directory | FileType::Symlink
        )
    }
}

/// Inclusive byte range `[start, end]` over a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteRange {
    /// First byte.
    pub start: u64,
    /// Last byte, inclusive.
    pub end: u64,
}

impl ByteRange {
    /// The whole file, `[0, MAX_OFFSET]`.
    pub const WHOLE: Self = Self {
        start: 0,
        end: MAX_OFFSET,
    };

    /// Create a range from its first and last byte.
    #[inline]
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Range from `start` to the end of the file.
    #[inline]
    pub const fn to_end(start: u64) -> Self {
        Self {
            start,
            end: MAX_OFFSET,
        }
    }

    /// Returns `true` if the range runs to the end of the file.
    #[inline]
    pub const fn is_open_ended(&self) -> bool {
        self.end == MAX_OFFSET
    }
}

bitflags! {
    /// Phases requested from a range sync.
    ///
    /// The bit values match the Linux `SYNC_FILE_RANGE_*` constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RangeSyncFlags: u32 {
        /// Wait for writeback already in flight over the range.
        const WAIT_BEFORE = 1 << 0;
        /// Start writeback of dirty data in the range.
        const WRITE       = 1 << 1;
        /// Wait for writeback over the range, including what `WRITE` started.
        const WAIT_AFTER  = 1 << 2;
    }
}

/// Open-file flags relevant to write durability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenFlags {
    /// Writes must be data-durable on completion (`O_DSYNC`).
    pub dsync: bool,
    /// Writes must also make all metadata durable (`O_SYNC`).
    pub sync: bool,
}

impl OpenFlags {
    /// Ordinary buffered writes.
    pub const BUFFERED: Self = Self {
        dsync: false,
        sync: false,
    };

    /// Data-synchronous writes.
    pub const DSYNC: Self = Self {
        dsync: true,
        sync: false,
    };

    /// Fully synchronous writes. Implies `dsync`.
    pub const SYNC: Self = Self {
        dsync: true,
        sync: true,
    };
}

/// Why a writeback was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WritebackReason {
    /// Explicit sync request.
    Sync,
    /// Periodic background sync. Never produced here: sweeps and the async
    /// volume pass both tag their writeback with [`Sync`](Self::Sync).
    Periodic,
}

/// Which quota types a quota sync covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuotaType {
    /// Per-user quotas.
    User,
    /// Per-group quotas.
    Group,
    /// Per-project quotas.
    Project,
    /// Every quota type.
    All,
}

//! Open file abstraction.

use std::path::Path;
use std::sync::Arc;

use crate::{ByteRange, FileType, OpenFlags, SyncError, Volume};

/// The file's own durability operation (`fsync` in a filesystem's file ops).
pub trait FsyncOp: Send + Sync {
    /// Make `range` durable together with its metadata.
    ///
    /// With `datasync` set, only metadata needed to read the data back is
    /// written.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Io`] for underlying I/O errors
    fn fsync_range(&self, range: ByteRange, datasync: bool) -> Result<(), SyncError>;
}

/// Page cache of a file.
pub trait PageMapping: Send + Sync {
    /// Wait for writeback currently in flight over `range`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Io`] if a completed writeback in the range failed
    fn fdatawait_range(&self, range: ByteRange) -> Result<(), SyncError>;

    /// Start writeback of dirty pages in `range` without waiting.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Io`] if writeback could not be issued
    fn fdatawrite_range(&self, range: ByteRange) -> Result<(), SyncError>;
}

/// An open file.
///
/// Absent capabilities are reported as `None` from
/// [`fsync_op`](SyncFile::fsync_op) and [`mapping`](SyncFile::mapping).
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn SyncFile`.
pub trait SyncFile: Send + Sync {
    /// Path for diagnostics, if one can be produced.
    fn path(&self) -> Option<&Path>;

    /// Type of the underlying object.
    fn file_type(&self) -> FileType;

    /// Flags the file was opened with.
    fn open_flags(&self) -> OpenFlags;

    /// Returns `true` if the inode itself demands synchronous writes.
    fn inode_is_sync(&self) -> bool;

    /// Volume the file lives on.
    fn volume(&self) -> Arc<dyn Volume>;

    /// Durability operation, if this file type supports one.
    fn fsync_op(&self) -> Option<&dyn FsyncOp>;

    /// Page cache, if the file has one.
    fn mapping(&self) -> Option<&dyn PageMapping>;
}

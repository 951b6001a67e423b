//! Whole-file and write-completion durability.

use std::thread;
use std::time::Instant;

use tracing::info;

use crate::{ByteRange, Fd, SyncCoordinator, SyncError, SyncFile};

/// Make `range` of `file` durable through the file's own fsync operation.
///
/// # Errors
///
/// - [`SyncError::InvalidArgument`] if the file type has no fsync operation
/// - [`SyncError::Io`] from the backend
pub fn fsync_range(file: &dyn SyncFile, range: ByteRange, datasync: bool) -> Result<(), SyncError> {
    let op = file
        .fsync_op()
        .ok_or_else(|| SyncError::invalid("fsync", "file type does not support fsync"))?;
    op.fsync_range(range, datasync)
}

impl SyncCoordinator {
    /// Make `range` of `file` durable, with only data-access metadata when
    /// `datasync` is set.
    ///
    /// Succeeds without touching the backend while durability is deferred.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidArgument`] if the file type has no fsync operation
    /// - [`SyncError::Io`] from the backend
    pub fn fsync_range(
        &self,
        file: &dyn SyncFile,
        range: ByteRange,
        datasync: bool,
    ) -> Result<(), SyncError> {
        if self.durability_bypassed() {
            return Ok(());
        }
        fsync_range(file, range, datasync)
    }

    /// [`fsync_range`](Self::fsync_range) over the whole file.
    ///
    /// # Errors
    ///
    /// Same as [`fsync_range`](Self::fsync_range).
    pub fn fsync_file(&self, file: &dyn SyncFile, datasync: bool) -> Result<(), SyncError> {
        self.fsync_range(file, ByteRange::WHOLE, datasync)
    }

    /// Make the file behind `fd` durable, data and metadata.
    ///
    /// # Errors
    ///
    /// - [`SyncError::BadFileDescriptor`] if `fd` does not resolve
    /// - [`SyncError::InvalidArgument`] if the file type has no fsync operation
    /// - [`SyncError::Io`] from the backend
    pub fn fsync(&self, fd: Fd) -> Result<(), SyncError> {
        if self.durability_bypassed() {
            return Ok(());
        }
        self.fsync_fd(fd, false)
    }

    /// Make the file behind `fd` durable, data and the metadata needed to
    /// read it back.
    ///
    /// # Errors
    ///
    /// Same as [`fsync`](Self::fsync).
    pub fn fdatasync(&self, fd: Fd) -> Result<(), SyncError> {
        self.fsync_fd(fd, true)
    }

    fn fsync_fd(&self, fd: Fd, datasync: bool) -> Result<(), SyncError> {
        let file = self.resolve(fd)?;
        let started = Instant::now();
        let result = self.fsync_file(file.as_ref(), datasync);
        let elapsed = started.elapsed();

        if elapsed >= self.config.slow_fsync_threshold {
            let path = file
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unknown)".to_owned());
            let current = thread::current();
            info!(
                pid = std::process::id(),
                thread = current.name().unwrap_or("<unnamed>"),
                elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
                path = %path,
                datasync,
                "slow fsync"
            );
        }
        result
    }

    /// Durability check after a buffered write of `count` bytes at `pos`.
    ///
    /// Does nothing unless the file was opened `O_DSYNC` (or `O_SYNC`) or its
    /// inode is marked synchronous. Then the written bytes are synced, with
    /// full metadata only under `O_SYNC`. A zero-length write has nothing to
    /// sync.
    ///
    /// # Errors
    ///
    /// Same as [`fsync_range`](Self::fsync_range).
    pub fn on_write_completed(
        &self,
        file: &dyn SyncFile,
        pos: u64,
        count: u64,
    ) -> Result<(), SyncError> {
        let flags = file.open_flags();
        if !flags.dsync && !flags.sync && !file.inode_is_sync() {
            return Ok(());
        }
        if count == 0 {
            return Ok(());
        }
        let end = pos.saturating_add(count - 1);
        self.fsync_range(file, ByteRange::new(pos, end), !flags.sync)
    }
}

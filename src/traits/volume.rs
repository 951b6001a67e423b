//! Mounted volume abstraction.

use parking_lot::RwLock;

use crate::{QuotaType, SyncError, WritebackReason};

/// Quota flushing hook for a volume.
pub trait QuotaSync: Send + Sync {
    /// Write quota state for `quota_type` to storage, waiting iff `wait`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Io`] for underlying I/O errors
    fn quota_sync(&self, quota_type: QuotaType, wait: bool) -> Result<(), SyncError>;
}

/// Filesystem-level sync hook, run after inode writeback.
pub trait FsSyncHook: Send + Sync {
    /// Flush filesystem-private state (journal, superblock), waiting iff `wait`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Io`] for underlying I/O errors
    fn sync_fs(&self, wait: bool) -> Result<(), SyncError>;
}

/// One mounted storage unit.
///
/// Volumes are owned by the mount subsystem. The sync paths only observe them
/// for the duration of a sweep.
///
/// Optional hooks are reached through [`quota`](Volume::quota) and
/// [`fs_sync`](Volume::fs_sync), which return `None` when the volume does not
/// support the operation.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn Volume`.
pub trait Volume: Send + Sync {
    /// Human-readable identifier, used in diagnostics.
    fn name(&self) -> &str;

    /// Returns `true` if the volume is mounted read-only.
    fn is_read_only(&self) -> bool;

    /// Returns `false` for pseudo volumes with nothing to write back.
    fn has_backing_store(&self) -> bool;

    /// Lock excluding unmount while held.
    ///
    /// Single-volume sync requires the caller to hold this at least for read.
    /// The sync paths inspect it but never acquire it, except
    /// [`SyncCoordinator::syncfs`](crate::SyncCoordinator::syncfs).
    fn umount_lock(&self) -> &RwLock<()>;

    /// Start writeback of every dirty inode without waiting.
    fn writeback_inodes(&self, reason: WritebackReason);

    /// Write back every dirty inode and wait for completion.
    fn sync_inodes(&self);

    /// Quota hook, if the volume has quotas enabled.
    fn quota(&self) -> Option<&dyn QuotaSync>;

    /// Filesystem-level sync hook, if the filesystem has one.
    fn fs_sync(&self) -> Option<&dyn FsSyncHook>;

    /// Flush the underlying block device cache, waiting iff `wait`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Io`] for underlying I/O errors
    fn flush_blockdev(&self, wait: bool) -> Result<(), SyncError>;
}

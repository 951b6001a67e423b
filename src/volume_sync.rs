//! Per-volume sync and the two-pass sweep over every mounted volume.
//!
//! A sweep first starts writeback on every writable volume without waiting,
//! then walks the volumes again and waits on each. All volumes have I/O in
//! flight before the first wait begins, so the sweep costs roughly one wait
//! rather than one wait per volume.

use tracing::{debug, info, warn};

use crate::{MountTable, QuotaType, SyncError, Volume, WritebackReason};

/// One flush pass over a single volume.
///
/// Steps, in order: quota sync, inode writeback (blocking iff `wait`), the
/// filesystem's own sync hook, block device flush. Only the block device
/// flush decides the result; quota and hook failures are logged and dropped
/// so that the later steps still run.
///
/// Volumes without a backing store succeed without touching anything.
/// Callers filter out read-only volumes.
///
/// # Errors
///
/// - [`SyncError::Io`] if the block device flush fails
pub fn sync_volume(volume: &dyn Volume, wait: bool) -> Result<(), SyncError> {
    if !volume.has_backing_store() {
        return Ok(());
    }

    if let Some(quota) = volume.quota() {
        if let Err(err) = quota.quota_sync(QuotaType::All, wait) {
            debug!(volume = volume.name(), wait, %err, "quota sync failed");
        }
    }

    if wait {
        volume.sync_inodes();
    } else {
        volume.writeback_inodes(WritebackReason::Sync);
    }

    if let Some(hook) = volume.fs_sync() {
        if let Err(err) = hook.sync_fs(wait) {
            debug!(volume = volume.name(), wait, %err, "filesystem sync hook failed");
        }
    }

    volume.flush_blockdev(wait)
}

/// Run [`sync_volume`] on every writable mounted volume.
///
/// Per-volume errors are not reported; a sweep always visits every volume.
pub fn sync_volumes(mounts: &dyn MountTable, wait: bool) {
    mounts.for_each_volume(&mut |volume| {
        if volume.is_read_only() {
            return;
        }
        if let Err(err) = sync_volume(volume, wait) {
            debug!(volume = volume.name(), wait, %err, "volume sync failed during sweep");
        }
    });
}

/// Full sweep: start writeback everywhere, then wait everywhere.
pub fn sync_all_volumes(mounts: &dyn MountTable) {
    sync_volumes(mounts, false);
    sync_volumes(mounts, true);
}

/// Make one volume durable.
///
/// Runs an async pass followed by a wait pass and returns the wait pass's
/// result. A failing async pass is returned without attempting the wait
/// pass. With `force_wait` set (emergency read-only remount in progress) the
/// first pass waits as well.
///
/// The caller must hold the volume's [`umount_lock`](Volume::umount_lock) at
/// least for read. Read-only volumes succeed immediately.
///
/// # Errors
///
/// - [`SyncError::Io`] if a block device flush fails; an async-pass failure
///   short-circuits, so the wait pass does not run
pub fn sync_one_volume(volume: &dyn Volume, force_wait: bool) -> Result<(), SyncError> {
    if !volume.umount_lock().is_locked() {
        warn!(volume = volume.name(), "volume synced without holding its unmount lock");
        debug_assert!(false, "unmount lock not held for {}", volume.name());
    }

    if volume.is_read_only() {
        return Ok(());
    }

    if force_wait {
        info!(volume = volume.name(), "force sync fs in wait mode");
        sync_volume(volume, true)?;
    } else {
        sync_volume(volume, false)?;
    }
    sync_volume(volume, true)
}

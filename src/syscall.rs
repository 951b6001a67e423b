//! # Syscall Surface
//!
//! Raw-integer entry points in the kernel's calling convention: `0` on
//! success, a negative errno on failure.
//!
//! | Function | Errors |
//! |----------|--------|
//! | [`sys_sync`] | never fails |
//! | [`sys_syncfs`] | `EBADF`, backend |
//! | [`sys_fsync`], [`sys_fdatasync`] | `EBADF`, `EINVAL`, backend |
//! | [`sys_sync_file_range`], [`sys_sync_file_range2`] | `EINVAL`, `EBADF`, `ESPIPE`, backend |

use crate::{Fd, SyncCoordinator, SyncError};

/// Convert a result to a syscall return value.
pub fn to_retval(result: Result<(), SyncError>) -> i64 {
    match result {
        Ok(()) => 0,
        Err(err) => -i64::from(err.errno()),
    }
}

/// `sync(2)`.
pub fn sys_sync(coordinator: &SyncCoordinator) -> i64 {
    coordinator.sync();
    0
}

/// `syncfs(2)`.
pub fn sys_syncfs(coordinator: &SyncCoordinator, fd: i32) -> i64 {
    to_retval(coordinator.syncfs(Fd(fd)))
}

/// `fsync(2)`.
pub fn sys_fsync(coordinator: &SyncCoordinator, fd: i32) -> i64 {
    to_retval(coordinator.fsync(Fd(fd)))
}

/// `fdatasync(2)`.
pub fn sys_fdatasync(coordinator: &SyncCoordinator, fd: i32) -> i64 {
    to_retval(coordinator.fdatasync(Fd(fd)))
}

/// `sync_file_range(2)`.
pub fn sys_sync_file_range(
    coordinator: &SyncCoordinator,
    fd: i32,
    offset: i64,
    nbytes: i64,
    flags: u32,
) -> i64 {
    to_retval(coordinator.sync_file_range(Fd(fd), offset, nbytes, flags))
}

/// `sync_file_range2(2)`: flags ahead of the 64-bit arguments, for ABIs that
/// align register pairs.
pub fn sys_sync_file_range2(
    coordinator: &SyncCoordinator,
    fd: i32,
    flags: u32,
    offset: i64,
    nbytes: i64,
) -> i64 {
    to_retval(coordinator.sync_file_range2(Fd(fd), flags, offset, nbytes))
}

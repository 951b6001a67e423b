//! # anyfs-sync
//!
//! Durability coordination for **AnyFS** volumes and open files.
//!
//! This crate decides *when* and *in what order* storage is made durable. The
//! storage itself (volumes, page cache, block devices, flusher threads) is
//! supplied by the host through the traits in this crate.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use anyfs_sync::{Fd, FileTable, MountTable, SyncCoordinator, SyncFile, Volume};
//! use std::sync::Arc;
//!
//! struct Mounts;
//! impl MountTable for Mounts {
//!     fn for_each_volume(&self, _f: &mut dyn FnMut(&dyn Volume)) {}
//! }
//!
//! struct Files;
//! impl FileTable for Files {
//!     fn get(&self, _fd: Fd) -> Option<Arc<dyn SyncFile>> { None }
//! }
//!
//! let coordinator = SyncCoordinator::builder(Arc::new(Mounts), Arc::new(Files)).build();
//!
//! // Whole-system sync: concurrent callers share sweeps.
//! coordinator.sync();
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`SyncCoordinator`] | Every entry point: `sync`, `syncfs`, `fsync`, `sync_file_range`, ... |
//! | [`SyncConfig`] | Deferred fsync, laptop mode, slow-fsync threshold, page index limit |
//! | [`SyncError`] | Error type with errno mapping |
//! | [`RangeSyncFlags`] | `WAIT_BEFORE`, `WRITE`, `WAIT_AFTER` |
//! | [`ByteRange`] | Inclusive byte interval, [`ByteRange::WHOLE`] for the full file |
//!
//! ---
//!
//! ## Operations
//!
//! **Whole system**: [`SyncCoordinator::sync`]
//! - Two-pass sweep over every writable volume: start writeback everywhere,
//!   then wait everywhere.
//! - Callers that arrive while a sweep runs are folded into the next one.
//!
//! **One volume**: [`SyncCoordinator::syncfs`], [`SyncCoordinator::sync_filesystem`]
//! - Async pass then wait pass; both wait during an emergency remount.
//!
//! **One file**: [`SyncCoordinator::fsync`], [`SyncCoordinator::fdatasync`],
//! [`SyncCoordinator::on_write_completed`]
//!
//! **Byte range**: [`SyncCoordinator::sync_file_range`]
//! - Phases run in the order wait-before, write, wait-after, each optional.
//!
//! **Never blocking**: [`SyncCoordinator::emergency_sync`]
//! - Queues two async sweeps and returns.
//!
//! ---
//!
//! ## Error Handling
//!
//! Argument errors are raised before any backend is touched:
//!
//! ```rust
//! use anyfs_sync::{normalize_range, SyncError};
//!
//! let err = normalize_range(i64::MAX, 1, None).unwrap_err();
//! assert!(matches!(err, SyncError::InvalidArgument { .. }));
//! assert_eq!(err.errno(), libc::EINVAL);
//! ```
//!
//! Backend errors are best effort: a sweep visits every volume regardless of
//! failures, and a volume sync reports only its final block flush.
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. [`SyncCoordinator`] is shared by
//! reference or `Arc` across threads.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`SyncConfig`] and the value types, plus `SyncConfig::from_json` |

// Private modules
mod config;
mod coordinator;
mod error;
mod fsync;
mod generation;
mod range_sync;
mod traits;
mod types;
mod volume_sync;

pub mod syscall;

#[cfg(test)]
mod test_support;

// Public re-exports - error types
pub use error::SyncError;

// Public re-exports - core types
pub use types::{
    ByteRange, Fd, FileType, MAX_OFFSET, OpenFlags, QuotaType, RangeSyncFlags, WritebackReason,
};

// Public re-exports - configuration and entry point
pub use config::SyncConfig;
pub use coordinator::{SyncCoordinator, SyncCoordinatorBuilder};

// Public re-exports - collaborator traits
pub use traits::{
    FileTable, Flusher, FsSyncHook, FsyncOp, Job, MountTable, NoopFlusher, PageMapping, QuotaSync,
    SyncFile, ThreadWorkQueue, Volume, WorkQueue,
};

// Public re-exports - building blocks
pub use fsync::fsync_range;
pub use generation::{in_progress, seq_at_least, sweep_target};
pub use range_sync::{RangeSyncPhase, normalize_range, parse_flags, sync_range};
pub use volume_sync::{sync_all_volumes, sync_one_volume, sync_volume, sync_volumes};

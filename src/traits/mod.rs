//! # Collaborator Traits
//!
//! The storage stack that the sync paths drive but do not implement.
//!
//! ## Quick Reference
//!
//! | Trait | Role |
//! |-------|------|
//! | [`Volume`] | One mounted volume: inode writeback, block flush, optional hooks |
//! | [`QuotaSync`], [`FsSyncHook`] | Optional per-volume hooks |
//! | [`SyncFile`] | One open file: type, flags, optional fsync op and page cache |
//! | [`FsyncOp`], [`PageMapping`] | Optional per-file capabilities |
//! | [`MountTable`] | Visits every mounted volume |
//! | [`FileTable`] | Resolves descriptors |
//! | [`Flusher`] | Background writeback threads |
//! | [`WorkQueue`] | Runs fire-and-forget jobs |
//!
//! ## Optional Capabilities
//!
//! A hook the backend may lack is exposed as a required accessor returning
//! `Option<&dyn Hook>`. Callers check for `None` explicitly; there are no
//! default method bodies standing in for missing support.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. Backends use interior
//! mutability.

mod file;
mod flusher;
mod tables;
mod volume;

pub use file::{FsyncOp, PageMapping, SyncFile};
pub use flusher::{Flusher, Job, NoopFlusher, ThreadWorkQueue, WorkQueue};
pub use tables::{FileTable, MountTable};
pub use volume::{FsSyncHook, QuotaSync, Volume};

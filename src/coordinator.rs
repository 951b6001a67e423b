//! # Sync Coordinator
//!
//! Owns the state shared by every durability request: the sweep generation
//! counter, the lock serializing sweeps, and the runtime flags.
//!
//! ## Coalescing
//!
//! [`SyncCoordinator::sync`] promises that a full sweep which started no
//! earlier than the call has completed by the time it returns. Sweeps run one
//! at a time under a mutex; a caller that finds, once it holds the mutex,
//! that such a sweep already ran while it waited returns without sweeping
//! again. Any number of concurrent callers can share one sweep.
//!
//! ```text
//! caller A   snap=0 ── lock ── seq 1 ── sweep ── seq 2 ── unlock
//! caller B   snap=0 ─────────── wait for lock ──────────── lock: 2 >= 2, return
//! caller C   snap=1 ─────────── wait for lock ──────────── lock: 2 <  4, sweep
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering, fence};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::generation::{Generation, in_progress, seq_at_least, sweep_target};
use crate::volume_sync::{sync_all_volumes, sync_one_volume, sync_volumes};
use crate::{
    Fd, FileTable, Flusher, Job, MountTable, NoopFlusher, SyncConfig, SyncError, SyncFile,
    ThreadWorkQueue, Volume, WorkQueue, WritebackReason,
};

/// Entry point for every durability request.
///
/// Coordinators are independent of each other; each has its own counter and
/// sweep lock.
///
/// # Examples
///
/// ```rust
/// use anyfs_sync::{Fd, FileTable, MountTable, SyncCoordinator, SyncFile, Volume};
/// use std::sync::Arc;
///
/// struct NoMounts;
/// impl MountTable for NoMounts {
///     fn for_each_volume(&self, _: &mut dyn FnMut(&dyn Volume)) {}
/// }
///
/// struct NoFiles;
/// impl FileTable for NoFiles {
///     fn get(&self, _: Fd) -> Option<Arc<dyn SyncFile>> { None }
/// }
///
/// let coordinator = SyncCoordinator::builder(Arc::new(NoMounts), Arc::new(NoFiles)).build();
/// coordinator.sync();
/// assert_eq!(coordinator.generation(), 2);
/// assert!(coordinator.fsync(Fd(3)).is_err());
/// ```
pub struct SyncCoordinator {
    pub(crate) mounts: Arc<dyn MountTable>,
    pub(crate) files: Arc<dyn FileTable>,
    pub(crate) flusher: Arc<dyn Flusher>,
    pub(crate) work_queue: Arc<dyn WorkQueue>,
    pub(crate) config: SyncConfig,
    generation: Generation,
    sweep_lock: Mutex<()>,
    emergency_remount: AtomicBool,
    suspended: AtomicBool,
}

/// Builder for [`SyncCoordinator`].
pub struct SyncCoordinatorBuilder {
    mounts: Arc<dyn MountTable>,
    files: Arc<dyn FileTable>,
    flusher: Arc<dyn Flusher>,
    work_queue: Arc<dyn WorkQueue>,
    config: SyncConfig,
}

impl SyncCoordinatorBuilder {
    /// Background flushers to wake at the start of each sweep.
    pub fn flusher(mut self, flusher: Arc<dyn Flusher>) -> Self {
        self.flusher = flusher;
        self
    }

    /// Facility running [`emergency_sync`](SyncCoordinator::emergency_sync) jobs.
    pub fn work_queue(mut self, work_queue: Arc<dyn WorkQueue>) -> Self {
        self.work_queue = work_queue;
        self
    }

    /// Runtime configuration.
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the coordinator with an idle generation counter.
    pub fn build(self) -> SyncCoordinator {
        SyncCoordinator {
            mounts: self.mounts,
            files: self.files,
            flusher: self.flusher,
            work_queue: self.work_queue,
            config: self.config,
            generation: Generation::default(),
            sweep_lock: Mutex::new(()),
            emergency_remount: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
        }
    }
}

impl SyncCoordinator {
    /// Start building a coordinator over `mounts` and `files`.
    pub fn builder(
        mounts: Arc<dyn MountTable>,
        files: Arc<dyn FileTable>,
    ) -> SyncCoordinatorBuilder {
        SyncCoordinatorBuilder {
            mounts,
            files,
            flusher: Arc::new(NoopFlusher),
            work_queue: Arc::new(ThreadWorkQueue::named("emergency-sync")),
            config: SyncConfig::default(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current generation counter. Odd while a sweep is running.
    pub fn generation(&self) -> u64 {
        self.generation.load()
    }

    /// Flag an emergency read-only remount.
    ///
    /// While set, single-volume syncs wait on their first pass too.
    pub fn set_emergency_remount(&self, active: bool) {
        self.emergency_remount.store(active, Ordering::SeqCst);
    }

    /// Record whether the system is entering suspend.
    ///
    /// Only matters with [`SyncConfig::deferred_fsync`]: per-file durability
    /// is skipped while awake and honored while suspending.
    pub fn set_suspended(&self, suspended: bool) {
        self.suspended.store(suspended, Ordering::SeqCst);
    }

    pub(crate) fn durability_bypassed(&self) -> bool {
        self.config.deferred_fsync && !self.suspended.load(Ordering::SeqCst)
    }

    pub(crate) fn resolve(&self, fd: Fd) -> Result<Arc<dyn SyncFile>, SyncError> {
        self.files
            .get(fd)
            .ok_or(SyncError::BadFileDescriptor { fd })
    }

    /// Make every writable volume durable.
    ///
    /// On return, a full sweep that started no earlier than this call has
    /// completed. Concurrent callers share sweeps. Never fails; per-volume
    /// errors are absorbed by the sweep.
    pub fn sync(&self) {
        let snap = self.generation.load();
        // Keep the snapshot ahead of everything done under the lock.
        fence(Ordering::SeqCst);
        self.sync_since(snap);
    }

    fn sync_since(&self, snap: u64) {
        let _guard = self.sweep_lock.lock();
        let snap_done = self.generation.load();

        if seq_at_least(snap_done, sweep_target(snap)) {
            fence(Ordering::SeqCst);
            debug!(snap, snap_done, "sync satisfied by a completed sweep");
            return;
        }

        let seq = self.generation.advance();
        check_parity(seq, true);
        fence(Ordering::SeqCst);

        // Closes the sweep even if a backend unwinds out of it.
        let _end = SweepEnd(&self.generation);
        self.run_sweep(seq);
    }

    fn run_sweep(&self, seq: u64) {
        debug!(seq, "sync sweep started");
        self.flusher.wake_flushers(WritebackReason::Sync);
        sync_all_volumes(self.mounts.as_ref());
        if self.config.laptop_mode {
            self.flusher.laptop_sync_completion();
        }
        debug!(seq, "sync sweep finished");
    }

    /// Queue two non-waiting sweeps on the work queue and return at once.
    ///
    /// For callers that must never block: the job bypasses the sweep lock and
    /// may overlap an ordinary [`sync`](Self::sync). If the job cannot be
    /// queued the request is dropped.
    pub fn emergency_sync(&self) {
        let mounts = Arc::clone(&self.mounts);
        let job: Job = Box::new(move || {
            sync_volumes(mounts.as_ref(), false);
            sync_volumes(mounts.as_ref(), false);
            info!("emergency sync complete");
        });
        if let Err(err) = self.work_queue.schedule(job) {
            debug!(%err, "emergency sync dropped");
        }
    }

    /// Make one volume durable. The caller holds its unmount lock.
    ///
    /// Honors the emergency remount flag.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Io`] if a block device flush fails
    pub fn sync_filesystem(&self, volume: &dyn Volume) -> Result<(), SyncError> {
        sync_one_volume(volume, self.emergency_remount.load(Ordering::SeqCst))
    }

    /// Make the volume holding `fd` durable.
    ///
    /// # Errors
    ///
    /// - [`SyncError::BadFileDescriptor`] if `fd` does not resolve
    /// - [`SyncError::Io`] if a block device flush fails
    pub fn syncfs(&self, fd: Fd) -> Result<(), SyncError> {
        let file = self.resolve(fd)?;
        let volume = file.volume();
        let _guard = volume.umount_lock().read();
        self.sync_filesystem(volume.as_ref())
    }
}

/// Returns the counter to even when dropped. Lives only under the sweep lock.
struct SweepEnd<'a>(&'a Generation);

impl Drop for SweepEnd<'_> {
    fn drop(&mut self) {
        fence(Ordering::SeqCst);
        let seq = self.0.advance();
        check_parity(seq, false);
    }
}

fn check_parity(seq: u64, expect_running: bool) {
    if in_progress(seq) != expect_running {
        warn!(seq, expect_running, "sync generation has unexpected parity");
        debug_assert!(false, "sync generation {seq} has unexpected parity");
    }
}

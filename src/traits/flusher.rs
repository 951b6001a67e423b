//! Background writeback scheduler and the async job facility.

use std::io;
use std::thread;

use crate::WritebackReason;

/// Background flusher threads.
pub trait Flusher: Send + Sync {
    /// Ask the flushers to start writeback now instead of on their timer.
    fn wake_flushers(&self, reason: WritebackReason);

    /// Hook run after a full sweep while laptop mode is on.
    fn laptop_sync_completion(&self);
}

/// A flusher that has nothing to wake.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFlusher;

impl Flusher for NoopFlusher {
    fn wake_flushers(&self, _reason: WritebackReason) {}

    fn laptop_sync_completion(&self) {}
}

/// Boxed fire-and-forget job.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Facility that runs jobs asynchronously.
pub trait WorkQueue: Send + Sync {
    /// Queue `job` to run later on another thread.
    ///
    /// Must not block on the job itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the job could not be queued. The job is dropped.
    fn schedule(&self, job: Job) -> io::Result<()>;
}

/// Runs each job on a freshly spawned, detached thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadWorkQueue {
    name: Option<String>,
}

impl ThreadWorkQueue {
    /// Name spawned threads `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl WorkQueue for ThreadWorkQueue {
    fn schedule(&self, job: Job) -> io::Result<()> {
        let mut builder = thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        builder.spawn(job).map(|_| ())
    }
}

//! Lookup tables owned by the host: mounted volumes and open descriptors.

use std::sync::Arc;

use crate::{Fd, SyncFile, Volume};

/// Iteration over every mounted volume.
///
/// Each call must visit every volume mounted at the time of the call exactly
/// once. Order is unspecified.
pub trait MountTable: Send + Sync {
    /// Call `f` on every mounted volume.
    ///
    /// Implementations should hold each volume's unmount lock for read while
    /// `f` runs on it.
    fn for_each_volume(&self, f: &mut dyn FnMut(&dyn Volume));
}

/// Resolution of descriptors to open files.
pub trait FileTable: Send + Sync {
    /// Look up the open file behind `fd`.
    fn get(&self, fd: Fd) -> Option<Arc<dyn SyncFile>>;
}

//! Runtime configuration for a [`SyncCoordinator`](crate::SyncCoordinator).

use std::time::Duration;

/// Tunables for the sync paths.
///
/// The default keeps every durability request honest: nothing is deferred,
/// laptop mode is off, and fsyncs taking five seconds or more are logged.
///
/// # Examples
///
/// ```rust
/// use anyfs_sync::SyncConfig;
/// use std::time::Duration;
///
/// let config = SyncConfig::default()
///     .with_laptop_mode(true)
///     .with_slow_fsync_threshold(Duration::from_secs(1));
/// assert!(!config.deferred_fsync);
/// assert!(config.laptop_mode);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncConfig {
    /// Skip per-file durability while the system is awake.
    ///
    /// Requests are honored again once
    /// [`set_suspended(true)`](crate::SyncCoordinator::set_suspended) is called.
    pub deferred_fsync: bool,
    /// Run the flusher's laptop-mode completion hook after each full sweep.
    pub laptop_mode: bool,
    /// Per-file syncs at least this slow are logged.
    pub slow_fsync_threshold: Duration,
    /// Byte offset past which the page cache cannot index.
    ///
    /// `None` when page indices are 64-bit.
    pub page_index_limit: Option<u64>,
}

const PAGE_SHIFT: u32 = 12;

impl SyncConfig {
    /// Page cache offset limit for 32-bit page indices with 4 KiB pages.
    pub const PAGE_INDEX_LIMIT_32: u64 = 0x1_0000_0000 << PAGE_SHIFT;

    /// Set [`deferred_fsync`](Self::deferred_fsync).
    pub fn with_deferred_fsync(mut self, deferred: bool) -> Self {
        self.deferred_fsync = deferred;
        self
    }

    /// Set [`laptop_mode`](Self::laptop_mode).
    pub fn with_laptop_mode(mut self, laptop_mode: bool) -> Self {
        self.laptop_mode = laptop_mode;
        self
    }

    /// Set [`slow_fsync_threshold`](Self::slow_fsync_threshold).
    pub fn with_slow_fsync_threshold(mut self, threshold: Duration) -> Self {
        self.slow_fsync_threshold = threshold;
        self
    }

    /// Set [`page_index_limit`](Self::page_index_limit).
    pub fn with_page_index_limit(mut self, limit: Option<u64>) -> Self {
        self.page_index_limit = limit;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Config`](crate::SyncError::Config) if the JSON is malformed
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, crate::SyncError> {
        serde_json::from_str(json).map_err(|e| crate::SyncError::Config(e.to_string()))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        let page_index_limit = if cfg!(target_pointer_width = "32") {
            Some(Self::PAGE_INDEX_LIMIT_32)
        } else {
            None
        };
        Self {
            deferred_fsync: false,
            laptop_mode: false,
            slow_fsync_threshold: Duration::from_secs(5),
            page_index_limit,
        }
    }
}

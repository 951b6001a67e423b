//! Byte-range sync with independently selectable phases.
//!
//! A request runs up to three phases, always in this order:
//!
//! ```text
//! WaitBefore ──▶ Write ──▶ WaitAfter
//! ```
//!
//! Each phase runs only if its flag is set. A failing phase ends the request
//! with its error. `WAIT_BEFORE | WAIT_AFTER` without `WRITE` is valid: wait
//! for current writeback, then wait again.

use tracing::trace;

use crate::{
    ByteRange, Fd, MAX_OFFSET, PageMapping, RangeSyncFlags, SyncCoordinator, SyncError, SyncFile,
};

const OP: &str = "sync_file_range";

/// One step of a range sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSyncPhase {
    /// Wait for writeback already in flight.
    WaitBefore,
    /// Start writeback of dirty data.
    Write,
    /// Wait for writeback, including what `Write` started.
    WaitAfter,
}

impl RangeSyncPhase {
    /// Every phase in execution order.
    pub const ORDER: [RangeSyncPhase; 3] = [
        RangeSyncPhase::WaitBefore,
        RangeSyncPhase::Write,
        RangeSyncPhase::WaitAfter,
    ];

    /// Flag bit enabling this phase.
    pub const fn flag(self) -> RangeSyncFlags {
        match self {
            RangeSyncPhase::WaitBefore => RangeSyncFlags::WAIT_BEFORE,
            RangeSyncPhase::Write => RangeSyncFlags::WRITE,
            RangeSyncPhase::WaitAfter => RangeSyncFlags::WAIT_AFTER,
        }
    }

    fn run(self, mapping: &dyn PageMapping, range: ByteRange) -> Result<(), SyncError> {
        match self {
            RangeSyncPhase::WaitBefore | RangeSyncPhase::WaitAfter => {
                mapping.fdatawait_range(range)
            }
            RangeSyncPhase::Write => mapping.fdatawrite_range(range),
        }
    }
}

/// Decode raw phase flags.
///
/// # Errors
///
/// - [`SyncError::InvalidArgument`] if any unknown bit is set
pub fn parse_flags(raw: u32) -> Result<RangeSyncFlags, SyncError> {
    RangeSyncFlags::from_bits(raw).ok_or_else(|| SyncError::invalid(OP, "unknown flag bits"))
}

/// Turn a caller's `(offset, nbytes)` into an inclusive range.
///
/// `nbytes == 0` means "to end of file". Returns `Ok(None)` when the range
/// starts beyond what the page cache can index, which leaves nothing to do.
/// A range that only ends beyond that limit becomes open-ended.
///
/// # Errors
///
/// - [`SyncError::InvalidArgument`] if `offset` is negative, or if
///   `offset + nbytes` overflows or lands before `offset`
pub fn normalize_range(
    offset: i64,
    nbytes: i64,
    page_index_limit: Option<u64>,
) -> Result<Option<ByteRange>, SyncError> {
    let endbyte = offset.wrapping_add(nbytes);

    if offset < 0 {
        return Err(SyncError::invalid(OP, "negative offset"));
    }
    if endbyte < 0 {
        return Err(SyncError::invalid(OP, "range end overflows"));
    }
    if endbyte < offset {
        return Err(SyncError::invalid(OP, "range end precedes offset"));
    }

    let (start, endbyte) = (offset as u64, endbyte as u64);
    let mut open_ended = nbytes == 0;
    if let Some(limit) = page_index_limit {
        if start >= limit {
            return Ok(None);
        }
        if endbyte >= limit {
            open_ended = true;
        }
    }

    let end = if open_ended { MAX_OFFSET } else { endbyte - 1 };
    Ok(Some(ByteRange::new(start, end)))
}

/// Run the requested phases over `range` of `file`.
///
/// # Errors
///
/// - [`SyncError::NotSeekable`] if the object is not a regular file, block
///   device, directory, or symlink
/// - [`SyncError::InvalidArgument`] if the file has no page cache
/// - [`SyncError::Io`] from the first failing phase
pub fn sync_range(
    file: &dyn SyncFile,
    range: ByteRange,
    flags: RangeSyncFlags,
) -> Result<(), SyncError> {
    let file_type = file.file_type();
    if !file_type.supports_range_sync() {
        return Err(SyncError::NotSeekable { file_type });
    }
    let mapping = file
        .mapping()
        .ok_or_else(|| SyncError::invalid(OP, "file has no page cache"))?;

    for phase in RangeSyncPhase::ORDER {
        if flags.contains(phase.flag()) {
            trace!(?phase, start = range.start, end = range.end, "range sync phase");
            phase.run(mapping, range)?;
        }
    }
    Ok(())
}

impl SyncCoordinator {
    /// Sync `nbytes` of `fd` starting at `offset`, running the phases in `flags`.
    ///
    /// Arguments are validated before the descriptor is resolved.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidArgument`] for unknown flags, a bad range, or a
    ///   file without page cache
    /// - [`SyncError::BadFileDescriptor`] if `fd` does not resolve
    /// - [`SyncError::NotSeekable`] for unsupported object types
    /// - [`SyncError::Io`] from the first failing phase
    pub fn sync_file_range(
        &self,
        fd: Fd,
        offset: i64,
        nbytes: i64,
        flags: u32,
    ) -> Result<(), SyncError> {
        if self.durability_bypassed() {
            return Ok(());
        }
        let flags = parse_flags(flags)?;
        let Some(range) = normalize_range(offset, nbytes, self.config.page_index_limit)? else {
            return Ok(());
        };
        let file = self.resolve(fd)?;
        sync_range(file.as_ref(), range, flags)
    }

    /// [`sync_file_range`](Self::sync_file_range) with flags before the range.
    ///
    /// # Errors
    ///
    /// Same as [`sync_file_range`](Self::sync_file_range).
    pub fn sync_file_range2(
        &self,
        fd: Fd,
        flags: u32,
        offset: i64,
        nbytes: i64,
    ) -> Result<(), SyncError> {
        self.sync_file_range(fd, offset, nbytes, flags)
    }
}

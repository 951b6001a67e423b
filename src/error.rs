//! Error types for sync coordination.

use std::path::PathBuf;

use crate::{Fd, FileType};

/// Error returned by every durability operation.
///
/// Validation failures (`InvalidArgument`, `BadFileDescriptor`, `NotSeekable`)
/// are raised before any backend is touched. Backend failures surface as
/// [`SyncError::Io`].
///
/// # Examples
///
/// ```rust
/// use anyfs_sync::{Fd, SyncError};
///
/// let err = SyncError::BadFileDescriptor { fd: Fd(7) };
/// assert_eq!(err.to_string(), "bad file descriptor: 7");
/// assert_eq!(err.errno(), libc::EBADF);
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Malformed flags, range, or an object that lacks the required operation.
    #[error("{operation}: invalid argument: {reason}")]
    InvalidArgument {
        /// The operation that rejected its arguments.
        operation: &'static str,
        /// What was wrong.
        reason: &'static str,
    },

    /// The descriptor does not name an open file.
    #[error("bad file descriptor: {}", fd.0)]
    BadFileDescriptor {
        /// The descriptor that failed to resolve.
        fd: Fd,
    },

    /// The object type cannot take a range sync.
    #[error("illegal seek: {file_type:?} does not support range sync")]
    NotSeekable {
        /// Type of the rejected object.
        file_type: FileType,
    },

    /// Writeback or flush failed in the backend.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The volume or file involved, empty when unknown.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn invalid(operation: &'static str, reason: &'static str) -> Self {
        SyncError::InvalidArgument { operation, reason }
    }

    /// Positive errno equivalent of this error.
    ///
    /// Backend errors report their OS code when they carry one and `EIO`
    /// otherwise.
    pub fn errno(&self) -> i32 {
        match self {
            SyncError::InvalidArgument { .. } | SyncError::Config(_) => libc::EINVAL,
            SyncError::BadFileDescriptor { .. } => libc::EBADF,
            SyncError::NotSeekable { .. } => libc::ESPIPE,
            SyncError::Io { source, .. } => source.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(error: std::io::Error) -> Self {
        SyncError::Io {
            operation: "io",
            path: PathBuf::new(),
            source: error,
        }
    }
}

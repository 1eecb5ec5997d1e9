//! Error types for stream handle operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while opening or driving an auxiliary stream.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A write or truncate was attempted through a read-only handle.
    #[error("stream was opened read-only")]
    ReadOnly,

    /// Attempted to truncate beyond the end of the stream.
    #[error("cannot truncate to {at}: stream is only {size} bytes")]
    TruncatePastEnd {
        /// The requested truncation offset.
        at: u64,
        /// The current stream size.
        size: u64,
    },

    /// Attempted to seek before the start of the stream.
    #[error("seek to negative offset {offset}")]
    NegativeSeek {
        /// The offset the seek would have produced.
        offset: i64,
    },

    /// The path cannot carry an auxiliary stream.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// A provider asked to create a stream returned none.
    #[error("provider did not create a stream for {path:?}")]
    StreamNotCreated {
        /// The path whose stream was requested.
        path: PathBuf,
    },

    /// The file the stream would be attached to does not exist.
    #[error("target does not exist: {path:?}")]
    TargetMissing {
        /// The missing target path.
        path: PathBuf,
    },
}

impl StorageError {
    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

//! Error types for the attribute engine.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in attribute store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Stream handle error.
    #[error("storage error: {0}")]
    Storage(#[from] xattr_storage::StorageError),

    /// The attribute log is corrupted or not in the expected format.
    #[error("invalid attribute log: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// A scratch or shift buffer could not be allocated.
    #[error("failed to allocate {requested} bytes")]
    Allocation {
        /// Number of bytes requested.
        requested: usize,
    },

    /// The named attribute does not exist.
    #[error("attribute not found: {name}")]
    NotFound {
        /// Name of the missing attribute.
        name: String,
    },

    /// An argument was rejected before touching the stream.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Why the argument was rejected.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an allocation error.
    pub fn allocation(requested: usize) -> Self {
        Self::Allocation { requested }
    }

    /// Creates a not found error from raw name bytes.
    ///
    /// A trailing NUL terminator is not part of the reported name.
    pub fn not_found(name: &[u8]) -> Self {
        let name = name.strip_suffix(b"\0").unwrap_or(name);
        Self::NotFound {
            name: String::from_utf8_lossy(name).into_owned(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns `true` if this error reports a missing attribute.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

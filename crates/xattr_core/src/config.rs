//! Store configuration.

use xattr_storage::{StreamLocation, DEFAULT_STREAM_NAME};

/// Default chunk size for the backward shift during relocation.
pub const DEFAULT_SHIFT_CHUNK_SIZE: usize = 4096;

/// Default initial capacity of the parser's scratch buffer.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 512;

/// Configuration for an attribute store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the auxiliary stream attached to each path.
    pub stream_name: String,

    /// Where on-disk streams live relative to their target.
    pub location: StreamLocation,

    /// Bytes moved per step when shifting a log tail backward.
    pub shift_chunk_size: usize,

    /// Initial scratch buffer capacity for the log parser.
    pub initial_scratch_capacity: usize,

    /// Whether to sync the stream after every mutation (safer but slower).
    pub sync_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            location: StreamLocation::default(),
            shift_chunk_size: DEFAULT_SHIFT_CHUNK_SIZE,
            initial_scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
            sync_on_write: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the auxiliary stream name.
    #[must_use]
    pub fn stream_name(mut self, name: impl Into<String>) -> Self {
        self.stream_name = name.into();
        self
    }

    /// Sets where on-disk streams live.
    #[must_use]
    pub const fn location(mut self, location: StreamLocation) -> Self {
        self.location = location;
        self
    }

    /// Sets the shift chunk size. Zero is treated as one byte.
    #[must_use]
    pub const fn shift_chunk_size(mut self, size: usize) -> Self {
        self.shift_chunk_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the parser's initial scratch capacity.
    #[must_use]
    pub const fn initial_scratch_capacity(mut self, capacity: usize) -> Self {
        self.initial_scratch_capacity = capacity;
        self
    }

    /// Sets whether to sync after every mutation.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }
}

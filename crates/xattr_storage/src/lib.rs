//! # xattr storage
//!
//! Stream handles and handle providers for the side-stream attribute store.
//!
//! This crate provides the lowest-level storage abstraction: a seekable,
//! truncatable byte stream per filesystem path. Handles are **opaque byte
//! streams** - they do not interpret the attribute log they carry.
//!
//! ## Design Principles
//!
//! - Handles are simple byte streams (read, write, seek, truncate, sync)
//! - No knowledge of blocks, records or attribute names
//! - Providers decide where a path's stream lives and whether it exists
//! - Handles are released on drop
//!
//! ## Available Providers
//!
//! - [`InMemoryProvider`] - For testing and ephemeral stores
//! - [`FileProvider`] - Alternate data streams or hidden sidecar files
//!
//! ## Example
//!
//! ```rust
//! use std::io::SeekFrom;
//! use xattr_storage::{InMemoryStream, StreamHandle};
//!
//! let mut stream = InMemoryStream::new();
//! stream.write_all(b"hello world").unwrap();
//! stream.seek(SeekFrom::Start(6)).unwrap();
//! let mut buf = [0u8; 5];
//! stream.read_full(&mut buf).unwrap();
//! assert_eq!(&buf, b"world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod handle;
mod memory;

pub use error::{StorageError, StorageResult};
pub use file::{FileProvider, FileStream, StreamLocation, DEFAULT_STREAM_NAME};
pub use handle::{HandleProvider, OpenMode, StreamHandle};
pub use memory::{InMemoryProvider, InMemoryStream};

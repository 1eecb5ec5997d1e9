//! # xattr core
//!
//! Extended-attribute emulation for hosts without native support.
//!
//! Each path's attributes live in one auxiliary byte stream as a log of
//! length-prefixed name/value records. This crate provides:
//! - The block codec and a streaming log parser
//! - Lookups (list, has, get) as single forward passes
//! - Relocate-to-end compaction, so updates and removals only touch the tail
//! - [`AttrStore`], the path-level API over any [`HandleProvider`]
//!
//! ## Example
//!
//! ```rust
//! use xattr_core::AttrStore;
//!
//! let store = AttrStore::in_memory();
//! store.set("photo.jpg", "alpha", b"1").unwrap();
//! store.set("photo.jpg", "beta", b"22").unwrap();
//! store.set("photo.jpg", "alpha", b"333").unwrap();
//!
//! assert_eq!(store.get("photo.jpg", "alpha").unwrap(), b"333");
//! let mut names = store.list("photo.jpg").unwrap();
//! names.sort();
//! assert_eq!(names, ["alpha", "beta"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod engine;
mod error;
pub mod log;
mod store;

pub use config::{Config, DEFAULT_SCRATCH_CAPACITY, DEFAULT_SHIFT_CHUNK_SIZE};
pub use error::{CoreError, CoreResult};
pub use store::AttrStore;

pub use xattr_storage::{
    FileProvider, HandleProvider, InMemoryProvider, OpenMode, StreamHandle, StreamLocation,
};

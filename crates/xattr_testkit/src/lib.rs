//! # xattr testkit
//!
//! Test utilities for the attribute store.
//!
//! This crate provides:
//! - Test fixtures over in-memory and on-disk stores
//! - Property-based test generators using proptest
//! - A reference model that checks a store operation by operation
//! - Fuzz harnesses for the log parser and the store
//!
//! ## Usage
//!
//! ```rust
//! use xattr_testkit::prelude::*;
//!
//! with_memory_store(|store| {
//!     store.set("target", "k", b"v").unwrap();
//!     assert!(store.has("target", "k").unwrap());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod model;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::model::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use model::*;

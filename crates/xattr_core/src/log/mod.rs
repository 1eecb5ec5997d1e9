//! The attribute log: an unindexed sequence of name/value records.
//!
//! ## Block Format
//!
//! ```text
//! | length (4, little-endian) | payload (length) |
//! ```
//!
//! ## Record Format
//!
//! ```text
//! | name block | value block |
//! ```
//!
//! Names written through [`crate::AttrStore`] carry a trailing NUL byte.
//! The log itself treats names and values as opaque bytes.
//!
//! ## Invariants
//!
//! - A stream ending exactly on a record boundary is well formed
//! - A truncated length field, a payload shorter than its declared length or
//!   a name with no value block is **fatal** (`InvalidFormat`)
//! - After any completed mutation at most one record exists per name
//! - Only one block is buffered at a time while reading

mod block;
mod parser;

pub use block::{
    block_size, decode_block, encode_block, encode_record, read_length, record_size,
    LENGTH_PREFIX_SIZE,
};
pub use parser::{Event, Parser};

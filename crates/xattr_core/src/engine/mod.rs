//! Attribute operations over a single open stream.
//!
//! Lookups are one forward pass over the log. Mutations always happen at the
//! tail: the [`Compactor`] first relocates the target record to the end of
//! the stream, so an update overwrites the tail and a removal truncates it.
//!
//! Every mutation is O(stream size). There is no index or free list; attribute
//! sets per path are expected to stay small.

mod compactor;
mod lookup;
mod mutation;
mod shift;

pub use compactor::{Compactor, Relocation};
pub use lookup::{contains_name, find_value, list_names};
pub use mutation::{remove_attribute, write_attribute};
pub use shift::BackwardShift;

//! Relocate-to-end compaction.
//!
//! To update or remove a record, the [`Compactor`] first moves it to the end
//! of the log:
//!
//! ```text
//! before: | A | target | B | C |
//! after:  | A | B | C | target |
//!                       ^ cursor
//! ```
//!
//! The tail `B C` is shifted back over the target's old window in bounded
//! chunks, then the held target record is written behind it. The caller then
//! overwrites the record (update) or truncates at the cursor (remove).
//!
//! ## Invariants
//!
//! - Nothing is written until the target's value is held in an owned buffer
//! - A format or storage error during the scan leaves the stream unchanged
//! - Relocation never changes the logical contents of the log

use super::shift::BackwardShift;
use crate::config::{Config, DEFAULT_SCRATCH_CAPACITY};
use crate::error::{CoreError, CoreResult};
use crate::log::{encode_record, record_size, Event, Parser};
use std::io::SeekFrom;
use tracing::debug;
use xattr_storage::StreamHandle;

/// Outcome of a relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    /// The record now starts at `offset` and is the last one in the log.
    Found {
        /// Offset of the relocated record.
        offset: u64,
        /// Encoded size of the relocated record, both length prefixes included.
        window_width: u64,
    },
    /// No record has the name; the cursor is at the end of the log.
    NotFound {
        /// Length of the log.
        end: u64,
    },
}

impl Relocation {
    /// Returns the offset where the caller should continue: the relocated
    /// record's start, or the end of the log.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        match *self {
            Self::Found { offset, .. } => offset,
            Self::NotFound { end } => end,
        }
    }

    /// Returns `true` if the record was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

enum Scan {
    Match,
    Other,
    End,
}

/// Moves named records to the end of their log.
///
/// ## Example
///
/// ```rust
/// use xattr_core::engine::{Compactor, Relocation};
/// use xattr_core::log::encode_record;
/// use xattr_storage::InMemoryStream;
///
/// let mut stream = InMemoryStream::new();
/// encode_record(&mut stream, b"a", b"1").unwrap();
/// encode_record(&mut stream, b"b", b"2").unwrap();
///
/// let relocation = Compactor::default().relocate(&mut stream, b"a").unwrap();
/// assert_eq!(relocation, Relocation::Found { offset: 10, window_width: 10 });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Compactor {
    shift: BackwardShift,
    scratch_capacity: usize,
}

impl Compactor {
    /// Creates a compactor with the given shift chunk size and parser
    /// scratch capacity.
    #[must_use]
    pub fn new(chunk_size: usize, scratch_capacity: usize) -> Self {
        Self {
            shift: BackwardShift::new(chunk_size),
            scratch_capacity,
        }
    }

    /// Creates a compactor from store configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.shift_chunk_size, config.initial_scratch_capacity)
    }

    /// Relocates the record named `name` to the end of the log.
    ///
    /// On `Found` the cursor is at the start of the relocated record; on
    /// `NotFound` it is at the end of the log.
    ///
    /// # Errors
    ///
    /// Returns a format, allocation or storage error. Errors raised while
    /// scanning leave the stream untouched.
    pub fn relocate<H: StreamHandle + ?Sized>(
        &self,
        handle: &mut H,
        name: &[u8],
    ) -> CoreResult<Relocation> {
        handle.seek(SeekFrom::Start(0))?;
        let Some(value) = self.take_value(handle, name)? else {
            let end = handle.seek(SeekFrom::End(0))?;
            debug!(end, "relocation target absent");
            return Ok(Relocation::NotFound { end });
        };

        let window_width = record_size(name.len(), value.len());
        let tail_start = handle.position()?;
        let end = handle.len()?;
        let offset = end - window_width;

        if tail_start == end {
            // Already the last record.
            handle.seek(SeekFrom::Start(offset))?;
        } else {
            let shifted_end = self.shift.run(handle, tail_start, window_width)?;
            debug_assert_eq!(shifted_end, offset);
            encode_record(handle, name, &value)?;
            handle.seek(SeekFrom::Start(offset))?;
        }

        debug!(
            from = tail_start - window_width,
            to = offset,
            window_width,
            "relocated record to end of log"
        );
        Ok(Relocation::Found {
            offset,
            window_width,
        })
    }

    /// Scans for `name` and returns an owned copy of its value, leaving the
    /// cursor just past the value block.
    fn take_value<H: StreamHandle + ?Sized>(
        &self,
        handle: &mut H,
        name: &[u8],
    ) -> CoreResult<Option<Vec<u8>>> {
        let mut parser = Parser::with_capacity(handle, true, self.scratch_capacity);

        loop {
            let scan = match parser.next_event() {
                Event::Name(found) if found == name => Scan::Match,
                Event::Name(_) | Event::Value(_) => Scan::Other,
                Event::End => Scan::End,
                Event::Error(e) => return Err(e),
            };

            match scan {
                Scan::Other => continue,
                Scan::End => return Ok(None),
                Scan::Match => {}
            }

            parser.set_skip_values(false);
            return match parser.next_event() {
                // Copied out of the parser's scratch buffer, which the next
                // parse would reuse.
                Event::Value(value) => {
                    let mut held = Vec::new();
                    held.try_reserve_exact(value.len())
                        .map_err(|_| CoreError::allocation(value.len()))?;
                    held.extend_from_slice(value);
                    Ok(Some(held))
                }
                Event::Error(e) => Err(e),
                Event::Name(_) | Event::End => Err(CoreError::invalid_format(
                    "name block not followed by a value block",
                )),
            };
        }
    }
}

impl Default for Compactor {
    fn default() -> Self {
        Self {
            shift: BackwardShift::default(),
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
        }
    }
}

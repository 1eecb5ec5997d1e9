//! Incremental attribute log parser.
//!
//! Reads one block at a time from a stream handle and reports it as an
//! [`Event`]. Memory use is bounded by the largest single block read, never
//! by the size of the log.

use super::block::{ensure_available, read_length, read_payload};
use crate::config::DEFAULT_SCRATCH_CAPACITY;
use crate::error::{CoreError, CoreResult};
use std::io::SeekFrom;
use xattr_storage::StreamHandle;

/// A parse event.
///
/// Events strictly alternate `Name`, `Value`, `Name`, ... and finish with
/// either `End` or `Error`. Borrowed payloads are valid until the next call
/// to [`Parser::next_event`].
#[derive(Debug)]
pub enum Event<'a> {
    /// A record's name block.
    Name(&'a [u8]),
    /// A record's value block.
    Value(&'a [u8]),
    /// Clean end of the log at a record boundary.
    End,
    /// The log could not be read.
    Error(CoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Name,
    Value,
}

/// A streaming parser over an attribute log.
///
/// The parser reads from the handle's current cursor. Once it has reported
/// `End` or `Error` it is finished and keeps reporting `End`.
///
/// # Example
///
/// ```rust
/// use xattr_core::log::{encode_record, Event, Parser};
/// use xattr_storage::{InMemoryStream, StreamHandle};
/// use std::io::SeekFrom;
///
/// let mut stream = InMemoryStream::new();
/// encode_record(&mut stream, b"color\0", b"blue").unwrap();
/// stream.seek(SeekFrom::Start(0)).unwrap();
///
/// let mut parser = Parser::new(&mut stream, false);
/// assert!(matches!(parser.next_event(), Event::Name(b"color\0")));
/// assert!(matches!(parser.next_event(), Event::Value(b"blue")));
/// assert!(matches!(parser.next_event(), Event::End));
/// ```
pub struct Parser<'h, H: StreamHandle + ?Sized> {
    handle: &'h mut H,
    on_value: bool,
    skip_values: bool,
    scratch: Vec<u8>,
    finished: bool,
}

impl<'h, H: StreamHandle + ?Sized> Parser<'h, H> {
    /// Creates a parser with the default scratch capacity.
    ///
    /// With `skip_values` set, value blocks are seeked over instead of read
    /// and only `Name` events are produced.
    pub fn new(handle: &'h mut H, skip_values: bool) -> Self {
        Self::with_capacity(handle, skip_values, DEFAULT_SCRATCH_CAPACITY)
    }

    /// Creates a parser whose scratch buffer starts at `capacity` bytes.
    pub fn with_capacity(handle: &'h mut H, skip_values: bool, capacity: usize) -> Self {
        Self {
            handle,
            on_value: false,
            skip_values,
            scratch: Vec::with_capacity(capacity),
            finished: false,
        }
    }

    /// Changes whether upcoming value blocks are skipped.
    pub fn set_skip_values(&mut self, skip: bool) {
        self.skip_values = skip;
    }

    /// Returns `true` once `End` or `Error` has been reported.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Produces the next event.
    pub fn next_event(&mut self) -> Event<'_> {
        if self.finished {
            return Event::End;
        }

        match self.advance() {
            Ok(Some((BlockKind::Name, len))) => Event::Name(&self.scratch[..len]),
            Ok(Some((BlockKind::Value, len))) => Event::Value(&self.scratch[..len]),
            Ok(None) => {
                self.finished = true;
                Event::End
            }
            Err(e) => {
                self.finished = true;
                Event::Error(e)
            }
        }
    }

    fn advance(&mut self) -> CoreResult<Option<(BlockKind, usize)>> {
        loop {
            let kind = if self.on_value {
                BlockKind::Value
            } else {
                BlockKind::Name
            };

            let Some(declared) = read_length(&mut *self.handle)? else {
                if kind == BlockKind::Value {
                    return Err(CoreError::invalid_format(
                        "log ends after a name block with no value",
                    ));
                }
                return Ok(None);
            };

            // Checked before seeking or allocating so a corrupt length can
            // neither skip past the end nor request a huge buffer.
            ensure_available(&mut *self.handle, declared)?;
            self.on_value = !self.on_value;

            if kind == BlockKind::Value && self.skip_values {
                self.handle.seek(SeekFrom::Current(i64::from(declared)))?;
                continue;
            }

            let len = declared as usize;
            read_payload(&mut *self.handle, len, &mut self.scratch)?;
            return Ok(Some((kind, len)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::encode_record;
    use xattr_storage::InMemoryStream;

    fn log_of(records: &[(&[u8], &[u8])]) -> InMemoryStream {
        let mut stream = InMemoryStream::new();
        for (name, value) in records {
            encode_record(&mut stream, name, value).unwrap();
        }
        stream.seek(SeekFrom::Start(0)).unwrap();
        stream
    }

    #[test]
    fn empty_log_ends_immediately() {
        let mut stream = InMemoryStream::new();
        let mut parser = Parser::new(&mut stream, false);
        assert!(matches!(parser.next_event(), Event::End));
        assert!(parser.is_finished());
    }

    #[test]
    fn events_alternate() {
        let mut stream = log_of(&[(b"a", b"1"), (b"b", b"")]);
        let mut parser = Parser::new(&mut stream, false);

        assert!(matches!(parser.next_event(), Event::Name(b"a")));
        assert!(matches!(parser.next_event(), Event::Value(b"1")));
        assert!(matches!(parser.next_event(), Event::Name(b"b")));
        assert!(matches!(parser.next_event(), Event::Value(b"")));
        assert!(matches!(parser.next_event(), Event::End));
    }

    #[test]
    fn skip_values_yields_names_only() {
        let big = vec![7u8; 10_000];
        let mut stream = log_of(&[(b"a", &big), (b"b", b"2"), (b"c", b"")]);
        let mut parser = Parser::new(&mut stream, true);

        assert!(matches!(parser.next_event(), Event::Name(b"a")));
        assert!(matches!(parser.next_event(), Event::Name(b"b")));
        assert!(matches!(parser.next_event(), Event::Name(b"c")));
        assert!(matches!(parser.next_event(), Event::End));
    }

    #[test]
    fn skipping_never_buffers_values() {
        let big = vec![7u8; 100_000];
        let mut stream = log_of(&[(b"a", &big)]);
        let mut parser = Parser::with_capacity(&mut stream, true, 0);

        assert!(matches!(parser.next_event(), Event::Name(b"a")));
        assert!(matches!(parser.next_event(), Event::End));
        assert!(parser.scratch.len() < 16);
    }

    #[test]
    fn skip_can_be_toggled_per_value() {
        let mut stream = log_of(&[(b"a", b"1"), (b"b", b"2")]);
        let mut parser = Parser::new(&mut stream, true);

        assert!(matches!(parser.next_event(), Event::Name(b"a")));
        assert!(matches!(parser.next_event(), Event::Name(b"b")));
        parser.set_skip_values(false);
        assert!(matches!(parser.next_event(), Event::Value(b"2")));
        assert!(matches!(parser.next_event(), Event::End));
    }

    #[test]
    fn dangling_name_is_an_error() {
        let mut stream = InMemoryStream::new();
        crate::log::encode_block(&mut stream, b"orphan").unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();

        let mut parser = Parser::new(&mut stream, false);
        assert!(matches!(parser.next_event(), Event::Name(b"orphan")));
        assert!(matches!(
            parser.next_event(),
            Event::Error(CoreError::InvalidFormat { .. })
        ));
        assert!(matches!(parser.next_event(), Event::End));
    }

    #[test]
    fn truncated_skipped_value_is_an_error() {
        let mut stream = log_of(&[(b"a", b"12345")]);
        let len = stream.len().unwrap();
        stream.truncate(len - 2).unwrap();

        let mut parser = Parser::new(&mut stream, true);
        assert!(matches!(parser.next_event(), Event::Name(b"a")));
        assert!(matches!(
            parser.next_event(),
            Event::Error(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn truncated_length_prefix_is_an_error() {
        let mut stream = log_of(&[(b"a", b"1")]);
        stream.seek(SeekFrom::End(0)).unwrap();
        stream.write_all(&[9, 0]).unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();

        let mut parser = Parser::new(&mut stream, true);
        assert!(matches!(parser.next_event(), Event::Name(b"a")));
        assert!(matches!(
            parser.next_event(),
            Event::Error(CoreError::InvalidFormat { .. })
        ));
    }
}

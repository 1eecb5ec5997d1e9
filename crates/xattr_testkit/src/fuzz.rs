//! Fuzz testing harnesses.
//!
//! These targets take raw bytes so they can be driven by cargo-fuzz or by the
//! seeded loops in this module's tests.

use std::path::Path;
use xattr_core::log::{Event, Parser};
use xattr_core::AttrStore;
use xattr_storage::InMemoryStream;

/// Fuzz target for the log parser.
///
/// Tests that an arbitrary stream either parses to the end or stops with an
/// error, without panicking, in both skip and read modes. Returns the
/// number of events seen before the parser finished.
pub fn fuzz_log_parse(data: &[u8]) -> usize {
    let mut seen = 0;
    for skip_values in [false, true] {
        let mut stream = InMemoryStream::with_data(data.to_vec());
        let mut parser = Parser::with_capacity(&mut stream, skip_values, 0);
        loop {
            seen += 1;
            match parser.next_event() {
                Event::Name(_) | Event::Value(_) => {}
                Event::End | Event::Error(_) => break,
            }
        }
        assert!(parser.is_finished(), "parser not fused after finishing");
        assert!(matches!(parser.next_event(), Event::End));
    }
    seen
}

/// Fuzz target for store operations over an arbitrary existing stream.
///
/// Every operation must either succeed or leave the stream byte-for-byte
/// unchanged.
pub fn fuzz_store_operations(data: &[u8]) {
    let store = AttrStore::in_memory();
    let path = Path::new("fuzzed");
    store.provider().insert(path, data.to_vec());

    let _ = store.list(path);
    for name in ["a", "b", "user.x"] {
        let _ = store.has(path, name);
        let _ = store.get(path, name);

        let before = store.provider().contents(path);
        if store.remove(path, name).is_err() {
            let after = store.provider().contents(path);
            assert_eq!(after, before, "failed remove mutated");
        }

        let before = store.provider().contents(path);
        if store.set(path, name, data).is_err() {
            let after = store.provider().contents(path);
            assert_eq!(after, before, "failed set mutated");
        }
    }
}

/// Structured fuzzing helpers.
pub mod structured {
    use crate::generators::AttrOperation;

    /// Parses raw fuzz input into a sequence of attribute operations.
    ///
    /// Each operation takes a tag byte and a name byte; sets add a length
    /// byte followed by that many value bytes (zero-padded past the end).
    pub fn parse_sequence(data: &[u8]) -> Vec<AttrOperation> {
        let mut ops = Vec::new();
        let mut offset = 0;

        while offset + 2 <= data.len() {
            let tag = data[offset];
            let name = format!("n{}", data[offset + 1] % 8);
            offset += 2;

            let op = match tag % 4 {
                0 => {
                    let len = data.get(offset).copied().unwrap_or(0) as usize;
                    offset += 1;
                    let mut value = data.get(offset..).unwrap_or(&[]).to_vec();
                    value.resize(len, 0);
                    offset += len;
                    AttrOperation::Set { name, value }
                }
                1 => AttrOperation::Remove { name },
                2 => AttrOperation::Get { name },
                _ => AttrOperation::List,
            };
            ops.push(op);
        }

        ops
    }
}

//! Read-only traversals: list, has and get.

use crate::error::CoreResult;
use crate::log::{Event, Parser};
use std::io::SeekFrom;
use xattr_storage::StreamHandle;

/// Collects every name in the log, in encounter order.
///
/// Values are skipped without being read.
///
/// # Errors
///
/// Returns the first format or storage error met.
pub fn list_names<H: StreamHandle + ?Sized>(
    handle: &mut H,
    scratch_capacity: usize,
) -> CoreResult<Vec<Vec<u8>>> {
    handle.seek(SeekFrom::Start(0))?;
    let mut parser = Parser::with_capacity(handle, true, scratch_capacity);
    let mut names = Vec::new();

    loop {
        match parser.next_event() {
            Event::Name(name) => names.push(name.to_vec()),
            Event::Value(_) => {}
            Event::End => return Ok(names),
            Event::Error(e) => return Err(e),
        }
    }
}

/// Returns `true` if a record named exactly `name` exists.
///
/// # Errors
///
/// Returns a format or storage error met before a match.
pub fn contains_name<H: StreamHandle + ?Sized>(
    handle: &mut H,
    name: &[u8],
    scratch_capacity: usize,
) -> CoreResult<bool> {
    handle.seek(SeekFrom::Start(0))?;
    let mut parser = Parser::with_capacity(handle, true, scratch_capacity);

    loop {
        match parser.next_event() {
            Event::Name(found) if found == name => return Ok(true),
            Event::Name(_) | Event::Value(_) => {}
            Event::End => return Ok(false),
            Event::Error(e) => return Err(e),
        }
    }
}

/// Returns the value stored under `name`, or `None` if absent.
///
/// # Errors
///
/// Returns a format or storage error met before the value.
pub fn find_value<H: StreamHandle + ?Sized>(
    handle: &mut H,
    name: &[u8],
    scratch_capacity: usize,
) -> CoreResult<Option<Vec<u8>>> {
    handle.seek(SeekFrom::Start(0))?;
    let mut parser = Parser::with_capacity(handle, false, scratch_capacity);
    let mut matched = false;

    loop {
        match parser.next_event() {
            Event::Name(found) => matched = found == name,
            Event::Value(value) if matched => return Ok(Some(value.to_vec())),
            Event::Value(_) => {}
            Event::End => return Ok(None),
            Event::Error(e) => return Err(e),
        }
    }
}

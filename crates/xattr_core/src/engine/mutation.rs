//! Tail mutations: set and remove.

use super::compactor::{Compactor, Relocation};
use crate::error::{CoreError, CoreResult};
use crate::log::encode_record;
use std::io::SeekFrom;
use xattr_storage::StreamHandle;

/// Stores `value` under `name`, replacing any existing record.
///
/// The existing record (if any) is relocated to the tail and overwritten;
/// a new name is appended. The stream is then truncated right after the new
/// record so a shorter value leaves no stale bytes.
///
/// # Errors
///
/// Returns `InvalidArgument` if `name` or `value` exceeds the 32-bit length
/// prefix (checked before anything is written), or a format, allocation or
/// storage error.
pub fn write_attribute<H: StreamHandle + ?Sized>(
    handle: &mut H,
    name: &[u8],
    value: &[u8],
    compactor: &Compactor,
) -> CoreResult<()> {
    for (what, data) in [("name", name), ("value", value)] {
        if u32::try_from(data.len()).is_err() {
            return Err(CoreError::invalid_argument(format!(
                "{what} of {} bytes exceeds the 32-bit length prefix",
                data.len()
            )));
        }
    }

    let cursor = compactor.relocate(handle, name)?.cursor();
    handle.seek(SeekFrom::Start(cursor))?;
    let written = encode_record(handle, name, value)?;
    handle.truncate(cursor + written)?;
    Ok(())
}

/// Deletes the record named `name`.
///
/// # Errors
///
/// Returns `NotFound` if no such record exists, or a format, allocation or
/// storage error.
pub fn remove_attribute<H: StreamHandle + ?Sized>(
    handle: &mut H,
    name: &[u8],
    compactor: &Compactor,
) -> CoreResult<()> {
    match compactor.relocate(handle, name)? {
        Relocation::Found { offset, .. } => {
            handle.truncate(offset)?;
            Ok(())
        }
        Relocation::NotFound { .. } => Err(CoreError::not_found(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{find_value, list_names};
    use crate::log::record_size;
    use xattr_storage::InMemoryStream;

    fn set(stream: &mut InMemoryStream, name: &[u8], value: &[u8]) {
        let compactor = Compactor::default();
        write_attribute(stream, name, value, &compactor).unwrap();
    }

    fn remove(stream: &mut InMemoryStream, name: &[u8]) -> CoreResult<()> {
        remove_attribute(stream, name, &Compactor::default())
    }

    fn get(stream: &mut InMemoryStream, name: &[u8]) -> Option<Vec<u8>> {
        find_value(stream, name, 0).unwrap()
    }

    #[test]
    fn set_appends_new_record() {
        let mut stream = InMemoryStream::new();
        set(&mut stream, b"k", b"v");
        assert_eq!(stream.len().unwrap(), record_size(1, 1));
        assert_eq!(get(&mut stream, b"k"), Some(b"v".to_vec()));
    }

    #[test]
    fn overwrite_shorter_truncates() {
        let mut stream = InMemoryStream::new();
        set(&mut stream, b"a", b"1");
        set(&mut stream, b"k", b"a long original value");
        set(&mut stream, b"k", b"x");

        let expected = record_size(1, 1) + record_size(1, 1);
        assert_eq!(stream.len().unwrap(), expected);
        assert_eq!(get(&mut stream, b"k"), Some(b"x".to_vec()));
        assert_eq!(get(&mut stream, b"a"), Some(b"1".to_vec()));
    }

    #[test]
    fn overwrite_longer_extends() {
        let mut stream = InMemoryStream::new();
        set(&mut stream, b"k", b"x");
        set(&mut stream, b"z", b"2");
        set(&mut stream, b"k", b"much longer");

        let expected = record_size(1, 11) + record_size(1, 1);
        assert_eq!(stream.len().unwrap(), expected);
        assert_eq!(get(&mut stream, b"k"), Some(b"much longer".to_vec()));
        assert_eq!(get(&mut stream, b"z"), Some(b"2".to_vec()));
    }

    #[test]
    fn overwrite_keeps_single_record() {
        let mut stream = InMemoryStream::new();
        set(&mut stream, b"k", b"1");
        set(&mut stream, b"k", b"2");
        set(&mut stream, b"k", b"3");
        assert_eq!(list_names(&mut stream, 0).unwrap(), vec![b"k".to_vec()]);
    }

    #[test]
    fn remove_truncates_relocated_record() {
        let mut stream = InMemoryStream::new();
        set(&mut stream, b"a", b"1");
        set(&mut stream, b"b", b"22");

        remove(&mut stream, b"a").unwrap();

        assert_eq!(stream.len().unwrap(), record_size(1, 2));
        assert_eq!(get(&mut stream, b"a"), None);
        assert_eq!(get(&mut stream, b"b"), Some(b"22".to_vec()));
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut stream = InMemoryStream::new();
        set(&mut stream, b"a", b"1");
        let before = stream.data();

        let result = remove(&mut stream, b"b");

        assert!(matches!(result, Err(CoreError::NotFound { .. })));
        assert_eq!(stream.data(), before);
    }

    #[test]
    fn remove_last_leaves_empty_stream() {
        let mut stream = InMemoryStream::new();
        set(&mut stream, b"a", b"1");
        remove(&mut stream, b"a").unwrap();
        assert!(stream.is_empty().unwrap());
    }

    #[test]
    fn failed_scan_leaves_stream_unchanged() {
        let mut stream = InMemoryStream::new();
        set(&mut stream, b"a", b"1");
        stream.seek(SeekFrom::End(0)).unwrap();
        stream.write_all(&[1]).unwrap();
        let before = stream.data();

        let result = write_attribute(&mut stream, b"b", b"2", &Compactor::default());

        assert!(matches!(result, Err(CoreError::InvalidFormat { .. })));
        assert_eq!(stream.data(), before);
    }
}

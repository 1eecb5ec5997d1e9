//! Length-prefixed block encoding.

use crate::error::{CoreError, CoreResult};
use xattr_storage::StreamHandle;

/// Size of the length prefix in front of every block.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Returns the encoded size of a block with a `payload_len` byte payload.
#[must_use]
pub const fn block_size(payload_len: usize) -> u64 {
    LENGTH_PREFIX_SIZE as u64 + payload_len as u64
}

/// Returns the encoded size of a whole record.
#[must_use]
pub const fn record_size(name_len: usize, value_len: usize) -> u64 {
    block_size(name_len) + block_size(value_len)
}

fn checked_length(data: &[u8]) -> CoreResult<u32> {
    u32::try_from(data.len()).map_err(|_| {
        CoreError::invalid_argument(format!(
            "block of {} bytes exceeds the 32-bit length prefix",
            data.len()
        ))
    })
}

/// Writes `data` as one block at the handle's cursor.
///
/// # Errors
///
/// Returns `InvalidArgument` if `data` is longer than `u32::MAX` (nothing is
/// written), or a storage error if a write fails.
pub fn encode_block<H: StreamHandle + ?Sized>(handle: &mut H, data: &[u8]) -> CoreResult<()> {
    let len = checked_length(data)?;
    handle.write_all(&len.to_le_bytes())?;
    handle.write_all(data)?;
    Ok(())
}

/// Writes a name block followed by a value block.
///
/// Both lengths are validated before the first byte is written. Returns the
/// number of bytes written.
///
/// # Errors
///
/// Returns `InvalidArgument` for oversized blocks, or a storage error.
pub fn encode_record<H: StreamHandle + ?Sized>(
    handle: &mut H,
    name: &[u8],
    value: &[u8],
) -> CoreResult<u64> {
    checked_length(name)?;
    checked_length(value)?;
    encode_block(handle, name)?;
    encode_block(handle, value)?;
    Ok(record_size(name.len(), value.len()))
}

/// Reads a block's length prefix.
///
/// Returns `Ok(None)` when the stream is exhausted before the first byte.
///
/// # Errors
///
/// Returns `InvalidFormat` when only 1-3 bytes of the prefix are present.
pub fn read_length<H: StreamHandle + ?Sized>(handle: &mut H) -> CoreResult<Option<u32>> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    match handle.read_full(&mut prefix)? {
        0 => Ok(None),
        LENGTH_PREFIX_SIZE => Ok(Some(u32::from_le_bytes(prefix))),
        n => Err(CoreError::invalid_format(format!(
            "truncated length field: {n} of {LENGTH_PREFIX_SIZE} bytes"
        ))),
    }
}

/// Verifies that `declared` payload bytes follow the cursor.
pub(crate) fn ensure_available<H: StreamHandle + ?Sized>(
    handle: &mut H,
    declared: u32,
) -> CoreResult<()> {
    let position = handle.position()?;
    let remaining = handle.len()?.saturating_sub(position);
    if u64::from(declared) > remaining {
        return Err(CoreError::invalid_format(format!(
            "block at offset {} declares {declared} bytes but only {remaining} remain",
            position.saturating_sub(LENGTH_PREFIX_SIZE as u64)
        )));
    }
    Ok(())
}

/// Reads a `len` byte payload into the front of `scratch`.
///
/// `scratch` grows to `len` if needed and never shrinks.
pub(crate) fn read_payload<H: StreamHandle + ?Sized>(
    handle: &mut H,
    len: usize,
    scratch: &mut Vec<u8>,
) -> CoreResult<()> {
    if scratch.len() < len {
        scratch
            .try_reserve_exact(len - scratch.len())
            .map_err(|_| CoreError::allocation(len))?;
        scratch.resize(len, 0);
    }

    let read = handle.read_full(&mut scratch[..len])?;
    if read != len {
        return Err(CoreError::invalid_format(format!(
            "payload truncated: expected {len} bytes, found {read}"
        )));
    }
    Ok(())
}

/// Reads one whole block into `scratch`, returning its payload length.
///
/// Returns `Ok(None)` at a clean end of stream.
///
/// # Errors
///
/// Returns `InvalidFormat` for a truncated prefix or payload,
/// `Allocation` if `scratch` cannot grow, or a storage error.
pub fn decode_block<H: StreamHandle + ?Sized>(
    handle: &mut H,
    scratch: &mut Vec<u8>,
) -> CoreResult<Option<usize>> {
    let Some(declared) = read_length(handle)? else {
        return Ok(None);
    };
    ensure_available(handle, declared)?;
    let len = declared as usize;
    read_payload(handle, len, scratch)?;
    Ok(Some(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xattr_storage::InMemoryStream;

    #[test]
    fn encode_block_layout() {
        let mut stream = InMemoryStream::new();
        encode_block(&mut stream, b"abc").unwrap();
        assert_eq!(stream.data(), [3, 0, 0, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn encode_empty_block() {
        let mut stream = InMemoryStream::new();
        encode_block(&mut stream, b"").unwrap();
        assert_eq!(stream.data(), [0, 0, 0, 0]);
        assert_eq!(block_size(0), 4);
    }

    #[test]
    fn encode_record_reports_size() {
        let mut stream = InMemoryStream::new();
        let written = encode_record(&mut stream, b"k\0", b"value").unwrap();
        assert_eq!(written, 4 + 2 + 4 + 5);
        assert_eq!(stream.data().len() as u64, written);
    }

    #[test]
    fn decode_block_reads_payload() {
        let mut stream = InMemoryStream::with_data(vec![2, 0, 0, 0, b'h', b'i', 0, 0, 0, 0]);
        let mut scratch = Vec::new();

        assert_eq!(decode_block(&mut stream, &mut scratch).unwrap(), Some(2));
        assert_eq!(&scratch[..2], b"hi");
        assert_eq!(decode_block(&mut stream, &mut scratch).unwrap(), Some(0));
        assert_eq!(decode_block(&mut stream, &mut scratch).unwrap(), None);
    }

    #[test]
    fn decode_truncated_length_fails() {
        let mut stream = InMemoryStream::with_data(vec![1, 0]);
        let mut scratch = Vec::new();
        let result = decode_block(&mut stream, &mut scratch);
        assert!(matches!(result, Err(CoreError::InvalidFormat { .. })));
    }

    #[test]
    fn decode_truncated_payload_fails_before_allocating() {
        // Declares 4 GiB - 1 with three bytes behind it.
        let mut stream = InMemoryStream::with_data(vec![0xff, 0xff, 0xff, 0xff, 1, 2, 3]);
        let mut scratch = Vec::new();
        let result = decode_block(&mut stream, &mut scratch);
        assert!(matches!(result, Err(CoreError::InvalidFormat { .. })));
        assert!(scratch.is_empty());
    }

    #[test]
    fn scratch_never_shrinks() {
        let mut stream = InMemoryStream::with_data(vec![3, 0, 0, 0, 1, 2, 3, 1, 0, 0, 0, 9]);
        let mut scratch = Vec::new();

        decode_block(&mut stream, &mut scratch).unwrap();
        assert_eq!(scratch.len(), 3);
        decode_block(&mut stream, &mut scratch).unwrap();
        assert_eq!(scratch.len(), 3);
        assert_eq!(scratch[0], 9);
    }
}

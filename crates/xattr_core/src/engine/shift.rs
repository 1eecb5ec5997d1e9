//! Bounded streaming copy with a backward offset.

use crate::config::DEFAULT_SHIFT_CHUNK_SIZE;
use crate::error::{CoreError, CoreResult};
use std::io::SeekFrom;
use tracing::trace;
use xattr_storage::StreamHandle;

/// Moves the tail of a stream toward its start, one chunk at a time.
///
/// Each chunk is read in full before it is written `distance` bytes earlier.
/// Since `distance > 0`, a write never reaches bytes the loop has yet to
/// read, so the copy is safe within a single stream. Memory use is one
/// chunk regardless of tail length.
#[derive(Debug, Clone, Copy)]
pub struct BackwardShift {
    chunk_size: usize,
}

impl BackwardShift {
    /// Creates a shift that moves `chunk_size` bytes per step.
    ///
    /// A zero chunk size is treated as one byte.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Returns the chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Copies `[from, end)` to `[from - distance, end - distance)`.
    ///
    /// Leaves the cursor at, and returns, `end - distance`. Bytes from there
    /// to the old end are left as they were; callers overwrite or truncate
    /// them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `distance` is zero or larger than `from`,
    /// `Allocation` if the chunk buffer cannot be obtained, or a storage
    /// error.
    pub fn run<H: StreamHandle + ?Sized>(
        &self,
        handle: &mut H,
        from: u64,
        distance: u64,
    ) -> CoreResult<u64> {
        if distance == 0 || distance > from {
            return Err(CoreError::invalid_argument(format!(
                "cannot shift offset {from} back by {distance}"
            )));
        }

        let mut chunk = Vec::new();
        chunk
            .try_reserve_exact(self.chunk_size)
            .map_err(|_| CoreError::allocation(self.chunk_size))?;
        chunk.resize(self.chunk_size, 0);

        let mut read_at = from;
        loop {
            handle.seek(SeekFrom::Start(read_at))?;
            let n = handle.read_full(&mut chunk)?;
            if n == 0 {
                break;
            }
            handle.seek(SeekFrom::Start(read_at - distance))?;
            handle.write_all(&chunk[..n])?;
            read_at += n as u64;
        }

        let new_end = read_at - distance;
        handle.seek(SeekFrom::Start(new_end))?;
        trace!(from, distance, moved = read_at - from, "shifted log tail");
        Ok(new_end)
    }
}

impl Default for BackwardShift {
    fn default() -> Self {
        Self::new(DEFAULT_SHIFT_CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xattr_storage::InMemoryStream;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn check_shift(len: usize, from: usize, distance: usize, chunk: usize) {
        let original = pattern(len);
        let mut stream = InMemoryStream::with_data(original.clone());

        let end = BackwardShift::new(chunk)
            .run(&mut stream, from as u64, distance as u64)
            .unwrap();
        assert_eq!(end, (len - distance) as u64);
        assert_eq!(stream.position().unwrap(), end);

        let data = stream.data();
        assert_eq!(data.len(), len, "shift must not change stream length");
        assert_eq!(&data[..from - distance], &original[..from - distance]);
        assert_eq!(&data[from - distance..len - distance], &original[from..]);
    }

    #[test]
    fn chunk_smaller_than_window() {
        check_shift(100, 40, 30, 7);
    }

    #[test]
    fn chunk_equal_to_window() {
        check_shift(100, 40, 30, 30);
    }

    #[test]
    fn chunk_larger_than_window() {
        check_shift(100, 40, 30, 64);
    }

    #[test]
    fn chunk_larger_than_tail() {
        check_shift(50, 40, 30, 4096);
    }

    #[test]
    fn single_byte_chunks() {
        check_shift(64, 10, 1, 1);
    }

    #[test]
    fn tail_spanning_many_chunks() {
        check_shift(3 * 4096 + 17, 5000, 4100, 4096);
    }

    #[test]
    fn empty_tail_is_a_no_op() {
        let mut stream = InMemoryStream::with_data(pattern(20));
        let end = BackwardShift::default().run(&mut stream, 20, 5).unwrap();
        assert_eq!(end, 15);
        assert_eq!(stream.data(), pattern(20));
    }

    #[test]
    fn whole_prefix_shift() {
        check_shift(30, 10, 10, 3);
    }

    #[test]
    fn zero_distance_is_rejected() {
        let mut stream = InMemoryStream::with_data(pattern(20));
        let result = BackwardShift::default().run(&mut stream, 10, 0);
        assert!(matches!(result, Err(CoreError::InvalidArgument { .. })));
    }

    #[test]
    fn distance_past_start_is_rejected() {
        let mut stream = InMemoryStream::with_data(pattern(20));
        let result = BackwardShift::default().run(&mut stream, 10, 11);
        assert!(matches!(result, Err(CoreError::InvalidArgument { .. })));
        assert_eq!(stream.data(), pattern(20));
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        assert_eq!(BackwardShift::new(0).chunk_size(), 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn shift_preserves_tail(
                len in 1usize..2000,
                from_frac in 0.0f64..1.0,
                dist_frac in 0.0f64..1.0,
                chunk in 1usize..300,
            ) {
                let from = ((len as f64) * from_frac) as usize + 1;
                let from = from.min(len);
                let distance = (((from as f64) * dist_frac) as usize).max(1).min(from);
                check_shift(len, from, distance, chunk);
            }
        }
    }
}

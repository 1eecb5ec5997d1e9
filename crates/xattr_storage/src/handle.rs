//! Stream handle and provider trait definitions.

use crate::error::{StorageError, StorageResult};
use std::io::{self, SeekFrom};
use std::path::Path;

/// Access mode requested when opening an auxiliary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Reads and seeks only.
    ReadOnly,
    /// Reads, writes, seeks and truncation.
    ReadWrite,
}

impl OpenMode {
    /// Returns `true` if the mode permits mutation.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// A seekable byte stream holding one path's attribute log.
///
/// Handles are **opaque byte streams**. They know nothing about blocks or
/// records; the attribute engine owns all format interpretation.
///
/// # Invariants
///
/// - `read` and `write` advance the cursor by the number of bytes they report
/// - `truncate` never moves the cursor
/// - Dropping a handle releases it; there is no separate close call
///
/// # Implementors
///
/// - [`super::InMemoryStream`] - For testing
/// - [`super::FileStream`] - For streams backed by the filesystem
pub trait StreamHandle {
    /// Reads up to `buf.len()` bytes at the cursor.
    ///
    /// Returns the number of bytes read; `0` means the cursor is at or past
    /// the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read(&mut self, buf: &mut [u8]) -> StorageResult<usize>;

    /// Writes bytes at the cursor, overwriting or extending the stream.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on read-only handles, or an I/O error.
    fn write(&mut self, data: &[u8]) -> StorageResult<usize>;

    /// Moves the cursor and returns its new absolute offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting offset would be negative or the
    /// underlying seek fails.
    fn seek(&mut self, pos: SeekFrom) -> StorageResult<u64>;

    /// Returns the current size of the stream in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn len(&self) -> StorageResult<u64>;

    /// Cuts the stream so that it ends at `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The handle is read-only
    /// - `at` is greater than the current size
    /// - The truncation fails
    fn truncate(&mut self, at: u64) -> StorageResult<()>;

    /// Syncs data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns `true` if the stream holds no bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns the cursor's absolute offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying seek fails.
    fn position(&mut self) -> StorageResult<u64> {
        self.seek(SeekFrom::Current(0))
    }

    /// Reads until `buf` is full or the stream ends.
    ///
    /// Returns the number of bytes read, which is less than `buf.len()` only
    /// at end of stream.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_full(&mut self, buf: &mut [u8]) -> StorageResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Writes all of `data` at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle stops accepting bytes or a write fails.
    fn write_all(&mut self, mut data: &[u8]) -> StorageResult<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            if n == 0 {
                return Err(StorageError::Io(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "stream accepted zero bytes",
                )));
            }
            data = &data[n..];
        }
        Ok(())
    }
}

impl<H: StreamHandle + ?Sized> StreamHandle for Box<H> {
    fn read(&mut self, buf: &mut [u8]) -> StorageResult<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        (**self).write(data)
    }

    fn seek(&mut self, pos: SeekFrom) -> StorageResult<u64> {
        (**self).seek(pos)
    }

    fn len(&self) -> StorageResult<u64> {
        (**self).len()
    }

    fn truncate(&mut self, at: u64) -> StorageResult<()> {
        (**self).truncate(at)
    }

    fn sync(&mut self) -> StorageResult<()> {
        (**self).sync()
    }
}

/// Opens the auxiliary stream that belongs to a filesystem path.
///
/// A provider returns `Ok(None)` when the stream does not exist and `create`
/// is false. With `create` set, an already existing stream is opened as is.
pub trait HandleProvider: Send + Sync {
    /// The handle type produced by this provider.
    type Handle: StreamHandle;

    /// Opens the stream for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot carry a stream or the open fails
    /// for any reason other than absence.
    fn open(
        &self,
        path: &Path,
        mode: OpenMode,
        create: bool,
    ) -> StorageResult<Option<Self::Handle>>;
}

/// Resolves a [`SeekFrom`] against a cursor and size, rejecting negative
/// results.
pub(crate) fn resolve_seek(pos: SeekFrom, current: u64, size: u64) -> StorageResult<u64> {
    let (base, delta) = match pos {
        SeekFrom::Start(offset) => return Ok(offset),
        SeekFrom::Current(delta) => (current, delta),
        SeekFrom::End(delta) => (size, delta),
    };
    let target = i128::from(base) + i128::from(delta);
    if target < 0 {
        return Err(StorageError::NegativeSeek {
            offset: i64::try_from(target).unwrap_or(i64::MIN),
        });
    }
    u64::try_from(target).map_err(|_| {
        StorageError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "seek offset overflows u64",
        ))
    })
}

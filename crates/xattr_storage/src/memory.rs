//! In-memory stream handles for testing.

use crate::error::{StorageError, StorageResult};
use crate::handle::{resolve_seek, HandleProvider, OpenMode, StreamHandle};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type SharedBuffer = Arc<RwLock<Vec<u8>>>;

/// A stream handle over a shared in-memory buffer.
///
/// Several handles may point at the same buffer; each keeps its own cursor,
/// as separate OS file handles would.
///
/// # Example
///
/// ```rust
/// use xattr_storage::{InMemoryStream, StreamHandle};
///
/// let mut stream = InMemoryStream::new();
/// stream.write_all(b"test data").unwrap();
/// assert_eq!(stream.len().unwrap(), 9);
/// assert_eq!(stream.position().unwrap(), 9);
/// ```
#[derive(Debug)]
pub struct InMemoryStream {
    data: SharedBuffer,
    position: u64,
    mode: OpenMode,
}

impl InMemoryStream {
    /// Creates a new empty read-write stream.
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(Vec::new())
    }

    /// Creates a read-write stream with pre-existing contents.
    ///
    /// Useful for testing corrupted or hand-built logs.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self::attach(Arc::new(RwLock::new(data)), OpenMode::ReadWrite)
    }

    fn attach(data: SharedBuffer, mode: OpenMode) -> Self {
        Self {
            data,
            position: 0,
            mode,
        }
    }

    /// Returns a copy of all bytes in the stream.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Returns the mode this handle was opened with.
    #[must_use]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    fn ensure_writable(&self) -> StorageResult<()> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(StorageError::ReadOnly)
        }
    }
}

impl Default for InMemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamHandle for InMemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> StorageResult<usize> {
        let data = self.data.read();
        let size = data.len() as u64;
        if self.position >= size {
            return Ok(0);
        }
        let start = self.position as usize;
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }

    fn write(&mut self, new_data: &[u8]) -> StorageResult<usize> {
        self.ensure_writable()?;
        if new_data.is_empty() {
            return Ok(0);
        }
        let mut data = self.data.write();
        let start = self.position as usize;
        let end = start + new_data.len();

        // Writing past the end leaves a zero-filled gap, like a sparse file.
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(new_data);
        self.position = end as u64;
        Ok(new_data.len())
    }

    fn seek(&mut self, pos: SeekFrom) -> StorageResult<u64> {
        let size = self.data.read().len() as u64;
        self.position = resolve_seek(pos, self.position, size)?;
        Ok(self.position)
    }

    fn len(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn truncate(&mut self, at: u64) -> StorageResult<()> {
        self.ensure_writable()?;
        let mut data = self.data.write();
        let size = data.len() as u64;

        if at > size {
            return Err(StorageError::TruncatePastEnd { at, size });
        }

        data.truncate(at as usize);
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        // Nothing to persist
        Ok(())
    }
}

/// A provider that keeps one in-memory stream per path.
///
/// # Thread Safety
///
/// The provider is thread-safe and can be shared across threads. It does not
/// serialize writers of the same path; callers keep one writer per path.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use xattr_storage::{HandleProvider, InMemoryProvider, OpenMode};
///
/// let provider = InMemoryProvider::new();
/// let path = Path::new("/tmp/report.txt");
/// assert!(provider.open(path, OpenMode::ReadOnly, false).unwrap().is_none());
/// assert!(provider.open(path, OpenMode::ReadWrite, true).unwrap().is_some());
/// assert_eq!(provider.contents(path), Some(Vec::new()));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    streams: RwLock<HashMap<PathBuf, SharedBuffer>>,
}

impl InMemoryProvider {
    /// Creates a provider with no streams.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a stream with the given contents, replacing any existing one.
    pub fn insert(&self, path: impl Into<PathBuf>, data: Vec<u8>) {
        self.streams
            .write()
            .insert(path.into(), Arc::new(RwLock::new(data)));
    }

    /// Returns a copy of the stream for `path`, if it exists.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.streams.read().get(path).map(|data| data.read().clone())
    }

    /// Deletes the stream for `path`, returning whether it existed.
    pub fn remove(&self, path: &Path) -> bool {
        self.streams.write().remove(path).is_some()
    }

    /// Returns the number of streams held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.read().len()
    }

    /// Returns `true` if no streams exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.read().is_empty()
    }
}

impl HandleProvider for InMemoryProvider {
    type Handle = InMemoryStream;

    fn open(
        &self,
        path: &Path,
        mode: OpenMode,
        create: bool,
    ) -> StorageResult<Option<InMemoryStream>> {
        if let Some(data) = self.streams.read().get(path) {
            return Ok(Some(InMemoryStream::attach(Arc::clone(data), mode)));
        }
        if !create {
            return Ok(None);
        }

        // Another caller may have created the stream between the two locks;
        // the entry API hands back whichever buffer won.
        let data = Arc::clone(self.streams.write().entry(path.to_path_buf()).or_default());
        Ok(Some(InMemoryStream::attach(data, mode)))
    }
}

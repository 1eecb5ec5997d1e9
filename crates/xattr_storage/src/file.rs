//! Filesystem-backed auxiliary streams.

use crate::error::{StorageError, StorageResult};
use crate::handle::{HandleProvider, OpenMode, StreamHandle};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Stream name used when none is configured.
pub const DEFAULT_STREAM_NAME: &str = "ElixirXattr";

/// Where the auxiliary stream of a path lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamLocation {
    /// An NTFS alternate data stream: `<path>:<stream_name>`.
    AlternateDataStream,
    /// A hidden file beside the target: `<dir>/.<file_name>.<stream_name>`.
    Sidecar,
}

impl Default for StreamLocation {
    fn default() -> Self {
        if cfg!(windows) {
            Self::AlternateDataStream
        } else {
            Self::Sidecar
        }
    }
}

/// A stream handle over an open file.
///
/// # Durability
///
/// - Writes go straight to the OS; there is no user-space buffering
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
#[derive(Debug)]
pub struct FileStream {
    file: File,
    mode: OpenMode,
}

impl FileStream {
    /// Wraps an already opened file.
    #[must_use]
    pub fn new(file: File, mode: OpenMode) -> Self {
        Self { file, mode }
    }

    fn ensure_writable(&self) -> StorageResult<()> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(StorageError::ReadOnly)
        }
    }
}

impl StreamHandle for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> StorageResult<usize> {
        loop {
            match self.file.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        self.ensure_writable()?;
        loop {
            match self.file.write(data) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn seek(&mut self, pos: SeekFrom) -> StorageResult<u64> {
        Ok(self.file.seek(pos)?)
    }

    fn len(&self) -> StorageResult<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn truncate(&mut self, at: u64) -> StorageResult<()> {
        self.ensure_writable()?;
        let size = self.len()?;
        if at > size {
            return Err(StorageError::TruncatePastEnd { at, size });
        }
        self.file.set_len(at)?;
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

/// Opens auxiliary streams on the local filesystem.
///
/// Opening with `create` requires the target itself to exist, as setting an
/// attribute on a missing file does with native extended attributes. Reads
/// on a missing target see an absent stream.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use xattr_storage::{FileProvider, HandleProvider, OpenMode, StreamLocation};
///
/// let provider = FileProvider::new("ElixirXattr", StreamLocation::Sidecar);
/// let stream = provider.open(Path::new("report.txt"), OpenMode::ReadWrite, true).unwrap();
/// assert!(stream.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct FileProvider {
    stream_name: String,
    location: StreamLocation,
}

impl FileProvider {
    /// Creates a provider using the given stream name and location.
    pub fn new(stream_name: impl Into<String>, location: StreamLocation) -> Self {
        Self {
            stream_name: stream_name.into(),
            location,
        }
    }

    /// Returns the configured stream name.
    #[must_use]
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Returns the configured stream location.
    #[must_use]
    pub fn location(&self) -> StreamLocation {
        self.location
    }

    /// Computes the path of the auxiliary stream for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPath`] if `path` has no file name to
    /// attach a sidecar to.
    pub fn stream_path(&self, path: &Path) -> StorageResult<PathBuf> {
        match self.location {
            StreamLocation::AlternateDataStream => {
                let mut ads = OsString::from(path.as_os_str());
                ads.push(":");
                ads.push(&self.stream_name);
                Ok(PathBuf::from(ads))
            }
            StreamLocation::Sidecar => {
                let Some(file_name) = path.file_name() else {
                    return Err(StorageError::invalid_path(path, "path has no file name"));
                };
                let mut sidecar = OsString::from(".");
                sidecar.push(file_name);
                sidecar.push(".");
                sidecar.push(&self.stream_name);
                Ok(path.with_file_name(sidecar))
            }
        }
    }
}

impl Default for FileProvider {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_NAME, StreamLocation::default())
    }
}

impl HandleProvider for FileProvider {
    type Handle = FileStream;

    fn open(
        &self,
        path: &Path,
        mode: OpenMode,
        create: bool,
    ) -> StorageResult<Option<FileStream>> {
        let create = create && mode.is_writable();
        if create && !path.exists() {
            return Err(StorageError::TargetMissing {
                path: path.to_path_buf(),
            });
        }

        let stream_path = self.stream_path(path)?;
        // `create` without `truncate` opens an existing stream untouched, so a
        // racing creator is not an error.
        let opened = OpenOptions::new()
            .read(true)
            .write(mode.is_writable())
            .create(create)
            .truncate(false)
            .open(&stream_path);

        match opened {
            Ok(file) => Ok(Some(FileStream::new(file, mode))),
            Err(e) if !create && e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sidecar() -> FileProvider {
        FileProvider::new("attrs", StreamLocation::Sidecar)
    }

    #[test]
    fn sidecar_path_is_hidden_sibling() {
        let provider = sidecar();
        let stream = provider.stream_path(Path::new("/data/report.txt")).unwrap();
        assert_eq!(stream, PathBuf::from("/data/.report.txt.attrs"));
    }

    #[test]
    fn ads_path_appends_stream_name() {
        let provider = FileProvider::new("ElixirXattr", StreamLocation::AlternateDataStream);
        let target = Path::new("C:/data/report.txt");
        let stream = provider.stream_path(target).unwrap();
        assert_eq!(stream, PathBuf::from("C:/data/report.txt:ElixirXattr"));
    }

    #[test]
    fn sidecar_rejects_path_without_file_name() {
        let result = sidecar().stream_path(Path::new("/"));
        assert!(matches!(result, Err(StorageError::InvalidPath { .. })));
    }

    #[test]
    fn default_provider_uses_compatible_name() {
        let provider = FileProvider::default();
        assert_eq!(provider.stream_name(), DEFAULT_STREAM_NAME);
        assert_eq!(provider.location(), StreamLocation::default());
    }

    #[test]
    fn open_missing_stream_without_create_is_absent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"payload").unwrap();

        let provider = sidecar();
        assert!(provider
            .open(&target, OpenMode::ReadOnly, false)
            .unwrap()
            .is_none());
        assert!(provider
            .open(&target, OpenMode::ReadWrite, false)
            .unwrap()
            .is_none());
    }

    #[test]
    fn open_on_missing_target_for_read_is_absent() {
        let dir = tempdir().unwrap();
        let provider = sidecar();
        let missing = dir.path().join("nope.txt");
        let result = provider.open(&missing, OpenMode::ReadOnly, false).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn create_on_missing_target_fails() {
        let dir = tempdir().unwrap();
        let provider = sidecar();
        let missing = dir.path().join("nope.txt");
        let result = provider.open(&missing, OpenMode::ReadWrite, true);
        assert!(matches!(result, Err(StorageError::TargetMissing { .. })));
    }

    #[test]
    fn create_write_and_reopen() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"payload").unwrap();
        let provider = sidecar();

        {
            let mut stream = provider
                .open(&target, OpenMode::ReadWrite, true)
                .unwrap()
                .unwrap();
            stream.write_all(b"persistent data").unwrap();
            stream.sync().unwrap();
        }

        let mut stream = provider
            .open(&target, OpenMode::ReadOnly, false)
            .unwrap()
            .unwrap();
        assert_eq!(stream.len().unwrap(), 15);
        let mut buf = vec![0u8; 15];
        assert_eq!(stream.read_full(&mut buf).unwrap(), 15);
        assert_eq!(&buf, b"persistent data");

        // The target file itself is untouched.
        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
    }

    #[test]
    fn create_existing_stream_keeps_contents() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"").unwrap();
        let provider = sidecar();
        let stream_path = provider.stream_path(&target).unwrap();
        std::fs::write(&stream_path, b"old").unwrap();

        let stream = provider
            .open(&target, OpenMode::ReadWrite, true)
            .unwrap()
            .unwrap();
        assert_eq!(stream.len().unwrap(), 3);
    }

    #[test]
    fn truncate_and_overwrite() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"").unwrap();
        let provider = sidecar();

        let mut stream = provider
            .open(&target, OpenMode::ReadWrite, true)
            .unwrap()
            .unwrap();
        stream.write_all(b"hello world").unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();
        stream.write_all(b"HELLO").unwrap();
        stream.truncate(5).unwrap();
        assert_eq!(stream.len().unwrap(), 5);
        assert!(matches!(
            stream.truncate(9),
            Err(StorageError::TruncatePastEnd { at: 9, size: 5 })
        ));

        stream.seek(SeekFrom::Start(0)).unwrap();
        let mut buf = [0u8; 5];
        stream.read_full(&mut buf).unwrap();
        assert_eq!(&buf, b"HELLO");
    }

    #[test]
    fn read_only_file_handle_rejects_mutation() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"").unwrap();
        let provider = sidecar();
        let stream_path = provider.stream_path(&target).unwrap();
        std::fs::write(&stream_path, b"data").unwrap();

        let mut stream = provider
            .open(&target, OpenMode::ReadOnly, false)
            .unwrap()
            .unwrap();
        assert!(matches!(stream.write(b"x"), Err(StorageError::ReadOnly)));
        assert!(matches!(stream.truncate(0), Err(StorageError::ReadOnly)));
    }
}

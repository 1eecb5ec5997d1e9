//! Path-level attribute store.
//!
//! [`AttrStore`] opens a path's auxiliary stream through a
//! [`HandleProvider`], runs one engine operation and releases the handle on
//! every exit path. Nothing is cached between calls.
//!
//! ## Name Encoding
//!
//! Names are non-empty text without interior NUL bytes. They are stored with
//! a trailing NUL so logs written by earlier native implementations stay
//! readable.
//!
//! ## Concurrency
//!
//! The store performs no locking. Two writers on the same path can interleave
//! blocks and corrupt its log; callers must keep one writer per path.

use crate::config::Config;
use crate::engine::{
    contains_name, find_value, list_names, remove_attribute, write_attribute, Compactor,
};
use crate::error::{CoreError, CoreResult};
use std::path::Path;
use tracing::{debug, warn};
use xattr_storage::{
    FileProvider, HandleProvider, InMemoryProvider, OpenMode, StorageError, StreamHandle,
};

/// A named-attribute store keyed by filesystem path.
///
/// # Example
///
/// ```rust
/// use xattr_core::AttrStore;
///
/// let store = AttrStore::in_memory();
/// store.set("notes.txt", "author", b"ada").unwrap();
/// assert_eq!(store.get("notes.txt", "author").unwrap(), b"ada");
/// assert_eq!(store.list("notes.txt").unwrap(), vec!["author".to_string()]);
///
/// store.remove("notes.txt", "author").unwrap();
/// assert!(!store.has("notes.txt", "author").unwrap());
/// ```
#[derive(Debug)]
pub struct AttrStore<P: HandleProvider> {
    provider: P,
    config: Config,
}

impl AttrStore<InMemoryProvider> {
    /// Creates a store backed by in-memory streams.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(InMemoryProvider::new(), Config::default())
    }
}

impl AttrStore<FileProvider> {
    /// Creates a store that keeps streams on disk, named and placed as
    /// `config` says.
    #[must_use]
    pub fn on_disk(config: Config) -> Self {
        let provider = FileProvider::new(config.stream_name.clone(), config.location);
        Self::new(provider, config)
    }
}

impl<P: HandleProvider> AttrStore<P> {
    /// Creates a store over an arbitrary provider.
    pub fn new(provider: P, config: Config) -> Self {
        Self { provider, config }
    }

    /// Returns the handle provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lists the attribute names of `path`.
    ///
    /// A path without a stream has no attributes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty path, `InvalidFormat` for a
    /// corrupt log or a name that is not NUL-terminated UTF-8, or a storage
    /// error.
    pub fn list(&self, path: impl AsRef<Path>) -> CoreResult<Vec<String>> {
        let path = path.as_ref();
        let Some(mut handle) = self.open_for_read(path, "list")? else {
            return Ok(Vec::new());
        };

        let names = list_names(&mut handle, self.config.initial_scratch_capacity)
            .map_err(|e| log_failure(path, "list", e))?;
        debug!(path = %path.display(), count = names.len(), "listed attributes");
        names.iter().map(|raw| decode_name(raw)).collect()
    }

    /// Returns `true` if `path` has an attribute called `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty path or invalid name, or a
    /// format or storage error.
    pub fn has(&self, path: impl AsRef<Path>, name: &str) -> CoreResult<bool> {
        let path = path.as_ref();
        let name = encode_name(name)?;
        let Some(mut handle) = self.open_for_read(path, "has")? else {
            return Ok(false);
        };

        contains_name(&mut handle, &name, self.config.initial_scratch_capacity)
            .map_err(|e| log_failure(path, "has", e))
    }

    /// Returns the value of attribute `name` on `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the attribute (or the whole stream) is absent,
    /// `InvalidArgument` for an empty path or invalid name, or a format or
    /// storage error.
    pub fn get(&self, path: impl AsRef<Path>, name: &str) -> CoreResult<Vec<u8>> {
        let path = path.as_ref();
        let raw = encode_name(name)?;
        let Some(mut handle) = self.open_for_read(path, "get")? else {
            return Err(CoreError::not_found(&raw));
        };

        find_value(&mut handle, &raw, self.config.initial_scratch_capacity)
            .map_err(|e| log_failure(path, "get", e))?
            .ok_or_else(|| CoreError::not_found(&raw))
    }

    /// Sets attribute `name` on `path` to `value`, creating the stream if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty path, invalid name or oversized
    /// value, or a format, allocation or storage error. Never `NotFound`.
    pub fn set(&self, path: impl AsRef<Path>, name: &str, value: &[u8]) -> CoreResult<()> {
        let path = path.as_ref();
        let raw = encode_name(name)?;
        validate_path(path)?;

        let Some(mut handle) = self.open(path, OpenMode::ReadWrite, true, "set")? else {
            let error = StorageError::StreamNotCreated {
                path: path.to_path_buf(),
            };
            return Err(log_failure(path, "set", error.into()));
        };

        write_attribute(&mut handle, &raw, value, &self.compactor())
            .map_err(|e| log_failure(path, "set", e))?;
        self.finish_write(&mut handle)
            .map_err(|e| log_failure(path, "set", e))?;
        debug!(path = %path.display(), name, len = value.len(), "set attribute");
        Ok(())
    }

    /// Removes attribute `name` from `path`.
    ///
    /// Unlike the read operations, a path without a stream is an error here.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the attribute or the stream is absent,
    /// `InvalidArgument` for an empty path or invalid name, or a format,
    /// allocation or storage error.
    pub fn remove(&self, path: impl AsRef<Path>, name: &str) -> CoreResult<()> {
        let path = path.as_ref();
        let raw = encode_name(name)?;
        validate_path(path)?;

        let Some(mut handle) = self.open(path, OpenMode::ReadWrite, false, "remove")? else {
            return Err(CoreError::not_found(&raw));
        };

        remove_attribute(&mut handle, &raw, &self.compactor())
            .map_err(|e| log_failure(path, "remove", e))?;
        self.finish_write(&mut handle)
            .map_err(|e| log_failure(path, "remove", e))?;
        debug!(path = %path.display(), name, "removed attribute");
        Ok(())
    }

    fn open_for_read(&self, path: &Path, operation: &str) -> CoreResult<Option<P::Handle>> {
        validate_path(path)?;
        self.open(path, OpenMode::ReadOnly, false, operation)
    }

    fn open(
        &self,
        path: &Path,
        mode: OpenMode,
        create: bool,
        operation: &str,
    ) -> CoreResult<Option<P::Handle>> {
        self.provider
            .open(path, mode, create)
            .map_err(|e| log_failure(path, operation, e.into()))
    }

    fn compactor(&self) -> Compactor {
        Compactor::from_config(&self.config)
    }

    fn finish_write(&self, handle: &mut P::Handle) -> CoreResult<()> {
        if self.config.sync_on_write {
            handle.sync()?;
        }
        Ok(())
    }
}

fn validate_path(path: &Path) -> CoreResult<()> {
    if path.as_os_str().is_empty() {
        return Err(CoreError::invalid_argument("path must not be empty"));
    }
    Ok(())
}

/// Converts an attribute name to its stored form.
fn encode_name(name: &str) -> CoreResult<Vec<u8>> {
    if name.is_empty() {
        return Err(CoreError::invalid_argument("attribute name must not be empty"));
    }
    if name.contains('\0') {
        return Err(CoreError::invalid_argument("attribute name must not contain NUL"));
    }
    let mut raw = Vec::with_capacity(name.len() + 1);
    raw.extend_from_slice(name.as_bytes());
    raw.push(0);
    Ok(raw)
}

fn decode_name(raw: &[u8]) -> CoreResult<String> {
    let text = raw.strip_suffix(b"\0").ok_or_else(|| {
        CoreError::invalid_format(format!(
            "attribute name of {} bytes lacks its NUL terminator",
            raw.len()
        ))
    })?;
    String::from_utf8(text.to_vec()).map_err(|e| {
        let message = format!("attribute name is not UTF-8: {e}");
        CoreError::invalid_format(message)
    })
}

fn log_failure(path: &Path, operation: &str, error: CoreError) -> CoreError {
    if !error.is_not_found() {
        warn!(path = %path.display(), operation, %error, "attribute operation failed");
    }
    error
}

//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up attribute stores and the
//! target files they attach to.

use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;
use xattr_core::{AttrStore, Config, FileProvider, HandleProvider, InMemoryProvider, StreamLocation};

/// A test store with automatic cleanup.
pub struct TestStore<P: HandleProvider> {
    /// The store instance.
    pub store: AttrStore<P>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestStore<InMemoryProvider> {
    /// Creates a store over in-memory streams.
    pub fn memory() -> Self {
        Self::memory_with(Config::default())
    }

    /// Creates an in-memory store with the given configuration.
    pub fn memory_with(config: Config) -> Self {
        Self {
            store: AttrStore::new(InMemoryProvider::new(), config),
            temp_dir: None,
        }
    }
}

impl TestStore<FileProvider> {
    /// Creates an on-disk store in a fresh temporary directory.
    ///
    /// Streams are kept as sidecar files so the fixture behaves the same on
    /// every platform.
    pub fn file() -> Self {
        Self::file_with(Config::default().location(StreamLocation::Sidecar))
    }

    /// Creates an on-disk store with the given configuration.
    pub fn file_with(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            store: AttrStore::on_disk(config),
            temp_dir: Some(temp_dir),
        }
    }
}

impl<P: HandleProvider> TestStore<P> {
    /// Returns the temporary directory if on-disk, None if in-memory.
    pub fn dir(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(TempDir::path)
    }

    /// Returns a target path named `name`.
    ///
    /// On disk the target file is created (empty) if it does not exist yet,
    /// since streams can only be attached to existing files.
    pub fn target(&self, name: &str) -> PathBuf {
        match self.dir() {
            Some(dir) => {
                let path = dir.join(name);
                if !path.exists() {
                    File::create(&path).expect("Failed to create target file");
                }
                path
            }
            None => PathBuf::from(name),
        }
    }
}

impl<P: HandleProvider> std::ops::Deref for TestStore<P> {
    type Target = AttrStore<P>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Installs a test-friendly tracing subscriber.
///
/// Filtering follows `RUST_LOG`. Safe to call from every test; only the first
/// call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Runs a test with a temporary in-memory store.
///
/// # Example
///
/// ```rust
/// use xattr_testkit::with_memory_store;
///
/// with_memory_store(|store| {
///     store.set("f", "k", b"v").unwrap();
///     assert_eq!(store.get("f", "k").unwrap(), b"v");
/// });
/// ```
pub fn with_memory_store<F, R>(f: F) -> R
where
    F: FnOnce(&AttrStore<InMemoryProvider>) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a temporary on-disk store and one existing target file.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&AttrStore<FileProvider>, &Path) -> R,
{
    let test_store = TestStore::file();
    let target = test_store.target("target");
    f(&test_store.store, &target)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates an in-memory store whose `path` holds `count` attributes
    /// named `attr_0`, `attr_1`, ... with values of increasing length.
    pub fn populated_store(path: &str, count: usize) -> TestStore<InMemoryProvider> {
        let test_store = TestStore::memory();
        for i in 0..count {
            let value = vec![(i % 251) as u8; i];
            test_store
                .set(path, &format!("attr_{i}"), &value)
                .expect("Failed to set attribute");
        }
        test_store
    }
}

//! Shared fixtures for the file handle integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use diskfile_files::{FileManager, TempFactory};
use diskfile_signing::UrlSigner;
use diskfile_storage::{ByteStream, DiskRegistry, LocalBackend, MemoryBackend, StorageBackend, StorageError};
use parking_lot::Mutex;
use rstest::fixture;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const SECRET: &str = "test-secret";
pub const BASE_URL: &str = "https://files.test";

/// Records every backend call made through it
pub struct CountingBackend {
    inner: Arc<dyn StorageBackend>,
    calls: Mutex<Vec<String>>,
}

impl CountingBackend {
    pub fn new(inner: Arc<dyn StorageBackend>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }
}

#[async_trait]
impl StorageBackend for CountingBackend {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        self.record("exists");
        self.inner.exists(path).await
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
        self.record("read_stream");
        self.inner.read_stream(path).await
    }

    async fn write_stream(&self, path: &str, stream: ByteStream) -> Result<(), StorageError> {
        self.record("write_stream");
        self.inner.write_stream(path, stream).await
    }

    async fn put(&self, path: &str, contents: Bytes) -> Result<(), StorageError> {
        self.record("put");
        self.inner.put(path, contents).await
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.record("delete");
        self.inner.delete(path).await
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        self.record("copy");
        self.inner.copy(from, to).await
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        self.record("rename");
        self.inner.rename(from, to).await
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        self.record("size");
        self.inner.size(path).await
    }

    async fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, StorageError> {
        self.record("last_modified");
        self.inner.last_modified(path).await
    }

    async fn public_url(&self, path: &str) -> Result<String, StorageError> {
        self.record("public_url");
        self.inner.public_url(path).await
    }

    async fn create_directory(&self, path: &str) -> Result<(), StorageError> {
        self.record("create_directory");
        self.inner.create_directory(path).await
    }

    fn local_path(&self, path: &str) -> Option<PathBuf> {
        self.inner.local_path(path)
    }

    fn is_remote(&self) -> bool {
        self.inner.is_remote()
    }
}

/// In-memory disk whose writes can be made to fail loudly or silently
#[derive(Default)]
pub struct FaultyBackend {
    inner: MemoryBackend,
    fail_writes: AtomicBool,
    drop_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FaultyBackend {
    /// Writes return an error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Writes report success but store nothing
    pub fn drop_writes(&self, drop: bool) {
        self.drop_writes.store(drop, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self, path: &str) -> Result<bool, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteError(path.to_string(), "injected failure".to_string()));
        }
        Ok(!self.drop_writes.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl StorageBackend for FaultyBackend {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        self.inner.exists(path).await
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
        self.inner.read_stream(path).await
    }

    async fn write_stream(&self, path: &str, stream: ByteStream) -> Result<(), StorageError> {
        if self.check(path)? {
            self.inner.write_stream(path, stream).await
        } else {
            Ok(())
        }
    }

    async fn put(&self, path: &str, contents: Bytes) -> Result<(), StorageError> {
        if self.check(path)? {
            self.inner.put(path, contents).await
        } else {
            Ok(())
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.inner.delete(path).await
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        self.inner.copy(from, to).await
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        self.inner.rename(from, to).await
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        self.inner.size(path).await
    }

    async fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, StorageError> {
        self.inner.last_modified(path).await
    }

    fn is_remote(&self) -> bool {
        true
    }
}

/// A file manager over four disks:
///
/// - `local`: filesystem disk, the default, wrapped in a call counter
/// - `objects`: in-memory disk, the cloud disk
/// - `flaky`: in-memory disk with injectable write faults
/// - `public`: filesystem disk with a public base URL
pub struct TestEnv {
    pub files: FileManager,
    pub local: Arc<CountingBackend>,
    pub objects: Arc<MemoryBackend>,
    pub flaky: Arc<FaultyBackend>,
    pub base: TempDir,
}

impl TestEnv {
    pub fn local_root(&self) -> PathBuf {
        self.base.path().join("local")
    }

    pub fn temp_root(&self) -> PathBuf {
        self.base.path().join("tmp")
    }

    /// Number of entries left under the temp root
    pub fn temp_entries(&self) -> usize {
        std::fs::read_dir(self.temp_root())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

#[fixture]
pub fn env() -> TestEnv {
    let base = tempfile::tempdir().unwrap();

    let local = Arc::new(CountingBackend::new(Arc::new(LocalBackend::new(
        base.path().join("local"),
        None,
    ))));
    let objects = Arc::new(MemoryBackend::new());
    let flaky = Arc::new(FaultyBackend::default());
    let public = Arc::new(LocalBackend::new(
        base.path().join("public"),
        Some("https://cdn.test/public".to_string()),
    ));

    let registry = DiskRegistry::new("local", "objects")
        .with_disk("local", local.clone())
        .with_disk("objects", objects.clone())
        .with_disk("flaky", flaky.clone())
        .with_disk("public", public);

    let signer = UrlSigner::new(SECRET, BASE_URL).unwrap();
    let temp = TempFactory::new(base.path().join("tmp"));
    let files = FileManager::new(registry, signer, temp, Some(chrono::Duration::hours(1)));

    TestEnv {
        files,
        local,
        objects,
        flaky,
        base,
    }
}

/// Test stream yielding `chunks` in order
pub fn stream_of(chunks: &[&'static [u8]]) -> ByteStream {
    use futures::StreamExt;
    let chunks: Vec<std::io::Result<Bytes>> =
        chunks.iter().map(|chunk| Ok(Bytes::from_static(chunk))).collect();
    futures::stream::iter(chunks).boxed()
}

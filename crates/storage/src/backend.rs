use crate::StorageError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::path::PathBuf;

/// Lazily produced file contents
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Storage backend trait for file storage abstraction
///
/// Paths are the normalized paths held by a `PathRef`: relative to the backend
/// root, or absolute for the root disk.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Whether a file exists at `path`
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Opens `path` for chunked reading
    async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError>;

    /// Writes `path` from a chunked stream, replacing existing contents
    async fn write_stream(&self, path: &str, stream: ByteStream) -> Result<(), StorageError>;

    /// Writes `path` from an in-memory buffer, replacing existing contents
    async fn put(&self, path: &str, contents: Bytes) -> Result<(), StorageError>;

    /// Deletes `path`; deleting a missing file succeeds
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Native copy within this backend
    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Native move within this backend
    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Size in bytes
    async fn size(&self, path: &str) -> Result<u64, StorageError>;

    async fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, StorageError>;

    /// Backend-hosted URL valid until `expires_at`
    async fn temporary_url(
        &self,
        path: &str,
        _expires_at: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        Err(StorageError::Unsupported(format!("temporary url for '{}'", path)))
    }

    /// Backend-hosted permanent URL
    async fn public_url(&self, path: &str) -> Result<String, StorageError> {
        Err(StorageError::Unsupported(format!("public url for '{}'", path)))
    }

    /// Creates a directory; a no-op on backends without real directories
    async fn create_directory(&self, _path: &str) -> Result<(), StorageError> {
        Ok(())
    }

    /// Real filesystem location of `path`, for backends that have one
    fn local_path(&self, _path: &str) -> Option<PathBuf> {
        None
    }

    /// Check if backend is local or remote
    fn is_remote(&self) -> bool;
}

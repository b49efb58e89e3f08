use crate::backend::{ByteStream, StorageBackend};
use crate::StorageError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

/// Local filesystem storage backend
pub struct LocalBackend {
    base_path: PathBuf,
    base_url: Option<String>,
}

impl LocalBackend {
    pub fn new(base_path: PathBuf, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Self { base_path, base_url }
    }

    /// Backend rooted at the real filesystem root
    pub fn root() -> Self {
        Self::new(PathBuf::from("/"), None)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path.trim_start_matches('/'))
    }

    async fn ensure_parent(target: &Path) -> Result<(), StorageError> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn not_found_or(path: &str, e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::NotFound(path.to_string())
    } else {
        StorageError::IoError(e)
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalBackend {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        match fs::metadata(self.full_path(path)).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
        let file = fs::File::open(self.full_path(path))
            .await
            .map_err(|e| not_found_or(path, e))?;

        Ok(ReaderStream::new(file).boxed())
    }

    async fn write_stream(&self, path: &str, mut stream: ByteStream) -> Result<(), StorageError> {
        let full_path = self.full_path(path);
        Self::ensure_parent(&full_path).await?;

        let write_error = |e: std::io::Error| StorageError::WriteError(path.to_string(), e.to_string());

        let mut file = fs::File::create(&full_path).await.map_err(write_error)?;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(write_error)?;
            file.write_all(&chunk).await.map_err(write_error)?;
        }
        file.flush().await.map_err(write_error)?;

        tracing::debug!("local: wrote {}", full_path.display());
        Ok(())
    }

    async fn put(&self, path: &str, contents: Bytes) -> Result<(), StorageError> {
        let full_path = self.full_path(path);
        Self::ensure_parent(&full_path).await?;

        fs::write(&full_path, &contents)
            .await
            .map_err(|e| StorageError::WriteError(path.to_string(), e.to_string()))?;

        tracing::debug!("local: put {} ({} bytes)", full_path.display(), contents.len());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.full_path(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteError(path.to_string(), e.to_string())),
        }
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let target = self.full_path(to);
        Self::ensure_parent(&target).await?;

        fs::copy(self.full_path(from), &target)
            .await
            .map_err(|e| not_found_or(from, e))?;
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let source = self.full_path(from);
        let target = self.full_path(to);
        Self::ensure_parent(&target).await?;

        match fs::rename(&source, &target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(from.to_string())),
            Err(e) => {
                // Renames across mount points fail; fall back to copy + remove
                tracing::debug!("local: rename {} failed ({}), copying instead", source.display(), e);
                fs::copy(&source, &target).await?;
                fs::remove_file(&source).await?;
                Ok(())
            }
        }
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let metadata = fs::metadata(self.full_path(path))
            .await
            .map_err(|e| not_found_or(path, e))?;
        Ok(metadata.len())
    }

    async fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, StorageError> {
        let metadata = fs::metadata(self.full_path(path))
            .await
            .map_err(|e| not_found_or(path, e))?;
        Ok(metadata.modified()?.into())
    }

    async fn public_url(&self, path: &str) -> Result<String, StorageError> {
        match &self.base_url {
            Some(base_url) => Ok(format!("{}/{}", base_url, path.trim_start_matches('/'))),
            None => Err(StorageError::Unsupported(format!("public url for '{}'", path))),
        }
    }

    async fn create_directory(&self, path: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.full_path(path)).await?;
        Ok(())
    }

    fn local_path(&self, path: &str) -> Option<PathBuf> {
        Some(self.full_path(path))
    }

    fn is_remote(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path().to_path_buf(), None);
        (dir, backend)
    }

    async fn read_all(backend: &LocalBackend, path: &str) -> Vec<u8> {
        let mut stream = backend.read_stream(path).await.unwrap();
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_put_creates_parent_directories() {
        let (_dir, backend) = backend();

        backend.put("a/b/c.txt", Bytes::from_static(b"hello")).await.unwrap();

        assert!(backend.exists("a/b/c.txt").await.unwrap());
        assert!(!backend.exists("a/b").await.unwrap());
        assert_eq!(backend.size("a/b/c.txt").await.unwrap(), 5);
        assert_eq!(read_all(&backend, "a/b/c.txt").await, b"hello");
    }

    #[tokio::test]
    async fn test_write_stream_concatenates_chunks() {
        let (_dir, backend) = backend();
        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"a,b,c\n")),
            Ok(Bytes::from_static(b"1,2,3")),
        ])
        .boxed();

        backend.write_stream("reports/q1.csv", chunks).await.unwrap();

        assert_eq!(read_all(&backend, "reports/q1.csv").await, b"a,b,c\n1,2,3");
    }

    #[tokio::test]
    async fn test_failing_stream_is_write_error() {
        let (_dir, backend) = backend();
        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(ErrorKind::ConnectionReset, "peer went away")),
        ])
        .boxed();

        let result = backend.write_stream("broken.bin", chunks).await;
        assert!(matches!(result, Err(StorageError::WriteError(_, _))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, backend) = backend();
        backend.put("x.txt", Bytes::from_static(b"x")).await.unwrap();

        backend.delete("x.txt").await.unwrap();
        backend.delete("x.txt").await.unwrap();

        assert!(!backend.exists("x.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_and_rename() {
        let (_dir, backend) = backend();
        backend.put("src.txt", Bytes::from_static(b"data")).await.unwrap();

        backend.copy("src.txt", "copies/dst.txt").await.unwrap();
        assert!(backend.exists("src.txt").await.unwrap());
        assert!(backend.exists("copies/dst.txt").await.unwrap());

        backend.rename("src.txt", "moved/src.txt").await.unwrap();
        assert!(!backend.exists("src.txt").await.unwrap());
        assert_eq!(read_all(&backend, "moved/src.txt").await, b"data");
    }

    #[tokio::test]
    async fn test_missing_file_metadata_is_not_found() {
        let (_dir, backend) = backend();

        assert!(matches!(backend.size("nope").await, Err(StorageError::NotFound(_))));
        assert!(matches!(backend.last_modified("nope").await, Err(StorageError::NotFound(_))));
        assert!(matches!(backend.read_stream("nope").await, Err(StorageError::NotFound(_))));
        assert!(matches!(backend.rename("nope", "other").await, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_urls() {
        let dir = tempfile::tempdir().unwrap();
        let public = LocalBackend::new(dir.path().to_path_buf(), Some("https://cdn.test/files/".to_string()));
        let private = LocalBackend::new(dir.path().to_path_buf(), Some(String::new()));

        assert_eq!(public.public_url("a/b.png").await.unwrap(), "https://cdn.test/files/a/b.png");
        assert!(matches!(private.public_url("a/b.png").await, Err(StorageError::Unsupported(_))));
        assert!(matches!(
            public.temporary_url("a/b.png", Utc::now()).await,
            Err(StorageError::Unsupported(_))
        ));
    }

    #[test]
    fn test_root_backend_resolves_absolute_paths() {
        let backend = LocalBackend::root();
        assert_eq!(backend.local_path("/tmp/x/y.txt"), Some(PathBuf::from("/tmp/x/y.txt")));
    }
}

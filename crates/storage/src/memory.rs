use crate::backend::{ByteStream, StorageBackend};
use crate::StorageError;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use parking_lot::RwLock;
use std::collections::HashMap;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    modified: DateTime<Utc>,
}

/// In-process object store with flat keys and no directories.
///
/// Behaves like a bucket: `create_directory` is a no-op and there is no native URL.
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    fn insert(&self, path: &str, data: Bytes) {
        self.objects.write().insert(
            path.to_string(),
            StoredObject {
                data,
                modified: Utc::now(),
            },
        );
    }

    fn get(&self, path: &str) -> Result<StoredObject, StorageError> {
        self.objects
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.objects.read().contains_key(path))
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
        let data = self.get(path)?.data;

        // Slicing Bytes shares the buffer, so chunking copies nothing
        let chunks: Vec<std::io::Result<Bytes>> = (0..data.len())
            .step_by(CHUNK_SIZE)
            .map(|start| Ok(data.slice(start..(start + CHUNK_SIZE).min(data.len()))))
            .collect();

        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn write_stream(&self, path: &str, mut stream: ByteStream) -> Result<(), StorageError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StorageError::WriteError(path.to_string(), e.to_string()))?;
            buffer.extend_from_slice(&chunk);
        }

        self.insert(path, buffer.freeze());
        Ok(())
    }

    async fn put(&self, path: &str, contents: Bytes) -> Result<(), StorageError> {
        self.insert(path, contents);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.objects.write().remove(path);
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let object = self.get(from)?;
        self.insert(to, object.data);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let mut objects = self.objects.write();
        let object = objects
            .remove(from)
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        objects.insert(to.to_string(), object);
        Ok(())
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        Ok(self.get(path)?.data.len() as u64)
    }

    async fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, StorageError> {
        Ok(self.get(path)?.modified)
    }

    fn is_remote(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_large_object_is_streamed_in_chunks() {
        let backend = MemoryBackend::new();
        let data = Bytes::from(vec![7u8; CHUNK_SIZE * 2 + 10]);
        backend.put("big.bin", data.clone()).await.unwrap();

        let chunks: Vec<Bytes> = backend
            .read_stream("big.bin")
            .await
            .unwrap()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 10);
        assert_eq!(chunks.concat(), data.to_vec());
    }

    #[tokio::test]
    async fn test_empty_object_exists() {
        let backend = MemoryBackend::new();
        backend.put("empty", Bytes::new()).await.unwrap();

        assert!(backend.exists("empty").await.unwrap());
        assert_eq!(backend.size("empty").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let backend = MemoryBackend::new();
        backend.put("a", Bytes::from_static(b"1")).await.unwrap();

        backend.rename("a", "b").await.unwrap();
        assert!(!backend.exists("a").await.unwrap());
        assert!(backend.exists("b").await.unwrap());

        backend.delete("b").await.unwrap();
        backend.delete("b").await.unwrap();
        assert!(backend.is_empty());
        assert!(matches!(backend.rename("b", "c").await, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_has_no_native_urls() {
        let backend = MemoryBackend::new();
        assert!(matches!(backend.public_url("a").await, Err(StorageError::Unsupported(_))));
        assert!(backend.local_path("a").is_none());
    }
}

use crate::{Contents, FileError, FileHandle, FileManager};
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use diskfile_models::PathRef;
use diskfile_storage::{ByteStream, StorageBackend, StorageError};
use futures::StreamExt;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Extensions the image adapter can convert
const CONVERTIBLE: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

impl FileHandle {
    pub(crate) fn new(files: FileManager, location: PathRef, name: Option<String>) -> Self {
        let name = name.unwrap_or_else(|| location.name().to_string());
        Self { location, name, files }
    }

    pub fn location(&self) -> &PathRef {
        &self.location
    }

    pub fn path(&self) -> &str {
        self.location.path()
    }

    /// Resolved disk name; never `default` or `cloud`
    pub fn disk(&self) -> &str {
        self.location.disk()
    }

    pub fn manager(&self) -> &FileManager {
        &self.files
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.location.name()
    }

    /// Name the file was created with, used for downloads and archives
    pub fn display_name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &str {
        self.location.directory()
    }

    pub fn extension(&self) -> String {
        self.location.extension()
    }

    /// ASCII slug of the display name
    pub fn slug_name(&self) -> String {
        diskfile_utils::slug_name(&self.name)
    }

    /// MIME type guessed from the extension
    pub fn mime(&self) -> String {
        mime_guess::from_ext(&self.extension())
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Top-level MIME type (`image`, `text`, ...)
    pub fn kind(&self) -> String {
        let mime = self.mime();
        mime.split('/').next().unwrap_or_default().to_string()
    }

    /// Whether the image adapter can work on this file
    pub fn convertible(&self) -> bool {
        self.kind() == "image" && CONVERTIBLE.contains(&self.extension().as_str())
    }

    pub(crate) fn backend(&self) -> Result<Arc<dyn StorageBackend>, FileError> {
        Ok(self.files.registry().disk(self.disk())?)
    }

    /// Real filesystem path, for disks backed by the local filesystem
    pub fn local_path(&self) -> Option<PathBuf> {
        self.backend().ok()?.local_path(self.path())
    }

    pub async fn exists(&self) -> Result<bool, FileError> {
        Ok(self.backend()?.exists(self.path()).await?)
    }

    pub async fn size(&self) -> Result<u64, FileError> {
        self.backend()?
            .size(self.path())
            .await
            .map_err(|e| self.not_found(e))
    }

    pub async fn last_modified(&self) -> Result<DateTime<Utc>, FileError> {
        self.backend()?
            .last_modified(self.path())
            .await
            .map_err(|e| self.not_found(e))
    }

    /// Lazily read contents
    pub async fn stream(&self) -> Result<ByteStream, FileError> {
        self.backend()?
            .read_stream(self.path())
            .await
            .map_err(|e| self.not_found(e))
    }

    /// Whole contents in memory
    pub async fn read(&self) -> Result<Bytes, FileError> {
        let mut stream = self.stream().await?;
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }

    /// Replaces the file's contents.
    ///
    /// Streams are written chunk by chunk, buffers with a single put. The write
    /// only counts once the file is visible on the backend; otherwise this fails
    /// with [`FileError::Missing`], which callers may treat as transient.
    pub async fn write(&self, contents: impl Into<Contents>) -> Result<(), FileError> {
        let backend = self.backend()?;
        let contents = contents.into();

        let onto_itself = matches!(&contents, Contents::File(source) if source.location == self.location);
        if onto_itself {
            tracing::debug!("Skipping write of {} onto itself", self.location);
            return self.ensure_exists().await;
        }

        if !self.directory().is_empty() {
            backend.create_directory(self.directory()).await?;
        }

        match contents {
            Contents::Bytes(bytes) => backend.put(self.path(), bytes).await?,
            Contents::Stream(stream) => backend.write_stream(self.path(), stream).await?,
            Contents::File(source) => {
                let stream = source.stream().await?;
                backend.write_stream(self.path(), stream).await?
            }
        }

        tracing::debug!("Wrote {}", self.location);
        self.ensure_exists().await
    }

    /// Deletes the file; deleting a missing file succeeds
    pub async fn delete(&self) -> Result<(), FileError> {
        self.backend()?.delete(self.path()).await?;
        tracing::debug!("Deleted {}", self.location);
        Ok(())
    }

    pub(crate) async fn ensure_exists(&self) -> Result<(), FileError> {
        if self.exists().await? {
            Ok(())
        } else {
            tracing::error!("{} is missing after a successful write", self.location);
            Err(FileError::Missing {
                disk: self.disk().to_string(),
                path: self.path().to_string(),
            })
        }
    }

    fn not_found(&self, error: StorageError) -> FileError {
        if error.is_not_found() {
            FileError::NotFound(self.location.to_string())
        } else {
            error.into()
        }
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.name == other.name
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("location", &self.location)
            .field("name", &self.name)
            .finish()
    }
}

impl From<Bytes> for Contents {
    fn from(bytes: Bytes) -> Self {
        Contents::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Contents {
    fn from(bytes: Vec<u8>) -> Self {
        Contents::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Contents {
    fn from(bytes: &[u8]) -> Self {
        Contents::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Contents {
    fn from(bytes: &[u8; N]) -> Self {
        Contents::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for Contents {
    fn from(text: String) -> Self {
        Contents::Bytes(Bytes::from(text))
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Contents::Bytes(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<ByteStream> for Contents {
    fn from(stream: ByteStream) -> Self {
        Contents::Stream(stream)
    }
}

impl From<FileHandle> for Contents {
    fn from(file: FileHandle) -> Self {
        Contents::File(file)
    }
}

impl From<&FileHandle> for Contents {
    fn from(file: &FileHandle) -> Self {
        Contents::File(file.clone())
    }
}

use crate::models::ManagerInner;
use crate::{Contents, ContentSource, FileError, FileHandle, FileManager, TempFactory};
use diskfile_filesystem::FileSystem;
use diskfile_models::ROOT_DISK;
use diskfile_signing::UrlSigner;
use diskfile_storage::DiskRegistry;
use std::sync::Arc;

impl FileManager {
    pub fn new(
        registry: DiskRegistry,
        signer: UrlSigner,
        temp: TempFactory,
        default_expiration: Option<chrono::Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                registry,
                signer,
                temp,
                client: reqwest::Client::new(),
                default_expiration,
            }),
        }
    }

    pub fn registry(&self) -> &DiskRegistry {
        &self.inner.registry
    }

    pub fn signer(&self) -> &UrlSigner {
        &self.inner.signer
    }

    pub fn temp_factory(&self) -> &TempFactory {
        &self.inner.temp
    }

    /// Lifetime given to signed URLs when the caller does not pass one
    pub fn default_expiration(&self) -> Option<chrono::Duration> {
        self.inner.default_expiration
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Wraps `path` on `disk` without touching the backend.
    ///
    /// `default` and `cloud` are resolved here, once; the handle keeps the
    /// concrete disk name.
    pub fn load(&self, path: &str, disk: &str) -> FileHandle {
        FileHandle::new(self.clone(), self.registry().path_ref(disk, path), None)
    }

    /// `load`, or `None` when nothing exists at `path`
    pub async fn load_checked(&self, path: &str, disk: &str) -> Result<Option<FileHandle>, FileError> {
        let file = self.load(path, disk);
        Ok(if file.exists().await? { Some(file) } else { None })
    }

    /// Writes `contents` to `path` on `disk` and returns the verified handle
    pub async fn create(
        &self,
        contents: impl Into<Contents>,
        path: &str,
        disk: &str,
    ) -> Result<FileHandle, FileError> {
        let file = self.load(path, disk);
        file.write(contents).await?;
        Ok(file)
    }

    /// Stores the contents of `source` at `path` on `disk`.
    ///
    /// An existing handle is transferred with `copy_to`, so same-disk sources use
    /// the backend's native copy.
    pub async fn put(&self, source: ContentSource, path: &str, disk: &str) -> Result<FileHandle, FileError> {
        if let ContentSource::ExistingFile(file) = source {
            return file.copy_to(path, Some(disk)).await;
        }

        let (stream, name) = source.open(self).await?;
        tracing::info!("Storing '{}' at {}", name, self.registry().path_ref(disk, path));

        self.create(Contents::Stream(stream), path, disk).await
    }

    /// New file in a fresh temp directory on the root disk.
    ///
    /// Temp files are not removed automatically; callers delete them or leave
    /// them to the periodic sweep.
    pub async fn temp(&self, contents: Option<Contents>, name: Option<&str>) -> Result<FileHandle, FileError> {
        let directory = self.temp_factory().make_temp_directory().await?;
        let name = name
            .map(|name| diskfile_utils::basename(&diskfile_utils::normalize(name)).to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| diskfile_utils::temp_name(None));

        let path = directory.join(&name);
        let file = FileHandle::new(
            self.clone(),
            self.registry().path_ref(ROOT_DISK, &path.to_string_lossy()),
            Some(name),
        );

        if let Some(contents) = contents {
            file.write(contents).await?;
        }

        Ok(file)
    }

    /// Handle for any content source.
    ///
    /// Local paths are wrapped in place on the root disk; remote URLs and
    /// streams are downloaded into a temp file first.
    pub async fn load_source(&self, source: ContentSource) -> Result<FileHandle, FileError> {
        match source {
            ContentSource::LocalPath(path) => {
                let absolute = FileSystem::get_absolute_path_string(&path.to_string_lossy())
                    .map_err(|e| FileError::InvalidSource(format!("{}: {}", path.display(), e)))?;
                Ok(self.load(&absolute, ROOT_DISK))
            }
            ContentSource::ExistingFile(file) => Ok(file),
            source => {
                let (stream, name) = source.open(self).await?;
                self.temp(Some(Contents::Stream(stream)), Some(&name)).await
            }
        }
    }
}

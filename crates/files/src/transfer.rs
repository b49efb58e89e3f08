use crate::{Contents, FileError, FileHandle};
use diskfile_models::{PathRef, CLOUD_DISK, DEFAULT_DISK, ROOT_DISK};
use std::path::{Path, PathBuf};

impl FileHandle {
    /// Copies the file to `path` on `disk` (this handle's disk when `None`).
    ///
    /// Returns a new handle; `self` is left untouched. Copying a file onto its
    /// own location performs no I/O and returns an equal handle.
    pub async fn copy_to(&self, path: &str, disk: Option<&str>) -> Result<FileHandle, FileError> {
        let target = self.target(path, disk);
        if target == self.location {
            return Ok(self.clone());
        }

        self.transfer(&target, false).await?;
        Ok(FileHandle::new(self.files.clone(), target, None))
    }

    /// Moves the file to `path` on `disk` (this handle's disk when `None`) and
    /// points this handle at the new location.
    ///
    /// Across disks the source is deleted only after the target has been written
    /// and verified, so a failed move leaves the original in place.
    pub async fn move_to(&mut self, path: &str, disk: Option<&str>) -> Result<&mut Self, FileError> {
        let target = self.target(path, disk);
        if target == self.location {
            return Ok(self);
        }

        self.transfer(&target, true).await?;
        self.location = target;
        Ok(self)
    }

    /// Moves the file to `name` inside its current directory
    pub async fn rename(&mut self, name: &str) -> Result<&mut Self, FileError> {
        let path = diskfile_utils::join(&[self.directory(), name]);
        self.move_to(&path, None).await?;
        self.name = self.location.name().to_string();
        Ok(self)
    }

    /// Handle for `path` relative to this file's directory; no I/O
    pub fn neighbor(&self, path: &str) -> FileHandle {
        let path = diskfile_utils::join(&[self.directory(), path]);
        FileHandle::new(self.files.clone(), self.location.with_path(&path), None)
    }

    /// Copy in a fresh temp directory on the root disk
    pub async fn copy_temp(&self) -> Result<FileHandle, FileError> {
        let directory = self.files.temp_factory().make_temp_directory().await?;
        self.copy_into(&directory).await
    }

    /// Moves the file to the default disk, at `path` or its current path
    pub async fn store(&mut self, path: Option<&str>) -> Result<&mut Self, FileError> {
        let path = self.destination(path);
        self.move_to(&path, Some(DEFAULT_DISK)).await
    }

    /// Moves the file to the cloud disk, keeping its path
    pub async fn upload(&mut self) -> Result<&mut Self, FileError> {
        let path = self.destination(None);
        self.move_to(&path, Some(CLOUD_DISK)).await
    }

    /// Runs `edit` on a local scratch copy, then moves the result back over
    /// this file.
    ///
    /// The scratch directory is removed whether or not `edit` succeeds, and
    /// even if this future is dropped halfway.
    pub async fn transform<F>(&self, edit: F) -> Result<(), FileError>
    where
        F: FnOnce(&Path) -> anyhow::Result<()> + Send + 'static,
    {
        let directory = self.files.temp_factory().make_temp_directory().await?;
        let guard = ScratchGuard(Some(directory.clone()));

        let result = self.transform_in(&directory, edit).await;

        guard.cleanup().await;
        result
    }

    async fn transform_in<F>(&self, directory: &Path, edit: F) -> Result<(), FileError>
    where
        F: FnOnce(&Path) -> anyhow::Result<()> + Send + 'static,
    {
        let mut scratch = self.copy_into(directory).await?;
        let local = scratch
            .local_path()
            .ok_or_else(|| FileError::Transform(format!("{} has no local path", scratch.location)))?;

        tracing::debug!("Transforming {} via {}", self.location, local.display());

        tokio::task::spawn_blocking(move || edit(&local))
            .await
            .map_err(|e| FileError::Transform(e.to_string()))?
            .map_err(|e| FileError::Transform(format!("{:#}", e)))?;

        scratch.move_to(self.path(), Some(self.disk())).await?;
        Ok(())
    }

    async fn copy_into(&self, directory: &Path) -> Result<FileHandle, FileError> {
        let path = directory.join(self.name());
        let mut copy = self.copy_to(&path.to_string_lossy(), Some(ROOT_DISK)).await?;
        copy.name = self.name.clone();
        Ok(copy)
    }

    fn target(&self, path: &str, disk: Option<&str>) -> PathRef {
        self.files
            .registry()
            .path_ref(disk.unwrap_or(self.disk()), path)
    }

    /// Path used when a file leaves its disk without an explicit destination.
    ///
    /// Root-disk files live under absolute scratch paths, so they are placed at
    /// their slugged display name instead.
    fn destination(&self, path: Option<&str>) -> String {
        match path {
            Some(path) => path.to_string(),
            None if self.location.is_root() => self.slug_name(),
            None => self.path().to_string(),
        }
    }

    /// Copy or move to `target`, which must differ from the current location
    async fn transfer(&self, target: &PathRef, remove_source: bool) -> Result<(), FileError> {
        let action = if remove_source { "Moving" } else { "Copying" };
        tracing::info!("{} {} to {}", action, self.location, target);

        let target_backend = self.files.registry().disk(target.disk())?;
        if target_backend.exists(target.path()).await? {
            tracing::debug!("Replacing existing {}", target);
            target_backend.delete(target.path()).await?;
        }

        if target.disk() == self.disk() {
            if !target.directory().is_empty() {
                target_backend.create_directory(target.directory()).await?;
            }

            if remove_source {
                target_backend.rename(self.path(), target.path()).await?;
            } else {
                target_backend.copy(self.path(), target.path()).await?;
            }

            return FileHandle::new(self.files.clone(), target.clone(), None)
                .ensure_exists()
                .await;
        }

        let copy = FileHandle::new(self.files.clone(), target.clone(), None);
        copy.write(Contents::File(self.clone())).await?;

        if remove_source {
            self.delete().await?;
        }

        Ok(())
    }
}

/// Removes a scratch directory, synchronously on drop if `cleanup` never ran
struct ScratchGuard(Option<PathBuf>);

impl ScratchGuard {
    async fn cleanup(mut self) {
        if let Some(directory) = self.0.take() {
            if let Err(e) = tokio::fs::remove_dir_all(&directory).await {
                tracing::warn!("Failed to remove scratch {}: {}", directory.display(), e);
            }
        }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if let Some(directory) = self.0.take() {
            let _ = std::fs::remove_dir_all(directory);
        }
    }
}

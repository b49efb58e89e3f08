use crate::backend::StorageBackend;
use crate::local::LocalBackend;
use crate::memory::MemoryBackend;
use crate::StorageError;
use diskfile_config::{DiskConfig, StorageSettings};
use diskfile_models::{PathRef, CLOUD_DISK, DEFAULT_DISK, ROOT_DISK};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Maps disk names to configured backends.
///
/// The `default` and `cloud` aliases are bound once, when the registry is built;
/// a new configuration means a new registry, and handles created earlier keep the
/// concrete disk name they resolved to. The `root` disk is always present.
pub struct DiskRegistry {
    disks: HashMap<String, Arc<dyn StorageBackend>>,
    default_disk: String,
    cloud_disk: String,
}

impl DiskRegistry {
    pub fn new(default_disk: impl Into<String>, cloud_disk: impl Into<String>) -> Self {
        let mut disks: HashMap<String, Arc<dyn StorageBackend>> = HashMap::new();
        disks.insert(ROOT_DISK.to_string(), Arc::new(LocalBackend::root()));

        Self {
            disks,
            default_disk: default_disk.into(),
            cloud_disk: cloud_disk.into(),
        }
    }

    /// Builds every configured disk
    pub async fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let mut registry = Self::new(settings.default_disk.clone(), settings.cloud_disk.clone());

        for (name, disk) in &settings.disks {
            let backend = build_backend(name, disk).await?;
            tracing::info!("Initialized disk '{}' ({})", name, disk.driver());
            registry.register(name.clone(), backend);
        }

        for alias in [&registry.default_disk, &registry.cloud_disk] {
            if !registry.disks.contains_key(alias.as_str()) {
                return Err(StorageError::UnknownDisk(alias.clone()));
            }
        }

        Ok(registry)
    }

    pub fn register(&mut self, name: impl Into<String>, backend: Arc<dyn StorageBackend>) {
        self.disks.insert(name.into(), backend);
    }

    pub fn with_disk(mut self, name: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        self.register(name, backend);
        self
    }

    /// Replaces the `default`/`cloud` aliases with the disks they are bound to
    pub fn resolve_name<'a>(&'a self, name: &'a str) -> &'a str {
        match name {
            DEFAULT_DISK => &self.default_disk,
            CLOUD_DISK => &self.cloud_disk,
            other => other,
        }
    }

    /// Backend for a disk name or alias
    pub fn disk(&self, name: &str) -> Result<Arc<dyn StorageBackend>, StorageError> {
        let resolved = self.resolve_name(name);
        self.disks
            .get(resolved)
            .cloned()
            .ok_or_else(|| StorageError::UnknownDisk(resolved.to_string()))
    }

    /// `PathRef` on the resolved disk
    pub fn path_ref(&self, disk: &str, path: &str) -> PathRef {
        PathRef::new(self.resolve_name(disk), path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.disks.contains_key(self.resolve_name(name))
    }

    pub fn default_disk(&self) -> &str {
        &self.default_disk
    }

    pub fn cloud_disk(&self) -> &str {
        &self.cloud_disk
    }

    /// Sorted names of all registered disks, `root` included
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.disks.keys().cloned().collect();
        names.sort();
        names
    }
}

async fn build_backend(name: &str, disk: &DiskConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match disk {
        DiskConfig::Local(settings) => {
            if settings.root.is_empty() {
                return Err(StorageError::ConfigError(format!("disk '{}' has an empty root", name)));
            }
            let public_url = Some(settings.public_url.clone()).filter(|url| !url.is_empty());
            Ok(Arc::new(LocalBackend::new(PathBuf::from(&settings.root), public_url)))
        }
        DiskConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
        #[cfg(feature = "s3")]
        DiskConfig::S3(settings) => {
            let backend = crate::s3::S3Backend::new(settings).await?;
            tracing::info!(
                "Initialized S3 disk '{}': bucket={}, endpoint={}",
                name,
                settings.bucket_name,
                settings.endpoint_url
            );
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "s3"))]
        DiskConfig::S3(_) => Err(StorageError::ConfigError(format!(
            "disk '{}' uses the s3 driver but S3 support is not compiled. \
             Rebuild with --features s3 to enable it.",
            name
        ))),
    }
}

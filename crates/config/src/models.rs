use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerSettings,
    #[serde(default = "super::defaults::storage_settings")]
    pub storage: StorageSettings,
    #[serde(default = "super::defaults::signing_settings")]
    pub signing: SigningSettings,
    #[serde(default = "super::defaults::temp_settings")]
    pub temp: TempSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    #[serde(default = "super::defaults::tcp_nodelay")]
    pub tcp_nodelay: bool,
    #[serde(default = "super::defaults::timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "super::defaults::allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "super::defaults::max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default = "super::defaults::enable_compression")]
    pub enable_compression: bool,
}

/// Named disks plus the two late-bound aliases
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Disk the `default` alias resolves to
    #[serde(rename = "default", default = "super::defaults::default_disk")]
    pub default_disk: String,
    /// Disk the `cloud` alias resolves to
    #[serde(rename = "cloud", default = "super::defaults::default_disk")]
    pub cloud_disk: String,
    #[serde(default)]
    pub disks: BTreeMap<String, DiskConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum DiskConfig {
    Local(LocalDiskSettings),
    Memory,
    S3(S3Settings),
}

impl DiskConfig {
    pub fn driver(&self) -> &'static str {
        match self {
            DiskConfig::Local(_) => "local",
            DiskConfig::Memory => "memory",
            DiskConfig::S3(_) => "s3",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalDiskSettings {
    pub root: String,
    /// Base URL the files under `root` are publicly served from (empty = not public)
    #[serde(default)]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Settings {
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default = "super::defaults::s3_region")]
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    pub bucket_name: String,
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub bucket_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SigningSettings {
    #[serde(default)]
    pub secret: String,
    /// Lifetime of signed URLs when the caller gives none (0 = no expiration)
    #[serde(default = "super::defaults::default_expiration_secs")]
    pub default_expiration_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TempSettings {
    /// Scratch root on the root disk
    #[serde(default = "super::defaults::temp_directory")]
    pub directory: String,
    #[serde(default = "super::defaults::temp_max_age_hours")]
    pub max_age_hours: u64,
    /// Interval between stale temp sweeps (0 = disabled)
    #[serde(default = "super::defaults::temp_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

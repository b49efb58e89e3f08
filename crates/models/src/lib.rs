use serde::{Deserialize, Serialize};
use std::fmt;

/// Alias resolved to the configured default disk
pub const DEFAULT_DISK: &str = "default";

/// Alias resolved to the configured cloud disk
pub const CLOUD_DISK: &str = "cloud";

/// Disk rooted at the real filesystem root, used for temp and local input files
pub const ROOT_DISK: &str = "root";

/// Normalized (disk, path) pair identifying a stored file.
///
/// Paths on every disk are relative to that disk's root, except on [`ROOT_DISK`]
/// where they are kept absolute (`/tmp/...`). The disk is stored as given; alias
/// resolution happens in the disk registry before a `PathRef` is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathRef {
    disk: String,
    path: String,
}

impl PathRef {
    pub fn new(disk: impl Into<String>, path: &str) -> Self {
        let disk = disk.into();
        let path = if disk == ROOT_DISK {
            diskfile_utils::normalize_absolute(path)
        } else {
            diskfile_utils::normalize(path)
        };
        Self { disk, path }
    }

    pub fn disk(&self) -> &str {
        &self.disk
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.disk == ROOT_DISK
    }

    /// Same disk, different path
    pub fn with_path(&self, path: &str) -> Self {
        Self::new(self.disk.clone(), path)
    }

    pub fn directory(&self) -> &str {
        diskfile_utils::directory(&self.path)
    }

    pub fn name(&self) -> &str {
        diskfile_utils::basename(&self.path)
    }

    pub fn extension(&self) -> String {
        diskfile_utils::extension(&self.path)
    }
}

impl fmt::Display for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.disk, self.path)
    }
}

/// Delivery route a signed URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// Served inline
    Stream,
    /// Served as an attachment
    Download,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Stream => "stream",
            RouteKind::Download => "download",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "stream" => Some(RouteKind::Stream),
            "download" => Some(RouteKind::Download),
            _ => None,
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use bytes::Bytes;
use diskfile_models::PathRef;
use diskfile_signing::UrlSigner;
use diskfile_storage::{ByteStream, DiskRegistry};
use std::path::PathBuf;
use std::sync::Arc;

/// Entry point for building file handles.
///
/// Cheap to clone; every handle carries one so it can reach the disk registry,
/// the URL signer and the temp factory.
#[derive(Clone)]
pub struct FileManager {
    pub(crate) inner: Arc<ManagerInner>,
}

pub(crate) struct ManagerInner {
    pub(crate) registry: DiskRegistry,
    pub(crate) signer: UrlSigner,
    pub(crate) temp: TempFactory,
    pub(crate) client: reqwest::Client,
    pub(crate) default_expiration: Option<chrono::Duration>,
}

/// A file identified by disk and path.
///
/// Metadata is never cached: `exists`, `size`, `mime` and friends ask the
/// backend (or the path) each time.
///
/// Ownership contract: [`FileHandle::copy_to`] borrows the handle and returns a
/// new one, while [`FileHandle::move_to`] takes it by `&mut` and updates it in
/// place so the caller keeps holding the moved file.
#[derive(Clone)]
pub struct FileHandle {
    pub(crate) location: PathRef,
    /// Name the file was created or uploaded with
    pub(crate) name: String,
    pub(crate) files: FileManager,
}

/// What `FileHandle::write` accepts
pub enum Contents {
    Bytes(Bytes),
    Stream(ByteStream),
    File(FileHandle),
}

/// Where new file contents come from
pub enum ContentSource {
    /// Path on the local filesystem
    LocalPath(PathBuf),
    /// http(s) URL, fetched on demand
    RemoteUrl(String),
    /// Already-open stream with an optional suggested name
    ByteStream { stream: ByteStream, name: Option<String> },
    ExistingFile(FileHandle),
}

/// Allocates collision-free scratch directories under the temp root
pub struct TempFactory {
    pub(crate) root: PathBuf,
    pub(crate) max_attempts: usize,
    pub(crate) next_name: fn() -> String,
}

/// Ordered list of handles with bulk operations
#[derive(Clone, Default)]
pub struct FileCollection {
    pub(crate) files: Vec<FileHandle>,
}

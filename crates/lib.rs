// Re-export the workspace crates under one roof

pub use diskfile_api as api;
pub use diskfile_config as config;
pub use diskfile_events as events;
pub use diskfile_files as files;
pub use diskfile_filesystem as filesystem;
pub use diskfile_models as models;
pub use diskfile_signing as signing;
pub use diskfile_storage as storage;
pub use diskfile_utils as utils;

/// Prelude module for convenient imports
pub mod prelude {
    // Disks and paths
    pub use diskfile_models::{PathRef, RouteKind, CLOUD_DISK, DEFAULT_DISK, ROOT_DISK};
    pub use diskfile_storage::{DiskRegistry, LocalBackend, MemoryBackend, StorageBackend, StorageError};

    // Files
    pub use diskfile_files::{
        Contents, ContentSource, FileCollection, FileError, FileHandle, FileManager, ImageEditor, ImageOp,
        TempFactory,
    };

    // Signed URLs
    pub use diskfile_signing::{SignedRequest, UrlSigner};

    // HTTP delivery
    pub use diskfile_api::{file_routes, AppState};

    // Configuration
    pub use diskfile_config::Config;

    // Events
    pub use diskfile_events::{AppEvent, EventBus};
}

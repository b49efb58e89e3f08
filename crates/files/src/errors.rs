use diskfile_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("File not found: {0}")]
    NotFound(String),

    /// The backend reported success but the file is not there afterwards
    #[error("File missing after write: {disk}:{path}")]
    Missing { disk: String, path: String },

    #[error("Invalid content source: {0}")]
    InvalidSource(String),

    #[error("Remote fetch failed for '{url}': {message}")]
    Remote { url: String, message: String },

    #[error("Transform failed: {0}")]
    Transform(String),

    #[error("Cannot create temp directory: {0}")]
    TempDirectory(String),

    #[error("Archive failed: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FileError {
    /// True for absent files, whether reported by the handle or the backend
    pub fn is_not_found(&self) -> bool {
        match self {
            FileError::NotFound(_) => true,
            FileError::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }
}

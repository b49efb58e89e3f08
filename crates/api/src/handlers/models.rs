use diskfile_files::FileManager;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub(super) files: FileManager,
}

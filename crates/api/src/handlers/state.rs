use super::models::AppState;
use axum::extract::FromRef;
use diskfile_files::FileManager;

impl AppState {
    pub fn new(files: FileManager) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &FileManager {
        &self.files
    }
}

impl FromRef<AppState> for FileManager {
    fn from_ref(state: &AppState) -> Self {
        state.files.clone()
    }
}

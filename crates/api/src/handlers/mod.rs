mod models;
mod state;
pub mod files;

pub use models::AppState;
pub use files::{download_file, stream_file};

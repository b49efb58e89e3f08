use crate::handlers::{download_file, stream_file, AppState};
use axum::{routing::get, Router};

/// Signed delivery routes, without middleware
pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/file/stream/:disk/*path", get(stream_file))
        .route("/file/download/:disk/*path", get(download_file))
}

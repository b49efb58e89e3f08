use super::{response, validator::validate_path_component};
use crate::errors::ApiError;
use crate::handlers::models::AppState;
use axum::{
    extract::{Path, RawQuery, State},
    response::Response,
};
use diskfile_models::RouteKind;
use diskfile_signing::SignedRequest;

/// `GET /file/stream/:disk/*path`, served inline
pub async fn stream_file(
    State(state): State<AppState>,
    Path((disk, path)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    serve(&state, RouteKind::Stream, disk, path, query).await
}

/// `GET /file/download/:disk/*path`, served as an attachment
pub async fn download_file(
    State(state): State<AppState>,
    Path((disk, path)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    serve(&state, RouteKind::Download, disk, path, query).await
}

/// Validates the signature, then streams the file.
///
/// Every failure is terminal for the request: a bad or expired signature is a
/// 403, a missing file a 404.
async fn serve(
    state: &AppState,
    kind: RouteKind,
    disk: String,
    path: String,
    query: Option<String>,
) -> Result<Response, ApiError> {
    tracing::debug!("serve_file: {} disk = '{}', path = '{}'", kind, disk, path);

    // Validate path components to prevent path traversal
    validate_path_component(&disk)?;
    validate_path_component(&path)?;

    let request = SignedRequest::from_query(kind, disk, path, query.as_deref().unwrap_or_default())?;
    state.files.signer().validate(&request)?;

    let file = state.files.load(&request.path, &request.disk);
    if !file.exists().await? {
        tracing::warn!("serve_file: File does not exist: '{}'", file.location());
        return Err(ApiError::NotFound);
    }

    let filename = Some(request.name.as_str()).filter(|name| !name.is_empty());
    let delivery = file.delivery(filename, kind == RouteKind::Download).await?;

    tracing::debug!(
        "serve_file: streaming {} ({:.2} MB)",
        file.location(),
        delivery.content_length as f64 / 1024.0 / 1024.0
    );

    response::build(delivery)
}

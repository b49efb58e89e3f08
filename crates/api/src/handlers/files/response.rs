use crate::errors::ApiError;
use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use diskfile_files::Delivery;

/// Turns a delivery into a streaming response.
///
/// The body pulls chunks from the backend as the client reads them; dropping
/// the response (client gone) drops the backend stream with it.
pub fn build(delivery: Delivery) -> Result<Response, ApiError> {
    let header_error = |e: String| {
        tracing::error!("serve_file: invalid response header: {}", e);
        ApiError::InternalError(e)
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, delivery.content_type)
        .header(header::CONTENT_LENGTH, delivery.content_length)
        .header(header::CONTENT_DISPOSITION, delivery.content_disposition);

    for (name, value) in delivery.headers {
        let name = HeaderName::try_from(name).map_err(|e| header_error(e.to_string()))?;
        let value = HeaderValue::try_from(value).map_err(|e| header_error(e.to_string()))?;
        builder = builder.header(name, value);
    }

    builder
        .body(Body::from_stream(delivery.body))
        .map_err(|e| header_error(e.to_string()))
}

use diskfile_api::{file_routes, AppState};
use diskfile_config::{Config, ServerSettings};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::Router;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
};

/// Signed file routes wrapped in the server-wide layers
pub fn build(config: &Config, app_state: AppState) -> Router {
    let server = &config.server;

    let mut router = file_routes()
        .layer(ConcurrencyLimitLayer::new(server.max_concurrent_requests))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.timeout_secs),
        ));

    if server.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    router.layer(cors_layer(server)).with_state(app_state)
}

/// Downloads are read cross-origin, so the headers browsers hide by default are exposed
fn cors_layer(server: &ServerSettings) -> CorsLayer {
    let origins = if server.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::HEAD])
        .expose_headers([header::CONTENT_DISPOSITION, header::CONTENT_LENGTH])
}

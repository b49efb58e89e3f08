//! End-to-end tests of the signed delivery routes.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use diskfile_api::{file_routes, AppState};
use diskfile_files::{Contents, FileManager, TempFactory};
use diskfile_models::RouteKind;
use diskfile_signing::UrlSigner;
use diskfile_storage::{DiskRegistry, LocalBackend, MemoryBackend};
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BASE_URL: &str = "https://files.test";

struct Server {
    files: FileManager,
    router: Router,
    _base: TempDir,
}

impl Server {
    async fn get(&self, signed_url: &str) -> (StatusCode, axum::http::HeaderMap, bytes::Bytes) {
        let uri = signed_url.strip_prefix(BASE_URL).unwrap_or(signed_url);
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }
}

#[fixture]
fn server() -> Server {
    let base = tempfile::tempdir().unwrap();

    let registry = DiskRegistry::new("local", "objects")
        .with_disk("local", Arc::new(LocalBackend::new(base.path().join("local"), None)))
        .with_disk("objects", Arc::new(MemoryBackend::new()));
    let signer = UrlSigner::new("http-secret", BASE_URL).unwrap();
    let files = FileManager::new(
        registry,
        signer,
        TempFactory::new(base.path().join("tmp")),
        Some(Duration::minutes(10)),
    );

    let router = file_routes().with_state(AppState::new(files.clone()));

    Server {
        files,
        router,
        _base: base,
    }
}

async fn error_code(body: &[u8]) -> String {
    let json: serde_json::Value = serde_json::from_slice(body).unwrap();
    json["error"]["code"].as_str().unwrap().to_string()
}

#[rstest]
#[tokio::test]
async fn test_stream_inline(server: Server) {
    let file = server
        .files
        .create("a,b,c\n1,2,3", "reports/q1.csv", "objects")
        .await
        .unwrap();

    let (status, headers, body) = server.get(&file.stream_url(None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    assert_eq!(headers[header::CONTENT_LENGTH], "11");
    assert_eq!(headers[header::CONTENT_DISPOSITION], "inline; filename=\"q1.csv\"");
    assert_eq!(body, "a,b,c\n1,2,3");
}

#[rstest]
#[tokio::test]
async fn test_download_attachment_with_name(server: Server) {
    let file = server.files.create("x", "files/0001.bin", "local").await.unwrap();

    let url = file.download_url(None, Some("Invoice March.pdf"));
    let (status, headers, body) = server.get(&url).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Invoice March.pdf\""
    );
    assert_eq!(body, "x");
}

#[rstest]
#[tokio::test]
async fn test_root_disk_temp_file(server: Server) {
    let file = server
        .files
        .temp(Some(Contents::from("scratch")), Some("scratch.txt"))
        .await
        .unwrap();

    let (status, _, body) = server.get(&file.stream_url(None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "scratch");
}

#[rstest]
#[tokio::test]
async fn test_tampered_url_is_forbidden(server: Server) {
    let file = server.files.create("x", "a.txt", "objects").await.unwrap();
    let url = file.stream_url(None, None);

    let tampered = [
        url.replace("name=a.txt", "name=b.txt"),
        url.replace("/file/stream/", "/file/download/"),
        url.replace("/objects/", "/local/"),
        url.replace("signature=", "signature=0"),
    ];

    for url in tampered {
        let (status, _, body) = server.get(&url).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "accepted {}", url);
        assert_eq!(error_code(&body).await, "FORBIDDEN");
    }
}

#[rstest]
#[tokio::test]
async fn test_unsigned_request_is_forbidden(server: Server) {
    server.files.create("x", "a.txt", "objects").await.unwrap();

    let (status, _, _) = server.get("/file/stream/objects/a.txt?name=a.txt").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test]
async fn test_expired_url_is_forbidden(server: Server) {
    let file = server.files.create("x", "a.txt", "objects").await.unwrap();
    let url = server.files.signer().sign(
        RouteKind::Stream,
        file.location(),
        "a.txt",
        Some(Utc::now() - Duration::seconds(30)),
    );

    let (status, _, _) = server.get(&url).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test]
async fn test_missing_file_is_not_found(server: Server) {
    let url = server.files.load("gone.txt", "objects").stream_url(None, None);

    let (status, _, body) = server.get(&url).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body).await, "NOT_FOUND");
}

#[rstest]
#[tokio::test]
async fn test_unknown_disk_is_not_found(server: Server) {
    let url = server.files.load("a.txt", "elsewhere").stream_url(None, None);

    let (status, _, _) = server.get(&url).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_traversal_is_rejected(server: Server) {
    let (status, _, body) = server
        .get("/file/stream/local/reports/../../etc/passwd?name=x&signature=00")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body).await, "INVALID_PATH");
}

#[rstest]
#[tokio::test]
async fn test_dot_segments_are_signed_as_normalized(server: Server) {
    let file = server
        .files
        .create("dots", "a//b/./c.txt", "objects")
        .await
        .unwrap();
    assert_eq!(file.path(), "a/b/c.txt");

    let url = file.stream_url(None, None);
    assert!(url.contains("/file/stream/objects/a/b/c.txt?"));

    let (status, _, body) = server.get(&url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "dots");

    // A client that keeps the dot segment still hits the same signed file
    let dotted = url.replace("/a/b/c.txt?", "/a/b/./c.txt?");
    let (status, _, body) = server.get(&dotted).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "dots");
}

#[rstest]
#[tokio::test]
async fn test_reserved_and_non_ascii_characters_in_path(server: Server) {
    let path = "dir a/100% #1+x ü;?.txt";
    let file = server.files.create("odd name", path, "local").await.unwrap();

    let url = file.download_url(None, None);
    let (status, headers, body) = server.get(&url).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "odd name");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"100% #1+x _;?.txt\""));
    assert!(disposition.contains("filename*=UTF-8''100%25%20%231%2Bx%20%C3%BC%3B%3F.txt"));
}

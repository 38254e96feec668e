//! HTTP API tests.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; no
//! socket is opened.

#![cfg(feature = "server")]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use pdfvault::server::{AppState, router};
use pdfvault::storage::local::LocalDocumentStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

/// Isolated API environment with its own storage root.
struct TestApi {
    _temp_dir: TempDir,
    root: PathBuf,
    app: Router,
}

impl TestApi {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("storage");
        let store = LocalDocumentStore::open(root.clone()).expect("Failed to open store");
        let app = router(AppState::new(Arc::new(store)), None);

        Self {
            _temp_dir: temp_dir,
            root,
            app,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), content_type)
    }

    async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes, _) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn query(&self, method: Method, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn write(&self, name: &str, content: &str) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            "/api/write",
            json!({"fileName": name, "content": content}),
        )
        .await
    }
}

fn parse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

// =============================================================================
// Write / Read
// =============================================================================

#[tokio::test]
async fn write_returns_message() {
    let api = TestApi::new();

    let (status, body) = api.write("a.pdf", "hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "PDF file written successfully");
    assert!(api.root.join("a.pdf").is_file());
}

#[tokio::test]
async fn write_rejects_non_pdf() {
    let api = TestApi::new();

    let (status, body) = api.write("note.txt", "x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PDF files are allowed");
    assert!(!api.root.join("note.txt").exists());
}

#[tokio::test]
async fn write_without_file_name_is_bad_request() {
    let api = TestApi::new();

    let (status, body) = api
        .json(Method::POST, "/api/write", json!({"content": "x"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_json_is_bad_request_with_error_body() {
    let api = TestApi::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/write")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, bytes, _) = api.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse(&bytes)["error"].is_string());
}

#[tokio::test]
async fn read_returns_inline_pdf() {
    let api = TestApi::new();
    api.write("a.pdf", "hello").await;

    let request = Request::builder()
        .uri("/api/read?fileName=a.pdf")
        .body(Body::empty())
        .unwrap();
    let response = api.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"a.pdf\""
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn read_text_returns_content() {
    let api = TestApi::new();
    api.write("a.pdf", "hello").await;

    let (status, bytes, content_type) = api.query(Method::GET, "/api/read-text?fileName=a.pdf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert!(parse(&bytes)["content"].as_str().unwrap().contains("hello"));
}

#[tokio::test]
async fn read_missing_is_not_found() {
    let api = TestApi::new();

    let (status, bytes, _) = api.query(Method::GET, "/api/read?fileName=missing.pdf").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(parse(&bytes)["error"].is_string());

    let (status, _, _) = api.query(Method::GET, "/api/read-text?fileName=missing.pdf").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn read_unparseable_is_not_found() {
    let api = TestApi::new();
    std::fs::write(api.root.join("broken.pdf"), "garbage").unwrap();

    let (status, _, _) = api.query(Method::GET, "/api/read-text?fileName=broken.pdf").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn read_without_file_name_is_bad_request() {
    let api = TestApi::new();

    let (status, _, _) = api.query(Method::GET, "/api/read").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn read_traversal_stays_in_root() {
    let api = TestApi::new();
    api.write("a.pdf", "hello").await;

    let (status, bytes, _) = api
        .query(Method::GET, "/api/read?fileName=..%2F..%2Fa.pdf")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.starts_with(b"%PDF-"));
}

// =============================================================================
// Append
// =============================================================================

#[tokio::test]
async fn append_then_read_text_has_both() {
    let api = TestApi::new();
    api.write("a.pdf", "hello").await;

    let (status, body) = api
        .json(
            Method::POST,
            "/api/append",
            json!({"fileName": "a.pdf", "content": "world"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Content appended successfully to PDF");

    let (_, bytes, _) = api.query(Method::GET, "/api/read-text?fileName=a.pdf").await;
    let content = parse(&bytes)["content"].as_str().unwrap().to_string();
    assert!(content.contains("hello"));
    assert!(content.contains("world"));
}

#[tokio::test]
async fn append_missing_is_not_found() {
    let api = TestApi::new();

    let (status, body) = api
        .json(
            Method::POST,
            "/api/append",
            json!({"fileName": "missing.pdf", "content": "x"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn append_garbage_is_server_error() {
    let api = TestApi::new();
    std::fs::write(api.root.join("broken.pdf"), "garbage").unwrap();

    let (status, _) = api
        .json(
            Method::POST,
            "/api/append",
            json!({"fileName": "broken.pdf", "content": "x"}),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Rename / Delete
// =============================================================================

#[tokio::test]
async fn rename_moves_file() {
    let api = TestApi::new();
    api.write("a.pdf", "hello").await;

    let (status, body) = api
        .json(
            Method::PUT,
            "/api/rename",
            json!({"oldName": "a.pdf", "newName": "b.pdf"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "PDF file renamed successfully");
    assert!(!api.root.join("a.pdf").exists());
    assert!(api.root.join("b.pdf").exists());
}

#[tokio::test]
async fn rename_onto_existing_is_conflict() {
    let api = TestApi::new();
    api.write("a.pdf", "hello").await;
    api.write("b.pdf", "other").await;

    let (status, _) = api
        .json(
            Method::PUT,
            "/api/rename",
            json!({"oldName": "a.pdf", "newName": "b.pdf"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn rename_to_non_pdf_is_bad_request() {
    let api = TestApi::new();
    api.write("a.pdf", "hello").await;

    let (status, body) = api
        .json(
            Method::PUT,
            "/api/rename",
            json!({"oldName": "a.pdf", "newName": "a.exe"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PDF files are allowed");
}

#[tokio::test]
async fn delete_removes_file() {
    let api = TestApi::new();
    api.write("a.pdf", "hello").await;

    let (status, bytes, _) = api.query(Method::DELETE, "/api/delete?fileName=a.pdf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&bytes)["message"], "PDF file deleted successfully");
    assert!(!api.root.join("a.pdf").exists());
}

#[tokio::test]
async fn delete_missing_is_not_found() {
    let api = TestApi::new();

    let (status, _, _) = api.query(Method::DELETE, "/api/delete?fileName=nope.pdf").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Directories
// =============================================================================

#[tokio::test]
async fn create_and_delete_directory() {
    let api = TestApi::new();

    let (status, body) = api
        .json(Method::POST, "/api/create-dir", json!({"dirName": "x/y/z"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Directory created successfully");
    assert!(api.root.join("x/y/z").is_dir());

    let (status, bytes, _) = api.query(Method::DELETE, "/api/delete-dir?dirName=x").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&bytes)["message"], "Directory deleted successfully");
    assert!(!api.root.join("x").exists());
}

#[tokio::test]
async fn delete_missing_directory_succeeds() {
    let api = TestApi::new();

    let (status, _, _) = api.query(Method::DELETE, "/api/delete-dir?dirName=nosuch").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn directory_name_required() {
    let api = TestApi::new();

    let (status, body) = api.json(Method::POST, "/api/create-dir", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Directory name is required");

    let (status, _, _) = api.query(Method::DELETE, "/api/delete-dir").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Static Files
// =============================================================================

#[tokio::test]
async fn static_dir_served_at_root() {
    let temp_dir = TempDir::new().unwrap();
    let public = temp_dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<h1>pdfvault</h1>").unwrap();

    let store = LocalDocumentStore::open(temp_dir.path().join("storage")).unwrap();
    let app = router(AppState::new(Arc::new(store)), Some(&public));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<h1>pdfvault</h1>");
}

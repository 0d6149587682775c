use super::*;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, Default)]
struct CapturedRequest {
    content_type: Option<String>,
    cookie: Option<String>,
    body: Vec<u8>,
    field_name: Option<String>,
    file_name: Option<String>,
}

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl Captured {
    async fn single(&self) -> CapturedRequest {
        let requests = self.requests.lock().await;
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests[0].clone()
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn analyze_ok(
    State(captured): State<Captured>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<AnalysisResult> {
    captured.requests.lock().await.push(CapturedRequest {
        content_type: header_value(&headers, header::CONTENT_TYPE),
        cookie: header_value(&headers, header::COOKIE),
        body: body.to_vec(),
        ..CapturedRequest::default()
    });
    Json(AnalysisResult {
        summary: "S".to_string(),
        keywords: vec!["a".to_string(), "b".to_string()],
        topics: vec!["t1".to_string(), "t2".to_string()],
        sentiment: "POSITIVE (0.98)".to_string(),
    })
}

async fn analyze_bad_input() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No text provided" })),
    )
}

async fn analyze_plain_failure() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

async fn analyze_garbled_success() -> impl IntoResponse {
    (StatusCode::OK, "<html>not json</html>")
}

async fn upload_ok(
    State(captured): State<Captured>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut request = CapturedRequest {
        content_type: header_value(&headers, header::CONTENT_TYPE),
        cookie: header_value(&headers, header::COOKIE),
        ..CapturedRequest::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        request.field_name = field.name().map(str::to_string);
        request.file_name = field.file_name().map(str::to_string);
        request.body = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
    }
    captured.requests.lock().await.push(request);

    (
        [(header::CONTENT_TYPE, "application/pdf")],
        b"%PDF-1.4 summary".to_vec(),
    )
}

async fn upload_requires_login() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, "<!doctype html><p>Please log in</p>")
}

async fn upload_wrong_type() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "File type not allowed" })),
    )
}

async fn spawn_server(app: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_capturing_server() -> Result<(String, Captured)> {
    let captured = Captured::default();
    let app = Router::new()
        .route("/analyze", post(analyze_ok))
        .route("/upload", post(upload_ok))
        .with_state(captured.clone());
    Ok((spawn_server(app).await?, captured))
}

fn text_request(text: &str) -> AnalysisRequest {
    AnalysisRequest {
        text: text.to_string(),
    }
}

#[test]
fn normalizes_trailing_slashes_and_whitespace() {
    assert_eq!(
        normalize_server_url("  http://127.0.0.1:5000/ ").expect("valid url"),
        "http://127.0.0.1:5000"
    );
}

#[test]
fn backend_reports_the_normalized_server_url() {
    let backend = HttpBackend::new("https://summarizer.example.com/// ").expect("backend");
    assert_eq!(backend.server_url(), "https://summarizer.example.com");
}

#[test]
fn rejects_unparseable_or_non_http_server_urls() {
    assert!(matches!(
        normalize_server_url("not a url"),
        Err(BackendError::InvalidServerUrl { .. })
    ));
    assert!(matches!(
        normalize_server_url("ftp://example.com"),
        Err(BackendError::InvalidServerUrl { .. })
    ));
}

#[tokio::test]
async fn analyze_posts_json_text_and_decodes_result() {
    let (server_url, captured) = spawn_capturing_server().await.expect("server");
    let backend = HttpBackend::new(&server_url).expect("backend");

    let reply = backend
        .analyze(&text_request("some long article"))
        .await
        .expect("analyze");

    let result = match reply {
        AnalyzeReply::Completed(result) => result,
        other => panic!("expected completed analysis, got {other:?}"),
    };
    assert_eq!(result.summary, "S");
    assert_eq!(result.keywords_line(), "a, b");
    assert_eq!(result.sentiment, "POSITIVE (0.98)");

    let request = captured.single().await;
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&request.body).expect("json body");
    assert_eq!(body, json!({ "text": "some long article" }));
    assert_eq!(request.cookie, None);
}

#[tokio::test]
async fn analyze_surfaces_error_payload_on_failure_status() {
    let app = Router::new().route("/analyze", post(analyze_bad_input));
    let server_url = spawn_server(app).await.expect("server");
    let backend = HttpBackend::new(&server_url).expect("backend");

    let reply = backend.analyze(&text_request("x")).await.expect("analyze");
    assert_eq!(
        reply,
        AnalyzeReply::Rejected {
            status: 400,
            payload: ErrorPayload::new("No text provided"),
        }
    );
}

#[tokio::test]
async fn analyze_tolerates_non_json_failure_body() {
    let app = Router::new().route("/analyze", post(analyze_plain_failure));
    let server_url = spawn_server(app).await.expect("server");
    let backend = HttpBackend::new(&server_url).expect("backend");

    let reply = backend.analyze(&text_request("x")).await.expect("analyze");
    assert_eq!(
        reply,
        AnalyzeReply::Rejected {
            status: 500,
            payload: ErrorPayload::default(),
        }
    );
}

#[tokio::test]
async fn analyze_reports_undecodable_success_body() {
    let app = Router::new().route("/analyze", post(analyze_garbled_success));
    let server_url = spawn_server(app).await.expect("server");
    let backend = HttpBackend::new(&server_url).expect("backend");

    let err = backend
        .analyze(&text_request("x"))
        .await
        .expect_err("garbled body should fail");
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn analyze_reports_unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let backend = HttpBackend::new(&format!("http://{addr}")).expect("backend");

    let err = backend
        .analyze(&text_request("x"))
        .await
        .expect_err("closed port should fail");
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn upload_sends_multipart_file_field_and_returns_document() {
    let (server_url, captured) = spawn_capturing_server().await.expect("server");
    let backend = HttpBackend::new(&server_url)
        .expect("backend")
        .with_session_cookie("session=abc123");

    let file = SelectedFile::new("paper.pdf", b"%PDF-1.4 source".to_vec())
        .with_mime_type("application/pdf");
    let reply = backend.upload(file).await.expect("upload");
    assert_eq!(reply, UploadReply::Document(b"%PDF-1.4 summary".to_vec()));

    let request = captured.single().await;
    assert!(request
        .content_type
        .as_deref()
        .is_some_and(|value| value.starts_with("multipart/form-data; boundary=")));
    assert_eq!(request.field_name.as_deref(), Some("file"));
    assert_eq!(request.file_name.as_deref(), Some("paper.pdf"));
    assert_eq!(request.body, b"%PDF-1.4 source".to_vec());
    assert_eq!(request.cookie.as_deref(), Some("session=abc123"));
}

#[tokio::test]
async fn upload_reports_unauthorized_without_decoding_body() {
    let app = Router::new().route("/upload", post(upload_requires_login));
    let server_url = spawn_server(app).await.expect("server");
    let backend = HttpBackend::new(&server_url).expect("backend");

    let reply = backend
        .upload(SelectedFile::new("paper.pdf", b"%PDF".to_vec()))
        .await
        .expect("upload");
    assert_eq!(reply, UploadReply::Unauthorized);
}

#[tokio::test]
async fn upload_surfaces_error_payload_on_failure_status() {
    let app = Router::new().route("/upload", post(upload_wrong_type));
    let server_url = spawn_server(app).await.expect("server");
    let backend = HttpBackend::new(&server_url).expect("backend");

    let reply = backend
        .upload(SelectedFile::new("notes.txt", b"plain".to_vec()))
        .await
        .expect("upload");
    assert_eq!(
        reply,
        UploadReply::Rejected {
            status: 400,
            payload: ErrorPayload::new("File type not allowed"),
        }
    );
}

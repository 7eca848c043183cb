mod common;

use axum::body::to_bytes;
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::*;
use serde_json::Value;
use survey_overlay_server::{AppState, ServerConfig, app};
use tempfile::TempDir;
use tower::ServiceExt;

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let response = app(test_state(dir.path()))
        .oneshot(get_request("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_process_returns_merged_pdf() {
    let dir = TempDir::new().unwrap();
    let template = pdf_bytes(1);
    let survey = pdf_bytes(4);

    let request = multipart_request(
        "/process",
        &[
            ("template", "template.pdf", template.as_slice()),
            ("survey", "my survey.PDF", survey.as_slice()),
        ],
    );
    let response = app(test_state(dir.path())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"my_survey_overlayed.pdf\""
    );

    let merged = body_bytes(response).await;
    assert!(merged.starts_with(b"%PDF-"));
    assert_eq!(page_count(&merged), 4);

    // Nothing is left on disk
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_process_empty_survey() {
    let dir = TempDir::new().unwrap();
    let template = pdf_bytes(1);
    let survey = pdf_bytes(0);

    let request = multipart_request(
        "/process",
        &[
            ("template", "template.pdf", template.as_slice()),
            ("survey", "survey.pdf", survey.as_slice()),
        ],
    );
    let response = app(test_state(dir.path())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(page_count(&body_bytes(response).await), 0);
}

#[tokio::test]
async fn test_missing_field() {
    let dir = TempDir::new().unwrap();
    let template = pdf_bytes(1);

    let request = multipart_request("/process", &[("template", "template.pdf", template.as_slice())]);
    let response = app(test_state(dir.path())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn test_wrong_extension() {
    let dir = TempDir::new().unwrap();
    let pdf = pdf_bytes(1);

    let request = multipart_request(
        "/process",
        &[("template", "template.pdf", pdf.as_slice()), ("survey", "survey.docx", pdf.as_slice())],
    );
    let response = app(test_state(dir.path())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Only PDF files are allowed.");
}

#[tokio::test]
async fn test_content_not_pdf() {
    let dir = TempDir::new().unwrap();
    let template = pdf_bytes(1);

    let request = multipart_request(
        "/process",
        &[
            ("template", "template.pdf", template.as_slice()),
            ("survey", "survey.pdf", b"GIF89a not a pdf at all".as_slice()),
        ],
    );
    let response = app(test_state(dir.path())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("survey"));
}

#[tokio::test]
async fn test_file_too_large() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig {
        max_file_bytes: 64,
        ..test_config(dir.path())
    };
    let template = pdf_bytes(1);
    let survey = pdf_bytes(1);
    assert!(template.len() > 64, "fixture should exceed the limit");

    let request = multipart_request(
        "/process",
        &[
            ("template", "template.pdf", template.as_slice()),
            ("survey", "survey.pdf", survey.as_slice()),
        ],
    );
    let response = app(AppState::new(config)).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["status"], "error");
}

#[tokio::test]
async fn test_unparseable_pdf_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let survey = pdf_bytes(2);

    let request = multipart_request(
        "/process",
        &[
            ("template", "template.pdf", b"%PDF-1.7\nthis is truncated".as_slice()),
            ("survey", "survey.pdf", survey.as_slice()),
        ],
    );
    let response = app(test_state(dir.path())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("template"));
}

#[tokio::test]
async fn test_empty_template_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let template = pdf_bytes(0);
    let survey = pdf_bytes(2);

    let request = multipart_request(
        "/process",
        &[
            ("template", "template.pdf", template.as_slice()),
            ("survey", "survey.pdf", survey.as_slice()),
        ],
    );
    let response = app(test_state(dir.path())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_broken_survey_page_is_server_error() {
    let dir = TempDir::new().unwrap();
    let template = pdf_bytes(1);
    let survey = pdf_bytes_with_broken_page(4, 1);

    let request = multipart_request(
        "/process",
        &[
            ("template", "template.pdf", template.as_slice()),
            ("survey", "survey.pdf", survey.as_slice()),
        ],
    );
    let response = app(test_state(dir.path())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("page 1"));
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_upload_then_download_once() {
    let dir = TempDir::new().unwrap();
    let router = app(test_state(dir.path()));
    let template = pdf_bytes(1);
    let survey = pdf_bytes(3);

    let request = multipart_request(
        "/api/upload",
        &[
            ("template", "template.pdf", template.as_slice()),
            ("survey", "survey.pdf", survey.as_slice()),
        ],
    );
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    let file_id = json["file_id"].as_str().unwrap().to_string();
    assert_eq!(files_in(dir.path()), 1);

    let uri = format!("/api/download/{}", file_id);
    let response = router.clone().oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains(&file_id));
    assert_eq!(page_count(&body_bytes(response).await), 3);

    // Delivered artifacts are released
    assert_eq!(files_in(dir.path()), 0);
    let response = router.oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_unknown_file() {
    let dir = TempDir::new().unwrap();
    let router = app(test_state(dir.path()));

    for uri in [
        "/api/download/8f14e45f-ceea-467f-a0e6-1b2f3c4d5e6f",
        "/api/download/not-a-uuid",
    ] {
        let response = router.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "File not found");
    }
}

#[tokio::test]
async fn test_failed_upload_stores_nothing() {
    let dir = TempDir::new().unwrap();
    let state = test_state(dir.path());
    let survey = pdf_bytes(2);

    let request = multipart_request(
        "/api/upload",
        &[
            ("template", "template.pdf", b"%PDF-garbage".as_slice()),
            ("survey", "survey.pdf", survey.as_slice()),
        ],
    );
    let response = app(state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.artifacts().is_empty().await);
    assert_eq!(files_in(dir.path()), 0);
}

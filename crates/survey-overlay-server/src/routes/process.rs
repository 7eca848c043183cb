//! Overlay routes
//!
//! Endpoints:
//! - POST /process - Merge and respond with the PDF directly
//! - POST /api/upload - Merge and keep the PDF for a later download
//! - GET /api/download/:file_id - Deliver a kept PDF once

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use survey_overlay::OverlayError;
use uuid::Uuid;

use crate::artifacts::ARTIFACT_PREFIX;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::upload::{OverlayUpload, has_pdf_extension};

/// Room for multipart boundaries and part headers on top of the two files
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Serialize)]
pub struct UploadResponse {
    status: &'static str,
    file_id: Uuid,
}

/// Create the overlay router
pub fn router(max_file_bytes: usize) -> Router<AppState> {
    let body_limit = max_file_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/process", post(process))
        .route("/api/upload", post(upload))
        .route("/api/download/:file_id", get(download))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Run the engine off the async threads
async fn run_overlay(state: &AppState, upload: OverlayUpload) -> Result<Vec<u8>> {
    let options = state.options().clone();
    let merged = tokio::task::spawn_blocking(move || {
        survey_overlay::overlay_bytes(&upload.template.bytes, &upload.survey.bytes, &options)
    })
    .await
    .map_err(OverlayError::from)??;
    Ok(merged)
}

fn pdf_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Name of the merged file sent back by `/process`
fn merged_filename(survey_filename: &str) -> String {
    // Sanitized names are ASCII, so slicing off the extension is safe
    let stem = if has_pdf_extension(survey_filename) {
        &survey_filename[..survey_filename.len() - 4]
    } else {
        survey_filename
    };
    let stem = stem.trim_end_matches(['.', '_']);
    if stem.is_empty() {
        "survey_overlayed.pdf".to_string()
    } else {
        format!("{}_overlayed.pdf", stem)
    }
}

/// POST /process
async fn process(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let upload = OverlayUpload::from_multipart(multipart, state.config().max_file_bytes).await?;
    let filename = merged_filename(&upload.survey.filename);

    let merged = run_overlay(&state, upload).await?;
    tracing::info!(filename = %filename, size = merged.len(), "Processed overlay");

    Ok(pdf_attachment(&filename, merged))
}

/// POST /api/upload
async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let upload = OverlayUpload::from_multipart(multipart, state.config().max_file_bytes).await?;

    let merged = run_overlay(&state, upload).await?;
    let file_id = state.artifacts().store(merged).await?;
    tracing::info!(file_id = %file_id, "Stored processed overlay");

    Ok(Json(UploadResponse {
        status: "success",
        file_id,
    }))
}

/// GET /api/download/:file_id
async fn download(State(state): State<AppState>, Path(file_id): Path<String>) -> Result<Response> {
    let file_id = Uuid::parse_str(&file_id).map_err(|_| AppError::NotFound)?;
    let path = state
        .artifacts()
        .take(&file_id)
        .await
        .ok_or(AppError::NotFound)?;

    let bytes = tokio::fs::read(&path).await?;
    // The file is gone once this returns; the bytes are already in memory
    tokio::task::spawn_blocking(move || drop(path))
        .await
        .map_err(OverlayError::from)?;
    tracing::info!(file_id = %file_id, size = bytes.len(), "Delivered processed overlay");

    Ok(pdf_attachment(
        &format!("{}{}.pdf", ARTIFACT_PREFIX, file_id),
        bytes,
    ))
}

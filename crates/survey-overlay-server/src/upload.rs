//! Multipart intake for the template and survey files

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::StatusCode;
use survey_overlay::looks_like_pdf;

use crate::error::{AppError, Result};

pub const TEMPLATE_FIELD: &str = "template";
pub const SURVEY_FIELD: &str = "survey";

/// One uploaded PDF
#[derive(Debug)]
pub struct PdfUpload {
    /// Client file name, already passed through [`secure_filename`]
    pub filename: String,
    pub bytes: Bytes,
}

/// Both inputs of an overlay request
#[derive(Debug)]
pub struct OverlayUpload {
    pub template: PdfUpload,
    pub survey: PdfUpload,
}

impl OverlayUpload {
    /// Read and validate the `template` and `survey` fields.
    ///
    /// Checks run in order: presence, `.pdf` extension, size, PDF header.
    pub async fn from_multipart(mut multipart: Multipart, max_file_bytes: usize) -> Result<Self> {
        let mut template = None;
        let mut survey = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            if name != TEMPLATE_FIELD && name != SURVEY_FIELD {
                tracing::debug!("Skipping multipart field '{}'", name);
                continue;
            }

            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            tracing::debug!(field = %name, filename = %filename, size = bytes.len(), "Received upload");

            let upload = (filename, bytes);
            if name == TEMPLATE_FIELD {
                template = Some(upload);
            } else {
                survey = Some(upload);
            }
        }

        let (Some(template), Some(survey)) = (template, survey) else {
            return Err(AppError::BadRequest(
                "Both \"template\" and \"survey\" files are required.".to_string(),
            ));
        };

        if !has_pdf_extension(&template.0) || !has_pdf_extension(&survey.0) {
            return Err(AppError::BadRequest(
                "Only PDF files are allowed.".to_string(),
            ));
        }

        Ok(Self {
            template: validate(TEMPLATE_FIELD, template, max_file_bytes)?,
            survey: validate(SURVEY_FIELD, survey, max_file_bytes)?,
        })
    }
}

fn validate(field: &str, (filename, bytes): (String, Bytes), max_file_bytes: usize) -> Result<PdfUpload> {
    if bytes.len() > max_file_bytes {
        return Err(AppError::PayloadTooLarge {
            field: field.to_string(),
            limit: max_file_bytes,
        });
    }

    if !looks_like_pdf(&bytes) {
        return Err(AppError::BadRequest(format!(
            "The {} file is not a valid PDF.",
            field
        )));
    }

    Ok(PdfUpload {
        filename: secure_filename(&filename),
        bytes,
    })
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BodyTooLarge
    } else {
        AppError::BadRequest(format!("Failed to read upload: {}", e.body_text()))
    }
}

pub fn has_pdf_extension(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Reduce a client-supplied file name to a safe ASCII form.
///
/// Path separators become word breaks, whitespace runs become a single
/// `_`, and anything but ASCII letters, digits, `.`, `_` and `-` is
/// dropped. Leading and trailing dots and underscores are trimmed, so
/// the result can never name a parent directory. May return an empty
/// string.
pub fn secure_filename(filename: &str) -> String {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

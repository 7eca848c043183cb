//! PDF overlay - drawing survey pages over a template background
//!
//! This module orchestrates the overlay process:
//! 1. Open the template and survey documents
//! 2. Copy every even survey page verbatim
//! 3. Composite every odd survey page over template page 0
//! 4. Assemble the output page tree

mod assemble;
mod io;

pub use io::{load_pdf, load_pdf_bytes, looks_like_pdf, save_pdf, save_pdf_bytes};

use crate::options::OverlayOptions;
use crate::types::*;
use assemble::overlay_sync;
use lopdf::Document;
use std::path::Path;

/// Overlay `survey` onto `template`.
///
/// The output has exactly one page per survey page. Zero-indexed odd
/// pages are drawn over template page 0 at the template's size; even
/// pages are copied as they are. Neither input is modified.
pub fn overlay(
    template: &Document,
    survey: &Document,
    options: &OverlayOptions,
) -> Result<Document> {
    options.validate()?;
    overlay_sync(template, survey, options)
}

/// Run [`overlay`] on the blocking thread pool
pub async fn overlay_async(
    template: Document,
    survey: Document,
    options: OverlayOptions,
) -> Result<Document> {
    options.validate()?;

    tokio::task::spawn_blocking(move || overlay_sync(&template, &survey, &options)).await?
}

/// Overlay two serialized documents and serialize the result.
///
/// The template is parsed first, so a broken template is reported
/// before the survey is looked at.
pub fn overlay_bytes(template: &[u8], survey: &[u8], options: &OverlayOptions) -> Result<Vec<u8>> {
    options.validate()?;

    let template = load_pdf_bytes(template, DocumentRole::Template)?;
    let survey = load_pdf_bytes(survey, DocumentRole::Survey)?;
    let output = overlay_sync(&template, &survey, options)?;

    save_pdf_bytes(output, options.compress)
}

/// Overlay two PDF files and write the result to `output_path`.
///
/// Nothing is written when the overlay fails.
pub async fn overlay_files(
    template_path: impl AsRef<Path>,
    survey_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &OverlayOptions,
) -> Result<()> {
    options.validate()?;

    let template = load_pdf(template_path, DocumentRole::Template).await?;
    let survey = load_pdf(survey_path, DocumentRole::Survey).await?;
    let output = overlay_async(template, survey, options.clone()).await?;

    save_pdf(output, output_path, options.compress).await
}

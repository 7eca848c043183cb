//! Document I/O operations for overlay

use crate::constants::PDF_HEADER;
use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>, role: DocumentRole) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    tokio::task::spawn_blocking(move || load_pdf_bytes(&bytes, role)).await?
}

/// Parse a PDF document from memory
pub fn load_pdf_bytes(bytes: &[u8], role: DocumentRole) -> Result<Document> {
    Document::load_mem(bytes).map_err(|source| OverlayError::InvalidDocument { role, source })
}

/// Save a document to disk
pub async fn save_pdf(doc: Document, path: impl AsRef<Path>, compress: bool) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || save_pdf_bytes(doc, compress)).await??;
    tokio::fs::write(&path, bytes).await?;
    Ok(())
}

/// Serialize a document to bytes
pub fn save_pdf_bytes(mut doc: Document, compress: bool) -> Result<Vec<u8>> {
    if compress {
        doc.compress();
    }
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Cheap check that bytes look like a PDF file.
///
/// Only the header is inspected; a full parse is still needed to know
/// the document is usable.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    // Some producers emit a few junk bytes before the header
    bytes
        .windows(PDF_HEADER.len())
        .take(1024)
        .any(|window| window == PDF_HEADER)
}

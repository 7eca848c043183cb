mod constants;
pub mod overlay;
mod options;
pub mod render;
mod stats;
mod types;

pub use constants::{DEFAULT_PAGE_DIMENSIONS, DEFAULT_PDF_VERSION, TEMPLATE_PAGE_INDEX};
pub use options::*;
pub use overlay::{
    load_pdf, load_pdf_bytes, looks_like_pdf, overlay, overlay_async, overlay_bytes,
    overlay_files, save_pdf, save_pdf_bytes,
};
pub use render::{page_content, page_geometry, page_size};
pub use stats::calculate_statistics;
pub use types::*;

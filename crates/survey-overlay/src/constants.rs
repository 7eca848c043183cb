//! Shared constants for PDF overlay
//!
//! This module centralizes magic numbers and names used throughout
//! the overlay process.

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Template
// =============================================================================

/// Index of the template page used as background
pub const TEMPLATE_PAGE_INDEX: usize = 0;

/// Resource name of the template Form XObject on composited pages
pub const TEMPLATE_XOBJECT_NAME: &str = "Tpl";

/// Resource name of the survey Form XObject on composited pages
pub const SURVEY_XOBJECT_NAME: &str = "Srv";

// =============================================================================
// Output Document
// =============================================================================

/// PDF version written when the options don't say otherwise
pub const DEFAULT_PDF_VERSION: &str = "1.7";

/// Versions accepted for the output header
pub const SUPPORTED_PDF_VERSIONS: &[&str] = &[
    "1.0", "1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "2.0",
];

/// Every PDF file starts with this marker
pub const PDF_HEADER: &[u8] = b"%PDF-";

/// Page attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_PAGE_KEYS: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

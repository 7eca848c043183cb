use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Invalid {role} document: {source}")]
    InvalidDocument {
        role: DocumentRole,
        #[source]
        source: lopdf::Error,
    },
    #[error("Template document has no pages")]
    EmptyTemplate,
    #[error("Failed to composite page {page_index}: {reason}")]
    CompositeFailure { page_index: usize, reason: String },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable page content: {0}")]
    Content(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl OverlayError {
    pub(crate) fn composite(page_index: usize, reason: impl fmt::Display) -> Self {
        OverlayError::CompositeFailure {
            page_index,
            reason: reason.to_string(),
        }
    }

    /// True when the failure lies with the caller's input rather than the engine.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            OverlayError::InvalidDocument { .. } | OverlayError::EmptyTemplate
        )
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;

/// Which input a document plays in an overlay call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRole {
    Template,
    Survey,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Template => f.write_str("template"),
            DocumentRole::Survey => f.write_str("survey"),
        }
    }
}

/// How a survey page is carried into the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTreatment {
    /// Copied verbatim, no template involved
    Passthrough,
    /// Drawn over template page 0 on a page of the template's size
    Composite,
}

impl PageTreatment {
    /// The template goes behind every second page, starting with the second.
    ///
    /// Zero-indexed odd pages are composited; even pages pass through.
    pub fn for_index(page_index: usize) -> Self {
        if page_index % 2 == 1 {
            PageTreatment::Composite
        } else {
            PageTreatment::Passthrough
        }
    }

    pub fn is_composite(self) -> bool {
        self == PageTreatment::Composite
    }
}

/// Page scaling behavior when a composited page doesn't match the template size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalingMode {
    /// Fit page to the template rectangle (preserve aspect ratio, centered)
    #[default]
    Fit,
    /// Stretch to fill the template rectangle (ignore aspect ratio)
    Stretch,
}

/// Displayed page size in points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Compare with a tolerance suited to values that went through a PDF round trip
    pub fn approx_eq(&self, other: &PageSize) -> bool {
        (self.width - other.width).abs() < 0.01 && (self.height - other.height).abs() < 0.01
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} pt", self.width, self.height)
    }
}

/// Statistics about an overlay
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStatistics {
    /// Pages in the survey, and therefore in the output
    pub survey_pages: usize,
    /// Output pages drawn over the template
    pub composited_pages: usize,
    /// Output pages copied verbatim from the survey
    pub passthrough_pages: usize,
    /// Size of every composited page
    pub template_size: PageSize,
}

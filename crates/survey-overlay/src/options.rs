use crate::constants::{DEFAULT_PDF_VERSION, SUPPORTED_PDF_VERSIONS};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Overlay configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayOptions {
    /// How composited pages are mapped into the template rectangle
    pub scaling_mode: ScalingMode,

    /// Header version of the output document
    pub pdf_version: String,

    /// Compress content streams when serializing
    pub compress: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            scaling_mode: ScalingMode::Fit,
            pdf_version: DEFAULT_PDF_VERSION.to_string(),
            compress: true,
        }
    }
}

impl OverlayOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| OverlayError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| OverlayError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PDF_VERSIONS.contains(&self.pdf_version.as_str()) {
            return Err(OverlayError::Config(format!(
                "Unsupported PDF version '{}'. Use one of: {}",
                self.pdf_version,
                SUPPORTED_PDF_VERSIONS.join(", ")
            )));
        }

        Ok(())
    }
}

//! Application state management

use std::sync::Arc;

use survey_overlay::OverlayOptions;

use crate::artifacts::ArtifactStore;
use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    options: OverlayOptions,
    artifacts: ArtifactStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_options(config, OverlayOptions::default())
    }

    pub fn with_options(config: ServerConfig, options: OverlayOptions) -> Self {
        let artifacts = ArtifactStore::new(config.processed_dir.clone(), config.artifact_ttl());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                options,
                artifacts,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Options every overlay request runs with
    pub fn options(&self) -> &OverlayOptions {
        &self.inner.options
    }

    /// Get the artifact store
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.inner.artifacts
    }
}

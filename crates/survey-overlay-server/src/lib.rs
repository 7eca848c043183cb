//! HTTP front end for the survey overlay engine
//!
//! Accepts a template and a survey PDF as multipart uploads, merges
//! them, and either responds with the result or keeps it as a
//! short-lived artifact for a later download.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod upload;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use artifacts::ArtifactStore;
pub use config::ServerConfig;
pub use error::AppError;
pub use state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(routes::process::router(state.config().max_file_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

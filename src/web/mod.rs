//! HTTP surface over the resolver and download pipeline

pub mod error;
pub mod handlers;
pub mod stream;

use std::sync::Arc;

use axum::{routing::post, Router};

use crate::core::{DownloadPipeline, SourceResolver};

pub use error::{ApiError, ApiResult};

/// Shared handles passed to every request
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<SourceResolver>,
    pub pipeline: Arc<DownloadPipeline>,
}

impl AppState {
    pub fn new(resolver: SourceResolver, pipeline: DownloadPipeline) -> Self {
        Self {
            resolver: Arc::new(resolver),
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(handlers::search))
        .route("/download", post(handlers::download))
        .with_state(state)
}

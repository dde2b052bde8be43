pub mod analyze;
pub mod index;
pub mod report;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::config::UploadConfig;
use crate::services::ocr::{HttpOcrClient, Recognizers};

/// Shared, read-only handles plus the pipeline lock
pub struct AppState {
    pub upload: UploadConfig,
    pub client: HttpOcrClient,
    pub recognizers: Recognizers,
    /// Held for the whole save → recognize → delete sequence of one request
    pub pipeline: Mutex<()>,
}

impl AppState {
    pub fn new(upload: UploadConfig, client: HttpOcrClient) -> Self {
        Self {
            upload,
            recognizers: Recognizers::new(client.clone()),
            client,
            pipeline: Mutex::new(()),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Build the HTTP surface of the service
pub fn router(state: SharedState) -> Router {
    let body_limit = state.upload.max_bytes;

    Router::new()
        .route("/", get(index::index))
        .route("/health", get(index::health))
        .route("/analyze_single", post(analyze::analyze_single))
        .route("/generate_report", post(report::generate_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

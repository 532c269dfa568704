//! HTTP handlers for the explorer service.

pub mod assistant;
pub mod health;
pub mod metrics;
pub mod proxy;

use axum::{body::Bytes, extract::rejection::BytesRejection, http::Uri};
use service_core::error::AppError;

/// JSON 404 for paths no route or static file answers.
pub async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "No route matched");
    AppError::NotFound(anyhow::anyhow!("Not found"))
}

/// Body extraction failures answer with the usual JSON error instead of
/// axum's plain-text rejection.
pub(crate) fn request_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, AppError> {
    body.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Failed to read request body");
        AppError::BadRequest(anyhow::anyhow!("Invalid JSON payload"))
    })
}

//! `/api/proxy`: forward a caller-described request server-side so the browser
//! is not subject to the target's CORS policy.

use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use service_core::error::AppError;

use super::request_body;
use crate::models::{OutboundCallSpec, ProxyResponse};
use crate::services::metrics::record_proxy_outcome;
use crate::startup::AppState;

/// Returns `400` for an invalid payload. Everything else, including an
/// unreachable target, is a `200` whose body describes the upstream result.
pub async fn forward(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ProxyResponse>, AppError> {
    let spec = OutboundCallSpec::from_json(&request_body(body)?)?;

    tracing::info!(
        method = %spec.method,
        url = %spec.url,
        header_count = spec.headers.len(),
        "Forwarding proxied request"
    );

    let outcome = state.forwarder.send(&spec).await;
    record_proxy_outcome(outcome.label());

    let response = ProxyResponse::from(outcome);
    tracing::info!(
        url = %spec.url,
        status = response.status,
        body_len = response.body.len(),
        "Proxied request completed"
    );

    Ok(Json(response))
}

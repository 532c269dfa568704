//! `/api/ai`: turn a plain-English request into a ready-to-send API call by
//! asking a language model under a fixed prompt contract.

use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use serde_json::Value;
use service_core::error::AppError;

use super::request_body;
use crate::models::{AssistantRequest, ModelReply};
use crate::prompt::SYSTEM_PROMPT;
use crate::services::metrics::record_assistant_outcome;
use crate::services::providers::Completion;
use crate::startup::AppState;

pub async fn suggest(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, AppError> {
    let Some(provider) = state.assistant.as_ref() else {
        record_assistant_outcome("unconfigured");
        return Err(AppError::ServiceUnavailable(
            "AI service not configured".to_string(),
        ));
    };

    let request = request_body(body)
        .and_then(|body| AssistantRequest::from_json(&body))
        .inspect_err(|_| record_assistant_outcome("invalid"))?;

    tracing::info!(prompt_len = request.prompt().len(), "Requesting call suggestion");

    let raw = provider
        .complete(Completion {
            system: SYSTEM_PROMPT,
            prompt: request.prompt(),
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Assistant upstream call failed");
            record_assistant_outcome("error");
            AppError::from(e)
        })?;

    let reply = ModelReply::parse(&raw);
    if reply.is_structured() {
        record_assistant_outcome("structured");
    } else {
        tracing::warn!(output_len = raw.len(), "Model output was not a JSON object");
        record_assistant_outcome("fallback");
    }

    Ok(Json(reply.into_value()))
}

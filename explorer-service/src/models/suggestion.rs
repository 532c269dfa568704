//! Assistant input and the structured call suggestion returned by the model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service_core::error::AppError;
use validator::{Validate, ValidationError};

/// Shortest prompt, after trimming, that is worth sending to the model.
/// Counted in UTF-16 code units, so one astral character such as an emoji
/// already meets it.
const MIN_PROMPT_UNITS: usize = 2;

#[derive(Debug, Deserialize, Validate)]
pub struct AssistantRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_prompt"))]
    pub message: String,
}

fn validate_prompt(message: &str) -> Result<(), ValidationError> {
    if message.trim().encode_utf16().count() < MIN_PROMPT_UNITS {
        let mut err = ValidationError::new("prompt_too_short");
        err.message = Some("message is required".into());
        return Err(err);
    }
    Ok(())
}

impl AssistantRequest {
    /// Parse and validate a raw assistant payload.
    pub fn from_json(raw: &[u8]) -> Result<Self, AppError> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid JSON")))?;

        let request: AssistantRequest = serde_json::from_value(value)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("message is required: {}", e)))?;

        request.validate()?;
        Ok(request)
    }

    /// The user turn as sent upstream.
    pub fn prompt(&self) -> &str {
        self.message.trim()
    }
}

/// The contract the model is asked to follow.
///
/// Only built locally for the explanation-only fallback; model output that
/// parses is relayed as-is, `call` included, without a schema check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantCallSuggestion {
    pub explanation: String,
    pub call: Option<Value>,
    pub note: Option<String>,
}

impl AssistantCallSuggestion {
    pub fn explanation_only(explanation: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
            call: None,
            note: None,
        }
    }
}

/// Interpretation of the model's text output.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// A JSON object, relayed to the caller unchanged.
    Structured(Map<String, Value>),
    /// Anything else; the raw text becomes the explanation.
    Fallback(AssistantCallSuggestion),
}

impl ModelReply {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(strip_code_fences(raw)) {
            Ok(Value::Object(object)) => ModelReply::Structured(object),
            _ => ModelReply::Fallback(AssistantCallSuggestion::explanation_only(raw)),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ModelReply::Structured(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            ModelReply::Structured(object) => Value::Object(object),
            ModelReply::Fallback(suggestion) => serde_json::json!({
                "explanation": suggestion.explanation,
                "call": suggestion.call,
                "note": suggestion.note,
            }),
        }
    }
}

/// Remove a leading "```" or "```json" line and a trailing "```" line.
///
/// Only fences at the very start and end of the text are recognised.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw;

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = rest.strip_prefix('\n').unwrap_or(rest);
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest.strip_suffix('\n').unwrap_or(rest);
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_json_fences() {
        let raw = "```json\n{\"explanation\":\"x\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"explanation\":\"x\"}");
    }

    #[test]
    fn strips_bare_fences() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```{}```"), "{}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("here: ```{}```"), "here: ```{}");
    }

    #[test]
    fn structured_reply_is_returned_unchanged() {
        let object = json!({
            "explanation": "Looks up DNS A records.",
            "call": {
                "url": "https://dns.google/resolve",
                "method": "GET",
                "headers": {},
                "params": { "name": "example.com", "type": "A" },
                "body": null
            },
            "note": null,
            "extra": [1, 2, 3]
        });
        let raw = format!("```json\n{}\n```", object);

        let reply = ModelReply::parse(&raw);
        assert!(reply.is_structured());
        assert_eq!(reply.into_value(), object);
    }

    #[test]
    fn malformed_call_is_passed_through() {
        let object = json!({ "explanation": "x", "call": { "method": "BREW", "headers": { "a": [1] } } });
        let reply = ModelReply::parse(&object.to_string());
        assert_eq!(reply.into_value(), object);
    }

    #[test]
    fn prose_falls_back_to_explanation_only() {
        let raw = "Sorry, I can't build that request.";
        assert_eq!(
            ModelReply::parse(raw).into_value(),
            json!({ "explanation": raw, "call": null, "note": null })
        );
    }

    #[test]
    fn non_object_json_falls_back() {
        let reply = ModelReply::parse("[1, 2]");
        assert_eq!(
            reply,
            ModelReply::Fallback(AssistantCallSuggestion::explanation_only("[1, 2]"))
        );
    }

    #[test]
    fn empty_output_falls_back_with_empty_explanation() {
        assert_eq!(
            ModelReply::parse("").into_value(),
            json!({ "explanation": "", "call": null, "note": null })
        );
    }

    #[test]
    fn prompt_is_trimmed() {
        let request = AssistantRequest::from_json(br#"{"message":"  dns for example.com \n"}"#)
            .unwrap();
        assert_eq!(request.prompt(), "dns for example.com");
    }

    #[test]
    fn single_astral_character_is_long_enough() {
        let raw = serde_json::to_vec(&json!({ "message": " \u{1F600} " })).unwrap();
        let request = AssistantRequest::from_json(&raw).unwrap();
        assert_eq!(request.prompt(), "\u{1F600}");
    }

    #[test]
    fn single_bmp_character_is_too_short() {
        for message in ["a", " é ", "\u{4E2D}"] {
            let raw = serde_json::to_vec(&json!({ "message": message })).unwrap();
            assert!(
                matches!(AssistantRequest::from_json(&raw), Err(AppError::ValidationError(_))),
                "{message:?} should be rejected"
            );
        }
    }

    #[test]
    fn short_or_missing_prompts_are_rejected() {
        for raw in [r#"{"message":" a "}"#, r#"{"message":"   "}"#, r#"{}"#] {
            let result = AssistantRequest::from_json(raw.as_bytes());
            assert!(
                matches!(result, Err(AppError::ValidationError(_))),
                "payload {raw}"
            );
        }
    }

    #[test]
    fn non_string_prompt_is_rejected() {
        for raw in [r#"{"message":42}"#, r#"{"message":null}"#, "not json"] {
            let result = AssistantRequest::from_json(raw.as_bytes());
            assert!(matches!(result, Err(AppError::BadRequest(_))), "payload {raw}");
        }
    }
}

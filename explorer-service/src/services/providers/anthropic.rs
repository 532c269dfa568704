//! Anthropic Messages API provider.

use super::{Completion, CompletionProvider, ProviderError, GENERIC_UPSTREAM_ERROR};
use crate::config::AssistantConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const MESSAGES_PATH: &str = "/v1/messages";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [ApiMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

pub struct AnthropicProvider {
    client: Client,
    api_key: Secret<String>,
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_version: String,
}

impl AnthropicProvider {
    pub fn new(config: &AssistantConfig, api_key: Secret<String>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), MESSAGES_PATH),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_version: config.api_version.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, request: Completion<'_>) -> Result<String, ProviderError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: request.system,
            messages: [ApiMessage {
                role: "user",
                content: request.prompt,
            }],
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            "Sending request to Anthropic API"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let payload = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let message = payload
                .ok()
                .as_ref()
                .and_then(|v| v.pointer("/error/message"))
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(GENERIC_UPSTREAM_ERROR)
                .to_string();

            tracing::warn!(status = status.as_u16(), error = %message, "Anthropic API error");

            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let payload = payload.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        Ok(first_text_segment(&payload).to_string())
    }
}

fn first_text_segment(payload: &Value) -> &str {
    payload
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_text_segment() {
        let payload = json!({
            "content": [
                { "type": "text", "text": "{\"explanation\":\"x\"}" },
                { "type": "text", "text": "second" }
            ]
        });
        assert_eq!(first_text_segment(&payload), "{\"explanation\":\"x\"}");
    }

    #[test]
    fn missing_or_malformed_content_yields_empty_text() {
        assert_eq!(first_text_segment(&json!({})), "");
        assert_eq!(first_text_segment(&json!({ "content": [] })), "");
        assert_eq!(first_text_segment(&json!({ "content": [{ "type": "tool_use" }] })), "");
        assert_eq!(first_text_segment(&json!({ "content": "text" })), "");
    }

    #[test]
    fn request_body_matches_messages_api() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 1024,
            system: "sys",
            messages: [ApiMessage {
                role: "user",
                content: "hi",
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "m",
                "max_tokens": 1024,
                "system": "sys",
                "messages": [{ "role": "user", "content": "hi" }]
            })
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = AssistantConfig {
            base_url: "http://localhost:9999/".to_string(),
            ..AssistantConfig::default()
        };
        let provider = AnthropicProvider::new(&config, Secret::new("k".to_string())).unwrap();
        assert_eq!(provider.endpoint, "http://localhost:9999/v1/messages");
    }
}

//! Server-side HTTP client for the proxy endpoint.

use crate::config::ProxyConfig;
use crate::models::{OutboundCallSpec, UpstreamOutcome, UpstreamResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::time::Duration;

/// Forwards caller-described requests and captures whatever comes back.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client,
    user_agent: String,
}

impl HttpForwarder {
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Send `spec` once. Never fails: transport problems become
    /// [`UpstreamOutcome::Unreachable`].
    pub async fn send(&self, spec: &OutboundCallSpec) -> UpstreamOutcome {
        let headers = match self.build_headers(spec) {
            Ok(headers) => headers,
            Err(reason) => return UpstreamOutcome::Unreachable { reason },
        };

        let mut request = self
            .client
            .request(spec.method.into(), spec.url.as_str())
            .headers(headers);

        if let Some(body) = spec.outbound_body() {
            request = request.body(body.to_owned());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %spec.url, error = %e, "Proxy target unreachable");
                return UpstreamOutcome::Unreachable {
                    reason: describe(&e),
                };
            }
        };

        let status = response.status();
        let headers = flatten_headers(response.headers());

        match response.text().await {
            Ok(body) => UpstreamOutcome::Responded(UpstreamResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
                headers,
            }),
            Err(e) => {
                tracing::warn!(url = %spec.url, error = %e, "Failed to read proxy target body");
                UpstreamOutcome::Unreachable {
                    reason: describe(&e),
                }
            }
        }
    }

    /// Default `User-Agent` first, then caller headers on top.
    fn build_headers(&self, spec: &OutboundCallSpec) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| format!("Invalid default User-Agent: {}", e))?;
        headers.insert(USER_AGENT, user_agent);

        for (name, value) in &spec.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| format!("Invalid header name '{}': {}", name, e))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| format!("Invalid value for header '{}': {}", name, e))?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

/// One entry per header name; repeated names keep the last value.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// reqwest's top-level message hides the cause ("error sending request"), so
/// append the source chain.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

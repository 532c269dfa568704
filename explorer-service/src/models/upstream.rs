//! Result of a forwarded call, and how the proxy reports it.

use serde::Serialize;
use std::collections::BTreeMap;

/// `statusText` reported when the target could not be reached at all.
pub const CONNECTION_ERROR: &str = "Connection Error";

/// What the target sent back. Status, body and headers are copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, not the phrase on the target's
    /// status line. Empty for unregistered codes.
    pub status_text: String,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

/// Outcome of one outbound call.
///
/// Any HTTP answer, including 4xx and 5xx, is `Responded`. Only a call that
/// never produced a complete response (DNS, refused connection, TLS, timeout,
/// truncated body) is `Unreachable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    Responded(UpstreamResponse),
    Unreachable { reason: String },
}

impl UpstreamOutcome {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            UpstreamOutcome::Responded(_) => "responded",
            UpstreamOutcome::Unreachable { .. } => "unreachable",
        }
    }
}

/// Body of a `200` from the proxy endpoint.
///
/// An unreachable target is flattened into `status: 0` so the browser can tell
/// "the target failed" apart from "the proxy rejected the request" (4xx/5xx).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl From<UpstreamOutcome> for ProxyResponse {
    fn from(outcome: UpstreamOutcome) -> Self {
        match outcome {
            UpstreamOutcome::Responded(response) => ProxyResponse {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
                headers: response.headers,
            },
            UpstreamOutcome::Unreachable { reason } => ProxyResponse {
                status: 0,
                status_text: CONNECTION_ERROR.to_string(),
                body: reason,
                headers: BTreeMap::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unreachable_flattens_to_status_zero() {
        let response = ProxyResponse::from(UpstreamOutcome::Unreachable {
            reason: "connection refused".to_string(),
        });

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "status": 0,
                "statusText": "Connection Error",
                "body": "connection refused",
                "headers": {}
            })
        );
    }

    #[test]
    fn error_statuses_pass_through_untouched() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());

        let response = ProxyResponse::from(UpstreamOutcome::Responded(UpstreamResponse {
            status: 404,
            status_text: "Not Found".to_string(),
            body: "missing".to_string(),
            headers,
        }));

        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["status"], 404);
        assert_eq!(value["statusText"], "Not Found");
        assert_eq!(value["body"], "missing");
        assert_eq!(value["headers"]["content-type"], "text/plain");
    }
}

//! Caller-described outbound request for the proxy.

use serde::Deserialize;
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP verbs the proxy is willing to forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Whether a caller-supplied body is forwarded for this verb.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(anyhow::anyhow!("Unsupported method: {}", other)),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Wire shape of a proxy request. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ProxyRequest {
    url: Option<String>,
    method: Option<String>,
    headers: Option<BTreeMap<String, String>>,
    body: Option<String>,
}

/// A validated request to forward, built fresh for every proxy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCallSpec {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl OutboundCallSpec {
    /// Parse and validate a raw proxy payload.
    pub fn from_json(raw: &[u8]) -> Result<Self, AppError> {
        let value: serde_json::Value = serde_json::from_slice(raw)
            .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid JSON payload")))?;

        let request: ProxyRequest = serde_json::from_value(value)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid proxy payload: {}", e)))?;

        let url = request
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("url is required")))?;

        if !has_http_scheme(&url) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Only http/https URLs are supported"
            )));
        }

        let method = match request.method {
            Some(method) => method.parse::<HttpMethod>().map_err(AppError::BadRequest)?,
            None => HttpMethod::default(),
        };

        Ok(Self {
            url,
            method,
            headers: request.headers.unwrap_or_default(),
            body: request.body,
        })
    }

    /// The body to send, if any. Empty bodies and bodies on verbs that do not
    /// carry one are dropped.
    pub fn outbound_body(&self) -> Option<&str> {
        if !self.method.carries_body() {
            return None;
        }
        self.body.as_deref().filter(|body| !body.is_empty())
    }
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<OutboundCallSpec, AppError> {
        OutboundCallSpec::from_json(raw.as_bytes())
    }

    fn bad_request_message(result: Result<OutboundCallSpec, AppError>) -> String {
        match result {
            Err(AppError::BadRequest(err)) => err.to_string(),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn defaults_to_get_with_no_headers() {
        let spec = parse(r#"{"url":"https://example.com/data"}"#).unwrap();
        assert_eq!(spec.method, HttpMethod::Get);
        assert!(spec.headers.is_empty());
        assert_eq!(spec.body, None);
    }

    #[test]
    fn method_is_case_insensitive() {
        let spec = parse(r#"{"url":"https://example.com/data","method":"pAtCh"}"#).unwrap();
        assert_eq!(spec.method, HttpMethod::Patch);
        assert_eq!(spec.method.to_string(), "PATCH");
    }

    #[test]
    fn scheme_check_is_case_insensitive() {
        assert!(parse(r#"{"url":"HTTPS://example.com"}"#).is_ok());
        assert!(parse(r#"{"url":"Http://example.com"}"#).is_ok());
    }

    #[test]
    fn missing_or_empty_url_is_rejected() {
        assert_eq!(bad_request_message(parse(r#"{}"#)), "url is required");
        assert_eq!(bad_request_message(parse(r#"{"url":""}"#)), "url is required");
        assert_eq!(bad_request_message(parse(r#"{"url":null}"#)), "url is required");
    }

    #[test]
    fn non_http_schemes_are_rejected() {
        for url in ["ftp://example.com", "file:///etc/passwd", "example.com", "http:/x", "h"] {
            let raw = serde_json::json!({ "url": url }).to_string();
            assert_eq!(
                bad_request_message(parse(&raw)),
                "Only http/https URLs are supported",
                "url {url}"
            );
        }
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert_eq!(bad_request_message(parse("{not json")), "Invalid JSON payload");
        assert_eq!(bad_request_message(parse("")), "Invalid JSON payload");
    }

    #[test]
    fn type_mismatches_are_rejected() {
        assert!(parse(r#"{"url":42}"#).is_err());
        assert!(parse(r#"{"url":"https://x.io","headers":{"a":{"nested":true}}}"#).is_err());
        assert!(parse(r#"{"url":"https://x.io","body":{"k":1}}"#).is_err());
        assert!(parse(r#"[1,2]"#).is_err());
    }

    #[test]
    fn unknown_method_is_rejected() {
        let message = bad_request_message(parse(r#"{"url":"https://x.io","method":"BREW"}"#));
        assert!(message.contains("BREW"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let spec = parse(r#"{"url":"https://x.io","params":{"q":"1"},"extra":true}"#).unwrap();
        assert_eq!(spec.url, "https://x.io");
    }

    #[test]
    fn body_only_travels_with_post_put_patch() {
        for method in ["POST", "PUT", "PATCH"] {
            let raw = serde_json::json!({ "url": "https://x.io", "method": method, "body": "{}" });
            let spec = parse(&raw.to_string()).unwrap();
            assert_eq!(spec.outbound_body(), Some("{}"), "method {method}");
        }
        for method in ["GET", "DELETE", "HEAD", "OPTIONS"] {
            let raw = serde_json::json!({ "url": "https://x.io", "method": method, "body": "{}" });
            let spec = parse(&raw.to_string()).unwrap();
            assert_eq!(spec.outbound_body(), None, "method {method}");
        }
    }

    #[test]
    fn empty_body_is_not_sent() {
        let spec = parse(r#"{"url":"https://x.io","method":"POST","body":""}"#).unwrap();
        assert_eq!(spec.outbound_body(), None);
    }
}

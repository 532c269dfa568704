//! Request and response shapes for the proxy and assistant handlers.

pub mod call_spec;
pub mod suggestion;
pub mod upstream;

pub use call_spec::{HttpMethod, OutboundCallSpec};
pub use suggestion::{AssistantCallSuggestion, AssistantRequest, ModelReply};
pub use upstream::{ProxyResponse, UpstreamOutcome, UpstreamResponse};

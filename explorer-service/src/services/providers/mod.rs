//! Language model provider abstraction for the assistant.
//!
//! The handler only needs "system instruction + one user turn in, text out";
//! the trait keeps the Anthropic client swappable with a mock in tests.

pub mod anthropic;
pub mod mock;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Fallback message when the upstream error body carries none.
pub const GENERIC_UPSTREAM_ERROR: &str = "Upstream error";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The API answered with a non-success status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The API could not be reached.
    #[error("{0}")]
    Network(String),

    /// The API answered 2xx with a body that is not JSON.
    #[error("{0}")]
    InvalidResponse(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Upstream { status, message } => AppError::BadGateway { message, status },
            ProviderError::Network(msg) | ProviderError::InvalidResponse(msg) => {
                AppError::InternalError(anyhow::anyhow!(msg))
            }
        }
    }
}

/// A single-turn completion request.
#[derive(Debug, Clone, Copy)]
pub struct Completion<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Return the first text segment of the model output, or an empty string
    /// when the output has none.
    async fn complete(&self, request: Completion<'_>) -> Result<String, ProviderError>;
}

use async_trait::async_trait;
use thiserror::Error;

use super::types::{Delivery, Message, SendContext};
use crate::uri::{self, ParseError, ParsedDestination};

/// Provider-reported delivery failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid destination: {0}")]
    InvalidDestination(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(value: reqwest::Error) -> Self {
        ProviderError::Request(value.to_string())
    }
}

impl From<ParseError> for ProviderError {
    fn from(value: ParseError) -> Self {
        ProviderError::InvalidDestination(value.to_string())
    }
}

/// Delivery mechanism owning one or more destination schemes
///
/// Providers are registered by scheme in the
/// [`ProviderRegistry`](super::ProviderRegistry). The router calls
/// [`decompose`](Provider::decompose) and then [`send`](Provider::send) once per
/// destination; an `Err` or a panic from either becomes a failed result for
/// that destination only.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, e.g. `"discord"`
    fn id(&self) -> &str;

    /// Schemes this provider owns
    fn schemas(&self) -> Vec<&str>;

    /// Decompose a destination in this provider's dialect
    fn decompose(&self, raw: &str) -> Result<ParsedDestination, ParseError> {
        uri::decompose(raw)
    }

    /// Deliver `message` to the destination described by `ctx`
    async fn send(
        &self,
        message: &Message,
        ctx: SendContext<'_>,
    ) -> Result<Delivery, ProviderError>;
}

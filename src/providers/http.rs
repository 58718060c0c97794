//! HTTP client shared by the built-in providers

use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::traits::ProviderError;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("notifybox/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn build_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .user_agent(&self.user_agent)
            .build()
    }
}

/// Map a response to its diagnostic body, or to `Rejected` on a non-2xx status
pub(crate) async fn read_response(response: Response) -> Result<Option<Value>, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Request(format!("failed to read body: {}", e)))?;

    if !status.is_success() {
        return Err(ProviderError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    debug!(status = status.as_u16(), size = body.len(), "Provider responded");

    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(
        serde_json::from_str(&body).unwrap_or(Value::String(body)),
    ))
}

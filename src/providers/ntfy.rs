//! ntfy provider.
//!
//! ```text
//! ntfy://topic                              # public ntfy.sh server
//! ntfy://[user:pass@]host[:port]/topic      # self-hosted, HTTP
//! ntfys://[user:pass@]host[:port]/topic     # self-hosted, HTTPS
//! ```
//!
//! Supported parameters: `priority`, `click`.

use async_trait::async_trait;
use reqwest::Client;

use super::http::read_response;
use super::traits::{Provider, ProviderError};
use super::types::{Delivery, Message, SendContext};
use crate::uri::ParsedDestination;

const DEFAULT_SERVER: &str = "https://ntfy.sh";

pub struct NtfyProvider {
    client: Client,
    default_server: String,
}

impl NtfyProvider {
    pub fn new(client: Client) -> Self {
        Self::with_default_server(client, DEFAULT_SERVER)
    }

    /// Server used for bare `ntfy://topic` destinations
    pub fn with_default_server(client: Client, server: impl Into<String>) -> Self {
        Self {
            client,
            default_server: server.into().trim_end_matches('/').to_string(),
        }
    }

    /// Publish URL; a destination without segments names a topic on the default server
    fn endpoint(&self, parsed: &ParsedDestination) -> Result<String, ProviderError> {
        let host = parsed.require_host("topic")?;

        match parsed.segments.first() {
            None => Ok(format!("{}/{}", self.default_server, host)),
            Some(topic) => {
                let protocol = if parsed.scheme == "ntfys" { "https" } else { "http" };
                let port = parsed.port.map(|port| format!(":{port}")).unwrap_or_default();
                Ok(format!("{protocol}://{host}{port}/{topic}"))
            }
        }
    }
}

#[async_trait]
impl Provider for NtfyProvider {
    fn id(&self) -> &str {
        "ntfy"
    }

    fn schemas(&self) -> Vec<&str> {
        vec!["ntfy", "ntfys"]
    }

    async fn send(
        &self,
        message: &Message,
        ctx: SendContext<'_>,
    ) -> Result<Delivery, ProviderError> {
        let parsed = ctx.parsed;
        let endpoint = self.endpoint(parsed)?;

        let mut request = self.client.post(&endpoint).body(message.body.clone());
        if let Some(title) = &message.title {
            request = request.header("Title", title);
        }
        if !message.tags.is_empty() {
            let tags: Vec<&str> = message.tags.iter().map(String::as_str).collect();
            request = request.header("Tags", tags.join(","));
        }
        if let Some(priority) = parsed.param("priority") {
            request = request.header("Priority", priority);
        }
        if let Some(click) = parsed.param("click") {
            request = request.header("Click", click);
        }
        if let Some(attachment) = message.attachments.iter().find_map(|a| a.url()) {
            request = request.header("Attach", attachment);
        }
        if let Some(username) = &parsed.username {
            request = request.basic_auth(username, parsed.password.as_deref());
        }

        let response = request.send().await?;
        Ok(Delivery {
            raw: read_response(response).await?,
        })
    }
}

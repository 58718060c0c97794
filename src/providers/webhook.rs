//! Generic JSON webhook provider.
//!
//! `json://` posts over HTTP, `jsons://` over HTTPS:
//!
//! ```text
//! json://[user:pass@]host[:port]/path?method=PUT&+X-Header=value&-query=value
//! ```
//!
//! - `method` selects the HTTP method (default `POST`)
//! - `+name=value` parameters become request headers
//! - `-name=value` parameters are forwarded as query parameters
//! - credentials become HTTP basic auth

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::debug;

use super::http::read_response;
use super::traits::{Provider, ProviderError};
use super::types::{AttachmentSource, Delivery, Message, SendContext};

const SCHEMAS: &[&str] = &["json", "jsons"];

/// Generic JSON webhook provider.
pub struct WebhookProvider {
    client: Client,
}

impl WebhookProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn build_payload(message: &Message) -> Value {
        let attachments: Vec<Value> = message
            .attachments
            .iter()
            .map(|attachment| {
                let mut entry = json!({
                    "name": attachment.name,
                    "content_type": attachment.content_type,
                });
                match &attachment.source {
                    AttachmentSource::Url(url) => entry["url"] = json!(url),
                    AttachmentSource::Path(path) => entry["path"] = json!(path.display().to_string()),
                    AttachmentSource::Bytes(data) => entry["size"] = json!(data.len()),
                }
                entry
            })
            .collect();

        json!({
            "title": message.title,
            "body": message.body,
            "tags": message.tags,
            "metadata": message.metadata,
            "attachments": attachments,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }
}

#[async_trait]
impl Provider for WebhookProvider {
    fn id(&self) -> &str {
        "webhook"
    }

    fn schemas(&self) -> Vec<&str> {
        SCHEMAS.to_vec()
    }

    async fn send(
        &self,
        message: &Message,
        ctx: SendContext<'_>,
    ) -> Result<Delivery, ProviderError> {
        let parsed = ctx.parsed;
        let host = parsed.require_host("webhook host")?;
        let protocol = if parsed.scheme == "jsons" { "https" } else { "http" };

        let mut endpoint = format!("{protocol}://{host}");
        if let Some(port) = parsed.port {
            endpoint.push_str(&format!(":{port}"));
        }
        endpoint.push_str(parsed.path.as_deref().unwrap_or("/"));

        let method = match parsed.param("method") {
            Some(method) => Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| ProviderError::InvalidDestination(format!("unknown method '{method}'")))?,
            None => Method::POST,
        };

        let mut request = self
            .client
            .request(method, &endpoint)
            .json(&Self::build_payload(message));

        let mut query = Vec::new();
        for (key, value) in &parsed.params {
            if let Some(header) = key.strip_prefix('+') {
                request = request.header(header, value.first());
            } else if let Some(name) = key.strip_prefix('-') {
                for value in value.values() {
                    query.push((name.to_string(), value.to_string()));
                }
            }
        }
        if !query.is_empty() {
            request = request.query(&query);
        }

        if let Some(username) = &parsed.username {
            request = request.basic_auth(username, parsed.password.as_deref());
        }

        debug!(%endpoint, "Posting webhook");
        let response = request.send().await?;
        let raw = read_response(response).await?;

        Ok(Delivery { raw })
    }
}

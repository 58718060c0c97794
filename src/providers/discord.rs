//! Discord webhook provider.
//!
//! ```text
//! discord://webhook_id/webhook_token?username=bot&avatar_url=https://...
//! ```
//!
//! Webhook ids are purely numeric, so these destinations always go through the
//! manual decomposition path.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::http::read_response;
use super::traits::{Provider, ProviderError};
use super::types::{Delivery, Message, SendContext};
use crate::uri::{self, ParseError, ParsedDestination};

const DEFAULT_API_BASE: &str = "https://discord.com";

/// Discord caps embed descriptions at 4096 characters
const MAX_DESCRIPTION_CHARS: usize = 4096;

pub struct DiscordProvider {
    client: Client,
    api_base: String,
}

impl DiscordProvider {
    pub fn new(client: Client) -> Self {
        Self::with_api_base(client, DEFAULT_API_BASE)
    }

    pub fn with_api_base(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn build_payload(message: &Message, parsed: &ParsedDestination) -> Value {
        let mut payload = match message.title.as_deref() {
            Some(title) => json!({
                "embeds": [{
                    "title": title,
                    "description": message.body.chars().take(MAX_DESCRIPTION_CHARS).collect::<String>(),
                }]
            }),
            None => json!({ "content": message.body }),
        };

        if let Some(username) = parsed.param("username") {
            payload["username"] = json!(username);
        }
        if let Some(avatar_url) = parsed.param("avatar_url") {
            payload["avatar_url"] = json!(avatar_url);
        }

        payload
    }
}

#[async_trait]
impl Provider for DiscordProvider {
    fn id(&self) -> &str {
        "discord"
    }

    fn schemas(&self) -> Vec<&str> {
        vec!["discord"]
    }

    /// Require both the webhook id (host) and token (first segment)
    fn decompose(&self, raw: &str) -> Result<ParsedDestination, ParseError> {
        let parsed = uri::decompose(raw)?;
        parsed.require_host("webhook id")?;
        if parsed.segments.is_empty() {
            return Err(ParseError::invalid(&parsed.raw, "missing webhook token"));
        }
        Ok(parsed)
    }

    async fn send(
        &self,
        message: &Message,
        ctx: SendContext<'_>,
    ) -> Result<Delivery, ProviderError> {
        let parsed = ctx.parsed;
        let webhook_id = parsed.require_host("webhook id")?;
        let token = parsed
            .segments
            .first()
            .ok_or_else(|| ProviderError::InvalidDestination("missing webhook token".to_string()))?;

        let endpoint = format!("{}/api/webhooks/{}/{}", self.api_base, webhook_id, token);
        let response = self
            .client
            .post(&endpoint)
            .json(&Self::build_payload(message, parsed))
            .send()
            .await?;

        Ok(Delivery {
            raw: read_response(response).await?,
        })
    }
}

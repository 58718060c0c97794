//! Telegram Bot API provider.
//!
//! ```text
//! tgram://bot_token/chat_id[/chat_id...]?format=html
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::warn;

use super::http::read_response;
use super::traits::{Provider, ProviderError};
use super::types::{Delivery, Message, SendContext};
use crate::uri::{self, ParseError, ParsedDestination};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramProvider {
    client: Client,
    api_base: String,
}

impl TelegramProvider {
    pub fn new(client: Client) -> Self {
        Self::with_api_base(client, DEFAULT_API_BASE)
    }

    pub fn with_api_base(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn parse_mode(parsed: &ParsedDestination) -> Option<&'static str> {
        match parsed.param("format")?.to_ascii_lowercase().as_str() {
            "html" => Some("HTML"),
            "markdown" | "md" => Some("MarkdownV2"),
            _ => None,
        }
    }

    async fn send_to_chat(
        &self,
        endpoint: &str,
        chat_id: &str,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<Option<Value>, ProviderError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            payload["parse_mode"] = json!(mode);
        }

        let response = self.client.post(endpoint).json(&payload).send().await?;
        read_response(response).await
    }
}

#[async_trait]
impl Provider for TelegramProvider {
    fn id(&self) -> &str {
        "telegram"
    }

    fn schemas(&self) -> Vec<&str> {
        vec!["tgram", "telegram"]
    }

    fn decompose(&self, raw: &str) -> Result<ParsedDestination, ParseError> {
        let parsed = uri::decompose(raw)?;
        parsed.require_host("bot token")?;
        if parsed.segments.is_empty() {
            return Err(ParseError::invalid(&parsed.raw, "missing chat id"));
        }
        Ok(parsed)
    }

    /// Deliver to every chat; the send fails if any chat rejects it
    async fn send(
        &self,
        message: &Message,
        ctx: SendContext<'_>,
    ) -> Result<Delivery, ProviderError> {
        let parsed = ctx.parsed;
        let token = parsed.require_host("bot token")?;
        let endpoint = format!("{}/bot{}/sendMessage", self.api_base, token);
        let text = message.text();
        let parse_mode = Self::parse_mode(parsed);

        let mut responses = Vec::with_capacity(parsed.segments.len());
        let mut first_error = None;
        for chat_id in &parsed.segments {
            match self.send_to_chat(&endpoint, chat_id, &text, parse_mode).await {
                Ok(raw) => responses.push(raw.unwrap_or(Value::Null)),
                Err(e) => {
                    warn!(chat_id, error = %e, "Telegram chat rejected message");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(Delivery::with_raw(Value::Array(responses))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_decompose_requires_chat() {
        let provider = TelegramProvider::new(Client::new());
        let parsed = provider.decompose("tgram://123456:ABC-def/-100/200").unwrap();
        assert_eq!(parsed.hostname.as_deref(), Some("123456:ABC-def"));
        assert_eq!(parsed.segments, vec!["-100", "200"]);

        assert!(provider.decompose("tgram://123456:ABC-def").is_err());
    }

    #[test]
    fn test_parse_mode() {
        let parsed = uri::decompose("tgram://t/1?format=HTML").unwrap();
        assert_eq!(TelegramProvider::parse_mode(&parsed), Some("HTML"));
        let parsed = uri::decompose("tgram://t/1").unwrap();
        assert_eq!(TelegramProvider::parse_mode(&parsed), None);
    }

    #[tokio::test]
    async fn test_telegram_send_each_chat() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::PartialJson(json!({"chat_id": "1", "text": "T\nhi"})))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::PartialJson(json!({"chat_id": "2"})))
            .with_status(400)
            .with_body(r#"{"ok":false}"#)
            .create_async()
            .await;

        let provider = TelegramProvider::with_api_base(Client::new(), server.url());
        let url = "tgram://123:abc/1/2";
        let parsed = provider.decompose(url).unwrap();
        let ctx = SendContext {
            url,
            parsed: &parsed,
            tags: None,
        };

        let err = provider
            .send(&Message::new("hi").with_title("T"), ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { status: 400, .. }));
        first.assert_async().await;
        second.assert_async().await;
    }
}

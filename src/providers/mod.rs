//! Delivery providers
//!
//! A provider owns one or more destination schemes and knows how to turn a
//! [`Message`] into a request for one vendor API.
//!
//! ## Key Components
//!
//! - [`Provider`] - Contract every delivery adapter implements
//! - [`ProviderRegistry`] - Scheme to provider lookup, last registration wins
//! - [`builtin_providers`] - Factory for the adapters shipped with the crate
//!
//! ## Example
//!
//! ```rust,ignore
//! use notifybox::providers::{HttpConfig, ProviderRegistry};
//!
//! let registry = ProviderRegistry::with_builtins(&HttpConfig::default())?;
//! let provider = registry.resolve("discord").expect("built in");
//! let parsed = provider.decompose("discord://1234/token")?;
//! ```

mod discord;
mod http;
mod ntfy;
mod registry;
mod telegram;
mod traits;
mod types;
mod webhook;

pub use discord::DiscordProvider;
pub use http::HttpConfig;
pub use ntfy::NtfyProvider;
pub use registry::ProviderRegistry;
pub use telegram::TelegramProvider;
pub use traits::{Provider, ProviderError};
pub use types::{Attachment, AttachmentSource, Delivery, Message, SendContext};
pub use webhook::WebhookProvider;

use std::sync::Arc;

/// Fresh instances of every built-in provider, sharing one HTTP client
pub fn builtin_providers(http: &HttpConfig) -> Result<Vec<Arc<dyn Provider>>, reqwest::Error> {
    let client = http.build_client()?;

    Ok(vec![
        Arc::new(WebhookProvider::new(client.clone())),
        Arc::new(DiscordProvider::new(client.clone())),
        Arc::new(TelegramProvider::new(client.clone())),
        Arc::new(NtfyProvider::new(client)),
    ])
}

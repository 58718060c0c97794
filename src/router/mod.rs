//! Notification router
//!
//! The [`Router`] owns a provider registry and an ordered destination store.
//! Each [`Router::send`] call walks the selected destinations one at a time,
//! in insertion order:
//!
//! 1. select destinations by tag ([`filter::select`])
//! 2. substitute `{placeholders}` ([`template::substitute`])
//! 3. resolve the provider from the scheme
//! 4. let the provider decompose the URL, then send
//!
//! Every selected destination yields exactly one [`DispatchResult`]. Nothing a
//! destination does (bad placeholder, unknown scheme, provider error, provider
//! panic) aborts the batch. Failures are handed to the optional fallback
//! handler before the next destination is attempted.
//!
//! ## Example
//!
//! ```rust,ignore
//! use notifybox::router::{Router, RouterOptions, SendOptions};
//! use notifybox::providers::Message;
//!
//! let router = Router::new(
//!     RouterOptions::new().tagged_url("ntfy://ops-alerts", ["ops"]),
//! )?;
//! let results = router
//!     .send(&Message::new("disk full"), &SendOptions::new().tags(["ops"]))
//!     .await;
//! ```

pub mod fallback;
pub mod filter;
mod options;
mod result;
mod store;
pub mod template;

pub use fallback::{BoxError, ErrorCallback, ErrorContext, FallbackOptions, MessageFormatter};
pub use options::{RouterOptions, SendOptions};
pub use result::{DispatchReport, DispatchResult, UNKNOWN_PROVIDER};
pub use store::{DestinationEntry, DestinationStore};
pub use template::PlaceholderError;

use futures::FutureExt;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::{self, ConfigError};
use crate::error::{DispatchError, panic_message};
use crate::observability::{DispatchStats, StatsSnapshot};
use crate::providers::{Message, Provider, ProviderRegistry, SendContext};
use crate::uri::{self, ParseError};

/// Fan-out router; see the module docs for the dispatch sequence
pub struct Router {
    registry: ProviderRegistry,
    store: DestinationStore,
    fallback: Option<FallbackOptions>,
    stats: DispatchStats,
}

impl Router {
    /// Build a router from options plus configuration files and environment
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a configuration source is missing or
    /// malformed, or the built-in providers' HTTP client cannot be created.
    pub fn new(options: RouterOptions) -> Result<Self, ConfigError> {
        let RouterOptions {
            urls,
            providers,
            config_paths,
            skip_builtins,
            skip_env,
            http,
            on_error,
        } = options;

        let mut registry = if skip_builtins {
            ProviderRegistry::new()
        } else {
            ProviderRegistry::with_builtins(&http).map_err(ConfigError::HttpClient)?
        };
        for provider in providers {
            registry.register(provider);
        }

        let loaded = if skip_env {
            config::load_from_paths(&config_paths)?
        } else {
            config::load(&config_paths)?
        };

        let mut store = DestinationStore::new();
        store.extend(urls);
        store.extend(loaded.entries);

        let fallback = on_error.or_else(|| {
            (!loaded.fallback_tags.is_empty())
                .then(|| FallbackOptions::new().fallback_tags(loaded.fallback_tags))
        });

        info!(
            destinations = store.len(),
            schemes = registry.len(),
            fallback = fallback.is_some(),
            "Router ready"
        );

        Ok(Self {
            registry,
            store,
            fallback,
            stats: DispatchStats::new(),
        })
    }

    /// Append a destination
    pub fn add<I, S>(&mut self, url: impl Into<String>, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.push(DestinationEntry::new(url, tags));
    }

    /// Register a provider, taking over its schemes
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.registry.register(provider);
    }

    pub fn destinations(&self) -> &[DestinationEntry] {
        self.store.entries()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn fallback(&self) -> Option<&FallbackOptions> {
        self.fallback.as_ref()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Send `message` to every destination selected by `options.tags`
    ///
    /// Returns one result per selected destination, in store order. An empty
    /// selection returns an empty vector.
    pub async fn send(&self, message: &Message, options: &SendOptions) -> Vec<DispatchResult> {
        let span = info_span!("send", batch = %Uuid::new_v4());
        self.send_batch(message, options).instrument(span).await
    }

    async fn send_batch(&self, message: &Message, options: &SendOptions) -> Vec<DispatchResult> {
        let tags = options.tags.as_deref();
        let urls = filter::select(self.store.entries(), tags);
        if urls.is_empty() {
            debug!(?tags, "No destinations selected");
            return Vec::new();
        }

        if let Err(reason) = message.validate() {
            warn!(%reason, destinations = urls.len(), "Rejecting invalid message");
            return urls
                .into_iter()
                .map(|url| {
                    self.stats.attempted();
                    self.stats.failed();
                    let provider_id = self.provider_id_for(&url);
                    DispatchResult::failed(provider_id, url, DispatchError::InvalidMessage(reason.clone()))
                })
                .collect();
        }

        info!(destinations = urls.len(), "Dispatching");

        let mut results = Vec::with_capacity(urls.len());
        for url in &urls {
            self.stats.attempted();
            let result = self.attempt(url, message, &options.params, tags).await;

            if result.success {
                self.stats.succeeded();
            } else {
                self.stats.failed();
                if let (Some(fallback), Some(error)) = (&self.fallback, &result.error) {
                    let context = ErrorContext {
                        provider_id: result.provider_id.clone(),
                        url: result.url.clone(),
                        message: message.clone(),
                        tags: options.tags.clone(),
                    };
                    self.handle_failure(fallback, error, &context, &options.params)
                        .await;
                }
            }

            results.push(result);
        }

        let failed = results.iter().filter(|result| !result.success).count();
        info!(total = results.len(), failed, "Dispatch complete");
        results
    }

    /// Run one destination through substitution, resolution, decomposition and send
    async fn attempt(
        &self,
        url: &str,
        message: &Message,
        params: &HashMap<String, String>,
        tags: Option<&[String]>,
    ) -> DispatchResult {
        let url = match template::substitute(url, params) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %uri::redact(url), error = %e, "Placeholder substitution failed");
                return DispatchResult::failed(UNKNOWN_PROVIDER, url, e.into());
            }
        };
        let redacted = uri::redact(&url);

        let Some(scheme) = uri::scheme_of(&url) else {
            warn!(url = %redacted, "Destination has no scheme");
            let error = if url.trim().is_empty() {
                ParseError::Empty
            } else {
                ParseError::MissingScheme {
                    raw: url.trim().to_string(),
                }
            };
            return DispatchResult::failed(UNKNOWN_PROVIDER, url, error.into());
        };

        let Some(provider) = self.registry.resolve(&scheme) else {
            warn!(url = %redacted, %scheme, "No provider registered for scheme");
            return DispatchResult::failed(
                UNKNOWN_PROVIDER,
                url,
                DispatchError::ProviderNotFound { scheme },
            );
        };
        let provider_id = provider.id().to_string();

        let parsed = match panic::catch_unwind(AssertUnwindSafe(|| provider.decompose(&url))) {
            Ok(Ok(parsed)) => parsed,
            Ok(Err(e)) => {
                warn!(url = %redacted, provider = %provider_id, error = %e, "Destination rejected");
                return DispatchResult::failed(provider_id, url, e.into());
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(url = %redacted, provider = %provider_id, panic = %reason, "Provider panicked while parsing");
                return DispatchResult::failed(
                    provider_id.clone(),
                    url,
                    DispatchError::Panicked {
                        provider_id,
                        message: reason,
                    },
                );
            }
        };

        let ctx = SendContext {
            url: &url,
            parsed: &parsed,
            tags,
        };
        let outcome = AssertUnwindSafe(provider.send(message, ctx))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(delivery)) => {
                debug!(url = %redacted, provider = %provider_id, "Delivered");
                DispatchResult::succeeded(provider_id, url, delivery.raw)
            }
            Ok(Err(e)) => {
                warn!(url = %redacted, provider = %provider_id, error = %e, "Delivery failed");
                DispatchResult::failed(provider_id, url, e.into())
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(url = %redacted, provider = %provider_id, panic = %reason, "Provider panicked while sending");
                DispatchResult::failed(
                    provider_id.clone(),
                    url,
                    DispatchError::Panicked {
                        provider_id,
                        message: reason,
                    },
                )
            }
        }
    }

    /// Notify the callback, then fan out once to the fallback audience
    ///
    /// Fallback deliveries go through [`attempt`](Self::attempt) directly and
    /// are never themselves handed back to this handler.
    async fn handle_failure(
        &self,
        fallback: &FallbackOptions,
        error: &DispatchError,
        context: &ErrorContext,
        params: &HashMap<String, String>,
    ) {
        if let Some(callback) = &fallback.callback {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(error, context))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Error callback failed"),
                Err(payload) => {
                    warn!(panic = %panic_message(payload.as_ref()), "Error callback panicked")
                }
            }
        }

        if fallback.tags.is_empty() {
            return;
        }

        let tags = fallback::safe_tags(&fallback.tags, context.tags.as_deref());
        if tags.is_empty() {
            debug!(
                provider = %context.provider_id,
                "Fallback suppressed, every fallback tag was part of the failed send"
            );
            return;
        }

        let message = match &fallback.formatter {
            Some(formatter) => {
                match panic::catch_unwind(AssertUnwindSafe(|| formatter(error, context))) {
                    Ok(message) => message,
                    Err(payload) => {
                        warn!(panic = %panic_message(payload.as_ref()), "Fallback formatter panicked");
                        return;
                    }
                }
            }
            None => fallback::default_message(error, context),
        };
        if let Err(reason) = message.validate() {
            warn!(%reason, "Fallback message rejected");
            return;
        }

        let urls = filter::select(self.store.entries(), Some(tags.as_slice()));
        if urls.is_empty() {
            debug!(?tags, "No fallback destinations");
            return;
        }

        info!(?tags, destinations = urls.len(), "Sending fallback notification");
        for url in &urls {
            let result = self.attempt(url, &message, params, Some(tags.as_slice())).await;
            if result.success {
                self.stats.fallback_sent();
            } else {
                self.stats.fallback_failed();
                error!(
                    url = %uri::redact(&result.url),
                    provider = %result.provider_id,
                    error = %result.error.as_ref().map(ToString::to_string).unwrap_or_default(),
                    "Fallback delivery failed"
                );
            }
        }
    }

    fn provider_id_for(&self, url: &str) -> String {
        uri::scheme_of(url)
            .and_then(|scheme| self.registry.resolve(&scheme))
            .map(|provider| provider.id().to_string())
            .unwrap_or_else(|| UNKNOWN_PROVIDER.to_string())
    }
}

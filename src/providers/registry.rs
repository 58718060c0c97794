use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::http::HttpConfig;
use super::traits::Provider;

/// Registry mapping lower-cased schemes to the provider that owns them
///
/// Registering a provider claims every scheme it declares; a later
/// registration for the same scheme replaces the earlier owner.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in providers
    pub fn with_builtins(http: &HttpConfig) -> Result<Self, reqwest::Error> {
        let mut registry = Self::new();
        for provider in super::builtin_providers(http)? {
            registry.register(provider);
        }
        Ok(registry)
    }

    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        for scheme in provider.schemas() {
            let scheme = scheme.to_ascii_lowercase();
            if let Some(previous) = self.providers.insert(scheme.clone(), provider.clone()) {
                debug!(
                    %scheme,
                    previous = previous.id(),
                    provider = provider.id(),
                    "Scheme owner replaced"
                );
            }
        }
    }

    pub fn resolve(&self, scheme: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(&scheme.to_ascii_lowercase()).cloned()
    }

    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.providers.contains_key(&scheme.to_ascii_lowercase())
    }

    pub fn schemes(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Provider ids with the schemes each one currently owns
    pub fn listing(&self) -> BTreeMap<String, Vec<String>> {
        let mut listing: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (scheme, provider) in &self.providers {
            listing
                .entry(provider.id().to_string())
                .or_default()
                .push(scheme.clone());
        }
        listing
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

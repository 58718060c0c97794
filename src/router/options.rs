use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::fallback::FallbackOptions;
use super::store::DestinationEntry;
use crate::providers::{HttpConfig, Provider};

/// Router construction options
#[derive(Clone, Default)]
pub struct RouterOptions {
    pub urls: Vec<DestinationEntry>,
    /// Registered after the built-ins, overriding them per scheme
    pub providers: Vec<Arc<dyn Provider>>,
    pub config_paths: Vec<PathBuf>,
    pub skip_builtins: bool,
    /// Ignore `NOTIFYBOX_*` variables, `.env` and the default config files
    pub skip_env: bool,
    pub http: HttpConfig,
    pub on_error: Option<FallbackOptions>,
}

impl RouterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(DestinationEntry::untagged(url));
        self
    }

    pub fn tagged_url<I, S>(mut self, url: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls.push(DestinationEntry::new(url, tags));
        self
    }

    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_paths.push(path.into());
        self
    }

    pub fn skip_builtins(mut self, skip: bool) -> Self {
        self.skip_builtins = skip;
        self
    }

    pub fn skip_env(mut self, skip: bool) -> Self {
        self.skip_env = skip;
        self
    }

    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn on_error(mut self, fallback: FallbackOptions) -> Self {
        self.on_error = Some(fallback);
        self
    }
}

impl fmt::Debug for RouterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let provider_ids: Vec<&str> = self.providers.iter().map(|p| p.id()).collect();
        f.debug_struct("RouterOptions")
            .field("urls", &self.urls)
            .field("providers", &provider_ids)
            .field("config_paths", &self.config_paths)
            .field("skip_builtins", &self.skip_builtins)
            .field("skip_env", &self.skip_env)
            .field("http", &self.http)
            .field("on_error", &self.on_error)
            .finish()
    }
}

/// Per-send options
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Audience filter; `None` or empty selects every destination
    pub tags: Option<Vec<String>>,
    /// Placeholder values
    pub params: HashMap<String, String>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

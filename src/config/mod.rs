//! Destination configuration for notifybox
//!
//! Destinations are collected from, in order:
//! 1. YAML or TOML files (explicit paths, then `NOTIFYBOX_CONFIG`)
//! 2. `notifybox.yml`, `notifybox.yaml` or `notifybox.toml` in the working
//!    directory, when no file was named
//! 3. `NOTIFYBOX_URLS`, a comma or whitespace separated URL list
//!
//! # Configuration File
//!
//! ```yaml
//! urls:
//!   - json://hooks.example.com/notify
//!   - url: ntfy://ops-alerts
//!     tags: ops, oncall
//! fallback:
//!   tags: [oncall]
//! ```
//!
//! `urls` may also be a map of tag to one URL or a list of URLs.

mod models;
mod sources;
mod validation;

pub use models::{
    FallbackSection, FileConfig, LoadedConfig, OneOrMany, TagList, UrlRecord, UrlsSection,
    split_list,
};
pub use sources::{load, load_from_paths, read_file};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load configuration from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

use thiserror::Error;

use crate::router::DestinationEntry;
use crate::uri;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{source_name}: destination '{url}' has no scheme")]
    MissingScheme { source_name: String, url: String },

    #[error("{source_name}: destination '{url}' has an empty tag")]
    EmptyTag { source_name: String, url: String },

    #[error("{source_name}: fallback tags must not be empty strings")]
    EmptyFallbackTag { source_name: String },
}

/// Every entry needs a `scheme://` prefix and only non-blank tags
pub fn validate_entries(
    source_name: &str,
    entries: &[DestinationEntry],
) -> Result<(), ValidationError> {
    for entry in entries {
        if uri::scheme_of(&entry.url).is_none() {
            return Err(ValidationError::MissingScheme {
                source_name: source_name.to_string(),
                url: uri::redact(&entry.url),
            });
        }

        if entry.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ValidationError::EmptyTag {
                source_name: source_name.to_string(),
                url: uri::redact(&entry.url),
            });
        }
    }

    Ok(())
}

pub fn validate_fallback_tags(source_name: &str, tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|tag| tag.trim().is_empty()) {
        return Err(ValidationError::EmptyFallbackTag {
            source_name: source_name.to_string(),
        });
    }
    Ok(())
}

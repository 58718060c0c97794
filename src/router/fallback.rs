//! Failure notification and one-level fallback fan-out
//!
//! When a destination fails, an optional callback is told about it and an
//! optional fallback message is sent to a secondary audience. The fallback
//! audience excludes the tags of the send that just failed, and fallback
//! deliveries never trigger the handler again.
//!
//! This only breaks the direct cycle (a tag's own channel failing and
//! re-notifying itself). Two tags routing to the same broken provider can
//! still produce one extra failed fallback per failure.

use std::fmt;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::providers::Message;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Called for every failed destination; errors and panics are logged, never propagated
pub type ErrorCallback =
    Arc<dyn Fn(&DispatchError, &ErrorContext) -> Result<(), BoxError> + Send + Sync>;

/// Builds the fallback message for a failure
pub type MessageFormatter = Arc<dyn Fn(&DispatchError, &ErrorContext) -> Message + Send + Sync>;

/// What was being sent when a destination failed
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub provider_id: String,
    /// Destination after placeholder substitution
    pub url: String,
    pub message: Message,
    /// Filter tags of the send that failed
    pub tags: Option<Vec<String>>,
}

/// Failure handling configuration
#[derive(Clone, Default)]
pub struct FallbackOptions {
    pub tags: Vec<String>,
    pub formatter: Option<MessageFormatter>,
    pub callback: Option<ErrorCallback>,
}

impl FallbackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fallback_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&DispatchError, &ErrorContext) -> Message + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DispatchError, &ErrorContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for FallbackOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackOptions")
            .field("tags", &self.tags)
            .field("formatter", &self.formatter.is_some())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Fallback tags minus the tags of the failed send (exact match), deduplicated
pub fn safe_tags(fallback: &[String], failed: Option<&[String]>) -> Vec<String> {
    let failed = failed.unwrap_or_default();
    let mut safe: Vec<String> = Vec::with_capacity(fallback.len());

    for tag in fallback {
        if !failed.contains(tag) && !safe.contains(tag) {
            safe.push(tag.clone());
        }
    }

    safe
}

pub fn default_message(error: &DispatchError, context: &ErrorContext) -> Message {
    Message::new(format!(
        "Notification failed: [{}] {}",
        context.provider_id, error
    ))
}

use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::uri::ParsedDestination;

/// Notification payload handed to every provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub title: Option<String>,
    pub body: String,
    pub attachments: Vec<Attachment>,
    /// Informational only; destination selection uses destination tags
    pub tags: BTreeSet<String>,
    pub metadata: Map<String, Value>,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Reject messages that carry nothing to deliver
    pub fn validate(&self) -> Result<(), String> {
        if self.body.trim().is_empty() {
            return Err("message body must not be empty".to_string());
        }
        Ok(())
    }

    /// Title and body joined for providers with a single text field
    pub fn text(&self) -> String {
        match self.title.as_deref().filter(|title| !title.trim().is_empty()) {
            Some(title) => format!("{}\n{}", title, self.body),
            None => self.body.clone(),
        }
    }
}

/// File attached to a message
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub content_type: Option<String>,
    pub source: AttachmentSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentSource {
    Url(String),
    Path(PathBuf),
    Bytes(Bytes),
}

impl Attachment {
    pub fn from_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            source: AttachmentSource::Url(url.into()),
        }
    }

    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            source: AttachmentSource::Bytes(data.into()),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Remote location, when the attachment is referenced rather than embedded
    pub fn url(&self) -> Option<&str> {
        match &self.source {
            AttachmentSource::Url(url) => Some(url),
            _ => None,
        }
    }
}

/// Per-destination context passed to [`Provider::send`](super::Provider::send)
#[derive(Debug, Clone, Copy)]
pub struct SendContext<'a> {
    /// Destination after placeholder substitution
    pub url: &'a str,
    pub parsed: &'a ParsedDestination,
    /// Filter tags of the send that selected this destination
    pub tags: Option<&'a [String]>,
}

/// Successful provider outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delivery {
    /// Opaque provider response kept for diagnostics
    pub raw: Option<Value>,
}

impl Delivery {
    pub fn with_raw(raw: Value) -> Self {
        Self { raw: Some(raw) }
    }
}

//! Destination URI decomposition
//!
//! Destinations are self-describing strings of the form
//! `scheme://[user[:pass]@]host[:port]/[path][?query]`. Provider schemes are
//! arbitrary and their hosts are frequently not hosts at all (webhook ids,
//! bot tokens, topic names), so decomposition runs in two stages:
//!
//! 1. Strict: the custom scheme is swapped for `https` and the string is run
//!    through [`url::Url`]. The result is accepted only if the parsed host
//!    matches the host as written (numeric hosts, for example, are rewritten
//!    to IPv4 addresses by a strict parser and are rejected here).
//! 2. Manual: the authority is split on `@`, `:` and the last `:` by hand.
//!
//! Path segments and query parameters are always derived from the raw text by
//! the same helpers, so both stages agree on them byte for byte.

mod components;

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

use components::{Authority, Target};

/// Scheme substituted for the provider scheme during strict parsing
const CANONICAL_SCHEME: &str = "https";

static SCHEME_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*)://").expect("scheme pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("destination is empty")]
    Empty,

    #[error("destination '{raw}' has no scheme:// prefix")]
    MissingScheme { raw: String },

    #[error("invalid destination '{raw}': {reason}")]
    Invalid { raw: String, reason: String },
}

impl ParseError {
    /// Provider-specific rejection of an otherwise well-formed destination
    pub fn invalid(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::Invalid {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// Query parameter value; repeated keys collapse into `Multiple` in first-seen order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ParamValue {
    /// First value seen for the key
    pub fn first(&self) -> &str {
        match self {
            ParamValue::Single(value) => value,
            ParamValue::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::Single(value) => vec![value.as_str()],
            ParamValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            ParamValue::Single(first) => {
                let first = std::mem::take(first);
                *self = ParamValue::Multiple(vec![first, value]);
            }
            ParamValue::Multiple(values) => values.push(value),
        }
    }
}

/// Provider-agnostic view of a destination string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDestination {
    /// Always lower-case
    pub scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Raw path with trailing slashes removed; `None` when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Non-empty, percent-decoded path components
    pub segments: Vec<String>,
    pub params: BTreeMap<String, ParamValue>,
    /// The trimmed input
    pub raw: String,
}

impl ParsedDestination {
    /// First value of a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(ParamValue::first)
    }

    /// All values of a query parameter, empty when absent
    pub fn param_values(&self, key: &str) -> Vec<&str> {
        self.params.get(key).map(ParamValue::values).unwrap_or_default()
    }

    /// Hostname, or a provider-facing parse error naming what the host means
    pub fn require_host(&self, what: &str) -> Result<&str, ParseError> {
        self.hostname
            .as_deref()
            .ok_or_else(|| ParseError::invalid(&self.raw, format!("missing {what}")))
    }
}

/// Extract the lower-cased scheme of a destination, if it has one
pub fn scheme_of(raw: &str) -> Option<String> {
    SCHEME_PREFIX
        .captures(raw.trim())
        .and_then(|captures| captures.get(1))
        .map(|scheme| scheme.as_str().to_ascii_lowercase())
}

/// Mask the password of a destination for logging (`user:***@host`)
pub fn redact(raw: &str) -> String {
    let raw = raw.trim();
    let Some(prefix) = SCHEME_PREFIX.find(raw) else {
        return raw.to_string();
    };
    let rest = &raw[prefix.end()..];
    let authority = Target::split(rest).authority;

    match authority.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split_once(':').map_or(credentials, |(user, _)| user);
            let masked = if credentials.contains(':') {
                format!("{user}:***@{host}")
            } else {
                format!("{user}@{host}")
            };
            format!("{}{}{}", prefix.as_str(), masked, &rest[authority.len()..])
        }
        None => raw.to_string(),
    }
}

/// Decompose a destination string into a [`ParsedDestination`]
pub fn decompose(raw: &str) -> Result<ParsedDestination, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let prefix = SCHEME_PREFIX
        .captures(raw)
        .ok_or_else(|| ParseError::MissingScheme {
            raw: raw.to_string(),
        })?;
    let scheme = prefix[1].to_ascii_lowercase();
    let rest = &raw[prefix[0].len()..];

    let target = Target::split(rest);
    let manual = Authority::split(target.authority);
    let authority = match strict_authority(rest, &manual) {
        Some(authority) => authority,
        None => {
            tracing::trace!(raw, "strict parse rejected destination, using manual split");
            manual
        }
    };

    Ok(ParsedDestination {
        scheme,
        hostname: authority.host,
        port: authority.port,
        username: authority.username,
        password: authority.password,
        path: components::normalize_path(target.path),
        segments: components::split_segments(target.path),
        params: components::parse_query(target.query),
        raw: raw.to_string(),
    })
}

/// Run the strict parser and accept it only when the host survives unchanged
///
/// The host keeps the casing it was written with; tokens and topic names
/// carried in the host position are case-sensitive.
fn strict_authority(rest: &str, written: &Authority) -> Option<Authority> {
    let url = Url::parse(&format!("{CANONICAL_SCHEME}://{rest}")).ok()?;
    let written_host = written.host.as_deref()?;
    let parsed_host = url.host_str()?;
    if !parsed_host.eq_ignore_ascii_case(written_host) {
        return None;
    }

    Some(Authority {
        username: components::non_empty(components::decode(url.username())),
        password: url
            .password()
            .map(components::decode)
            .and_then(components::non_empty),
        host: Some(written_host.to_string()),
        // `Url::port` hides the scheme default (443), which may have been written explicitly
        port: url.port().or(written.port),
    })
}

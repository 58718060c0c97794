//! Text-level helpers shared by the strict and manual decomposition paths

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::ParamValue;

/// Everything after `scheme://`, split into its three textual parts
///
/// Fragments are dropped.
pub(super) struct Target<'a> {
    pub authority: &'a str,
    pub path: &'a str,
    pub query: &'a str,
}

impl<'a> Target<'a> {
    pub fn split(rest: &'a str) -> Self {
        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (before_query, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (authority, path) = match before_query.find('/') {
            Some(idx) => before_query.split_at(idx),
            None => (before_query, ""),
        };

        Self {
            authority,
            path,
            query,
        }
    }
}

/// Credentials, host and port of a destination
#[derive(Debug, Default)]
pub(super) struct Authority {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Authority {
    /// Split an authority by hand: credentials end at the last `@`, the user
    /// ends at the first `:` of the credentials, and a trailing `:digits` on
    /// the host is the port.
    pub fn split(authority: &str) -> Self {
        let (credentials, host_port) = match authority.rsplit_once('@') {
            Some((credentials, host_port)) => (Some(credentials), host_port),
            None => (None, authority),
        };

        let (username, password) = match credentials {
            Some(credentials) => match credentials.split_once(':') {
                Some((user, pass)) => (non_empty(decode(user)), non_empty(decode(pass))),
                None => (non_empty(decode(credentials)), None),
            },
            None => (None, None),
        };

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) if is_port(port) => match port.parse::<u16>() {
                Ok(port) => (host, Some(port)),
                Err(_) => (host_port, None),
            },
            _ => (host_port, None),
        };

        Self {
            username,
            password,
            host: non_empty(host.to_string()),
            port,
        }
    }
}

fn is_port(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Collapse a query string into parameters; repeated keys become ordered lists
///
/// Only percent escapes are decoded, `+` is kept literally.
pub(super) fn parse_query(query: &str) -> BTreeMap<String, ParamValue> {
    let mut params = BTreeMap::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(key);
        if key.is_empty() {
            continue;
        }

        let value = decode(value);
        match params.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(ParamValue::Single(value));
            }
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
        }
    }

    params
}

pub(super) fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(decode)
        .collect()
}

pub(super) fn normalize_path(path: &str) -> Option<String> {
    non_empty(path.trim_end_matches('/').to_string())
}

/// Percent-decode, keeping the input as-is when it is not valid UTF-8 once decoded
pub(super) fn decode(text: &str) -> String {
    urlencoding::decode(text)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| text.to_string())
}

pub(super) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

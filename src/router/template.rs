use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    #[error("no value for placeholder '{key}' in '{url}'")]
    Missing { key: String, url: String },
}

/// Replace `{name}` tokens with percent-encoded values from `params`
///
/// Values are inserted once and never rescanned, so a value containing
/// `{...}` ends up encoded rather than substituted.
pub fn substitute(url: &str, params: &HashMap<String, String>) -> Result<String, PlaceholderError> {
    let mut output = String::with_capacity(url.len());
    let mut last = 0;

    for captures in PLACEHOLDER.captures_iter(url) {
        let (Some(token), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let value = params
            .get(name.as_str())
            .ok_or_else(|| PlaceholderError::Missing {
                key: name.as_str().to_string(),
                url: url.to_string(),
            })?;

        output.push_str(&url[last..token.start()]);
        output.push_str(&urlencoding::encode(value));
        last = token.end();
    }

    output.push_str(&url[last..]);
    Ok(output)
}

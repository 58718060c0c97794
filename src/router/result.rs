use serde::Serialize;
use serde_json::Value;

use crate::error::DispatchError;

/// Provider id reported when a destination fails before a provider is resolved
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// Outcome of one attempted destination
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub success: bool,
    pub provider_id: String,
    /// Destination after placeholder substitution (as configured if substitution failed)
    pub url: String,
    /// Opaque provider response for diagnostics
    pub raw: Option<Value>,
    pub error: Option<DispatchError>,
}

impl DispatchResult {
    pub fn succeeded(provider_id: impl Into<String>, url: impl Into<String>, raw: Option<Value>) -> Self {
        Self {
            success: true,
            provider_id: provider_id.into(),
            url: url.into(),
            raw,
            error: None,
        }
    }

    pub fn failed(provider_id: impl Into<String>, url: impl Into<String>, error: DispatchError) -> Self {
        Self {
            success: false,
            provider_id: provider_id.into(),
            url: url.into(),
            raw: None,
            error: Some(error),
        }
    }

    /// Serializable summary with the destination password masked
    pub fn report(&self) -> DispatchReport {
        DispatchReport {
            success: self.success,
            provider_id: self.provider_id.clone(),
            url: crate::uri::redact(&self.url),
            error: self.error.as_ref().map(ToString::to_string),
            error_code: self.error.as_ref().map(DispatchError::code),
            raw: self.raw.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub success: bool,
    pub provider_id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_redacts_and_flattens_error() {
        let result = DispatchResult::failed(
            UNKNOWN_PROVIDER,
            "x://u:secret@host",
            DispatchError::ProviderNotFound {
                scheme: "x".to_string(),
            },
        );

        let report = serde_json::to_value(result.report()).unwrap();
        assert_eq!(report["success"], false);
        assert_eq!(report["url"], "x://u:***@host");
        assert_eq!(report["error_code"], "PROVIDER_NOT_FOUND");
        assert!(report.get("raw").is_none());
    }
}

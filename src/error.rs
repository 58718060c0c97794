use thiserror::Error;

use crate::providers::ProviderError;
use crate::router::PlaceholderError;
use crate::uri::ParseError;

/// Why a single destination failed; carried inside its `DispatchResult`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("no provider registered for scheme '{scheme}'")]
    ProviderNotFound { scheme: String },
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("placeholder error: {0}")]
    Placeholder(#[from] PlaceholderError),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("provider '{provider_id}' panicked: {message}")]
    Panicked {
        provider_id: String,
        message: String,
    },
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::Parse(_) => "PARSE_ERROR",
            DispatchError::ProviderNotFound { .. } => "PROVIDER_NOT_FOUND",
            DispatchError::Provider(_) => "PROVIDER_ERROR",
            DispatchError::Placeholder(_) => "PLACEHOLDER_MISSING",
            DispatchError::InvalidMessage(_) => "INVALID_MESSAGE",
            DispatchError::Panicked { .. } => "PROVIDER_PANICKED",
        }
    }
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

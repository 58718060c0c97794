pub mod config;
pub mod error;
pub mod observability;
pub mod providers;
pub mod router;
pub mod uri;

pub use error::DispatchError;
pub use providers::{Message, Provider, ProviderError};
pub use router::{DispatchResult, FallbackOptions, Router, RouterOptions, SendOptions};

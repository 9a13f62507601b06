//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use dns_register_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// A zone references a provider that is not registered
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// A zone was requested that is not managed by this engine
    #[error("Zone not managed: {0}")]
    ZoneNotManaged(String),

    /// A zone cannot be managed with its provider (fatal for that zone at setup)
    #[error("Zone '{zone}' rejected: {reason}")]
    Setup { zone: String, reason: String },

    /// The zone snapshot could not be fetched (fatal for that zone for one pass)
    #[error("Zone '{zone}': fetching records failed: {source}")]
    Fetch {
        zone: String,
        source: ProviderError,
    },

    /// A single provider write failed
    #[error("Zone '{zone}': writing {record} failed: {source}")]
    Write {
        zone: String,
        record: String,
        source: ProviderError,
    },

    /// Declared configuration could not be loaded
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The pass was cancelled while a provider call was pending
    #[error("Operation cancelled")]
    Cancelled,

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (bad configuration, missing resources, etc.),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ProviderNotFound(_)
            | Self::ZoneNotManaged(_)
            | Self::Setup { .. }
            | Self::ConfigError(_)
            | Self::Cancelled => true,
            Self::Fetch { source, .. } | Self::Write { source, .. } => source.is_expected(),
            Self::Provider(e) => e.is_expected(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

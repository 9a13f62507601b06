//! Provider factory functions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::providers::{MemoryProvider, MemoryProviderConfig};
use crate::traits::DnsProvider;

/// Type-safe configuration container for all built-in providers.
///
/// Serialized as a tagged enum with `"provider"` as the tag and `"config"` as the content:
///
/// ```json
/// { "provider": "memory", "config": { "zones": { "example.com": [] } } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "config")]
pub enum ProviderConfig {
    /// In-memory zone store.
    #[serde(rename = "memory")]
    Memory(MemoryProviderConfig),
}

impl ProviderConfig {
    /// Parses a provider configuration from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ProviderError::InvalidParameter {
            provider: "factory".to_string(),
            param: "provider".to_string(),
            detail: e.to_string(),
        })
    }
}

/// Creates a [`DnsProvider`] instance from the given configuration.
///
/// The returned provider is wrapped in `Arc<dyn DnsProvider>` for easy sharing
/// across async tasks.
///
/// # Examples
///
/// ```rust
/// use dns_register_provider::{create_provider, DnsProvider, MemoryProviderConfig, ProviderConfig};
///
/// let provider = create_provider(ProviderConfig::Memory(MemoryProviderConfig::default())).unwrap();
/// assert_eq!(provider.id(), "memory");
/// ```
pub fn create_provider(config: ProviderConfig) -> Result<Arc<dyn DnsProvider>> {
    match config {
        ProviderConfig::Memory(config) => Ok(Arc::new(MemoryProvider::from_config(config))),
    }
}

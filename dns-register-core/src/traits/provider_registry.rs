//! Provider registry
//!
//! Maps the provider names used in zone configuration to provider instances.
//! Only providers the engine can reconcile with are accepted: they must fetch
//! records and either upsert or append them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use dns_register_provider::{create_provider, unsupported, DnsProvider};

use crate::config::ProviderRef;
use crate::error::{CoreError, CoreResult};

/// Checks that `provider` can fetch and write records.
pub(crate) fn ensure_usable(provider: &dyn DnsProvider) -> dns_register_provider::Result<()> {
    let capabilities = provider.capabilities();
    if !capabilities.get {
        return Err(unsupported(provider.id(), "get_records"));
    }
    if !capabilities.can_write() {
        return Err(unsupported(provider.id(), "set_records or append_records"));
    }
    Ok(())
}

/// Source of the providers referenced by zone configuration.
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    /// Registers `provider` under `name`, replacing any earlier one.
    ///
    /// Fails with [`CoreError::Provider`] when the provider cannot fetch or write.
    async fn register(&self, name: String, provider: Arc<dyn DnsProvider>) -> CoreResult<()>;

    async fn get(&self, name: &str) -> Option<Arc<dyn DnsProvider>>;

    /// Registered names, sorted.
    async fn names(&self) -> Vec<String>;

    /// Turns a zone's provider reference into a provider instance.
    ///
    /// Named references must be registered. Inline configurations are built on the
    /// spot and pass the same capability check as registration.
    async fn resolve(&self, reference: &ProviderRef) -> CoreResult<Arc<dyn DnsProvider>> {
        match reference {
            ProviderRef::Named(name) => self
                .get(name)
                .await
                .ok_or_else(|| CoreError::ProviderNotFound(name.clone())),
            ProviderRef::Inline(config) => {
                let provider = create_provider(config.clone())?;
                ensure_usable(provider.as_ref())?;
                Ok(provider)
            }
        }
    }
}

/// In-memory provider registry
#[derive(Clone)]
pub struct InMemoryProviderRegistry {
    providers: Arc<RwLock<HashMap<String, Arc<dyn DnsProvider>>>>,
}

impl InMemoryProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderRegistry for InMemoryProviderRegistry {
    async fn register(&self, name: String, provider: Arc<dyn DnsProvider>) -> CoreResult<()> {
        ensure_usable(provider.as_ref())?;
        log::debug!(
            "Registered provider '{name}' ({}, {})",
            provider.id(),
            provider.capabilities()
        );
        self.providers.write().await.insert(name, provider);
        Ok(())
    }

    async fn get(&self, name: &str) -> Option<Arc<dyn DnsProvider>> {
        self.providers.read().await.get(name).cloned()
    }

    async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

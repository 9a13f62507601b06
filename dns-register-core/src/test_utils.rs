//! Test helpers
//!
//! A scriptable provider and record builders.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use dns_register_provider::{
    unsupported, Capabilities, DnsProvider, MemoryProvider, ProviderError, ProviderRecord,
    Result,
};

// ===== Record builders =====

pub fn a(name: &str, ip: &str) -> ProviderRecord {
    ProviderRecord::Address {
        name: name.to_string(),
        ip: ip.parse().unwrap(),
        ttl: 300,
    }
}

pub fn txt(name: &str, text: &str) -> ProviderRecord {
    ProviderRecord::Txt {
        name: name.to_string(),
        text: text.to_string(),
        ttl: 300,
    }
}

/// Marker of `owner` for the record named `target`.
pub fn marker(target: &str, owner: &str) -> ProviderRecord {
    txt(
        &format!("_cdr.{target}"),
        &format!("owner={owner},heritage=caddy-dns-register"),
    )
}

// ===== MockProvider =====

/// A write call seen by [`MockProvider`].
#[derive(Debug, Clone)]
pub struct Call {
    pub operation: &'static str,
    pub records: Vec<ProviderRecord>,
}

/// [`MemoryProvider`] with failure injection and write recording.
pub struct MockProvider {
    inner: MemoryProvider,
    capabilities: Capabilities,
    fail_get: RwLock<bool>,
    /// Writes touching any of these names fail.
    failing_names: RwLock<HashSet<String>>,
    /// Writes carrying any of these exact records fail.
    failing_records: RwLock<Vec<ProviderRecord>>,
    /// Writes never complete.
    hang_writes: RwLock<bool>,
    calls: RwLock<Vec<Call>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::ALL)
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            inner: MemoryProvider::new(),
            capabilities,
            fail_get: RwLock::new(false),
            failing_names: RwLock::new(HashSet::new()),
            failing_records: RwLock::new(Vec::new()),
            hang_writes: RwLock::new(false),
            calls: RwLock::new(Vec::new()),
        }
    }

    pub async fn add_zone(&self, zone: &str, records: Vec<ProviderRecord>) {
        self.inner.add_zone(zone, records).await;
    }

    pub async fn snapshot(&self, zone: &str) -> Vec<ProviderRecord> {
        self.inner.snapshot(zone).await.unwrap_or_default()
    }

    pub async fn fail_get(&self, fail: bool) {
        *self.fail_get.write().await = fail;
    }

    pub async fn fail_writes_for(&self, name: &str) {
        self.failing_names.write().await.insert(name.to_string());
    }

    pub async fn fail_writes_of(&self, record: ProviderRecord) {
        self.failing_records.write().await.push(record);
    }

    pub async fn hang_writes(&self, hang: bool) {
        *self.hang_writes.write().await = hang;
    }

    /// Write calls issued so far, in order.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.read().await.clone()
    }

    async fn before_write(
        &self,
        operation: &'static str,
        enabled: bool,
        records: &[ProviderRecord],
    ) -> Result<()> {
        if !enabled {
            return Err(unsupported("mock", operation));
        }
        self.calls.write().await.push(Call {
            operation,
            records: records.to_vec(),
        });
        if *self.hang_writes.read().await {
            std::future::pending::<()>().await;
        }
        let names = self.failing_names.read().await;
        let exact = self.failing_records.read().await;
        if let Some(record) = records
            .iter()
            .find(|r| names.contains(r.name()) || exact.contains(r))
        {
            return Err(ProviderError::RecordConflict {
                provider: "mock".to_string(),
                record: record.name().to_string(),
                detail: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for MockProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn get_records(&self, zone: &str) -> Result<Vec<ProviderRecord>> {
        if !self.capabilities.get {
            return Err(unsupported("mock", "get_records"));
        }
        if *self.fail_get.read().await {
            return Err(ProviderError::NetworkError {
                provider: "mock".to_string(),
                detail: "connection refused".to_string(),
            });
        }
        self.inner.get_records(zone).await
    }

    async fn set_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        self.before_write("set", self.capabilities.set, records).await?;
        self.inner.set_records(zone, records).await
    }

    async fn append_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        self.before_write("append", self.capabilities.append, records).await?;
        self.inner.append_records(zone, records).await
    }

    async fn delete_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        self.before_write("delete", self.capabilities.delete, records).await?;
        self.inner.delete_records(zone, records).await
    }
}

//! In-memory DNS provider

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ProviderError, Result};
use crate::traits::{unsupported, Capabilities, DnsProvider};
use crate::types::ProviderRecord;

const PROVIDER_NAME: &str = "memory";

/// Configuration for [`MemoryProvider`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryProviderConfig {
    /// Advertised operations. Defaults to [`Capabilities::ALL`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
    /// Initial zone contents, keyed by zone name.
    #[serde(default)]
    pub zones: HashMap<String, Vec<ProviderRecord>>,
}

/// DNS provider backed by an in-process zone map.
///
/// Zones must exist (via [`add_zone`](Self::add_zone) or the seed config) before they
/// can be read or written; unknown zones yield [`ProviderError::ZoneNotFound`].
pub struct MemoryProvider {
    zones: RwLock<HashMap<String, Vec<ProviderRecord>>>,
    capabilities: Capabilities,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::ALL)
    }

    /// Creates a provider that only implements `capabilities`.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
            capabilities,
        }
    }

    pub fn from_config(config: MemoryProviderConfig) -> Self {
        Self {
            zones: RwLock::new(config.zones),
            capabilities: config.capabilities.unwrap_or(Capabilities::ALL),
        }
    }

    /// Creates `zone` with the given records, replacing any previous contents.
    pub async fn add_zone(&self, zone: &str, records: Vec<ProviderRecord>) {
        self.zones.write().await.insert(zone.to_string(), records);
    }

    /// Returns a copy of the zone contents, bypassing capability checks.
    pub async fn snapshot(&self, zone: &str) -> Option<Vec<ProviderRecord>> {
        self.zones.read().await.get(zone).cloned()
    }

    fn zone_not_found(zone: &str) -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: PROVIDER_NAME.to_string(),
            zone: zone.to_string(),
        }
    }

    fn same_rrset(a: &ProviderRecord, b: &ProviderRecord) -> bool {
        a.name() == b.name() && a.record_type() == b.record_type()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsProvider for MemoryProvider {
    fn id(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn get_records(&self, zone: &str) -> Result<Vec<ProviderRecord>> {
        if !self.capabilities.get {
            return Err(unsupported(PROVIDER_NAME, "get_records"));
        }
        self.snapshot(zone)
            .await
            .ok_or_else(|| Self::zone_not_found(zone))
    }

    async fn set_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        if !self.capabilities.set {
            return Err(unsupported(PROVIDER_NAME, "set_records"));
        }
        let mut zones = self.zones.write().await;
        let existing = zones
            .get_mut(zone)
            .ok_or_else(|| Self::zone_not_found(zone))?;

        existing.retain(|current| !records.iter().any(|r| Self::same_rrset(current, r)));
        existing.extend(records.iter().cloned());

        log::debug!("[{PROVIDER_NAME}] set {} record(s) in {zone}", records.len());
        Ok(records.to_vec())
    }

    async fn append_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        if !self.capabilities.append {
            return Err(unsupported(PROVIDER_NAME, "append_records"));
        }
        let mut zones = self.zones.write().await;
        let existing = zones
            .get_mut(zone)
            .ok_or_else(|| Self::zone_not_found(zone))?;

        let mut added = Vec::with_capacity(records.len());
        for record in records {
            let data = record.to_raw().data;
            let duplicate = existing
                .iter()
                .any(|current| Self::same_rrset(current, record) && current.to_raw().data == data);
            if !duplicate {
                existing.push(record.clone());
                added.push(record.clone());
            }
        }

        log::debug!("[{PROVIDER_NAME}] appended {} record(s) to {zone}", added.len());
        Ok(added)
    }

    async fn delete_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        if !self.capabilities.delete {
            return Err(unsupported(PROVIDER_NAME, "delete_records"));
        }
        let mut zones = self.zones.write().await;
        let existing = zones
            .get_mut(zone)
            .ok_or_else(|| Self::zone_not_found(zone))?;

        let mut deleted = Vec::new();
        existing.retain(|current| {
            let matched = records.iter().any(|r| {
                let data = r.to_raw().data;
                Self::same_rrset(current, r) && (data.is_empty() || data == current.to_raw().data)
            });
            if matched {
                deleted.push(current.clone());
            }
            !matched
        });

        log::debug!("[{PROVIDER_NAME}] deleted {} record(s) from {zone}", deleted.len());
        Ok(deleted)
    }
}

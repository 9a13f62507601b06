use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::types::ProviderRecord;

/// The set of record operations a provider implements.
///
/// Advertised once by [`DnsProvider::capabilities`] and checked by callers at setup
/// time instead of probing on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// [`DnsProvider::get_records`] is implemented.
    pub get: bool,
    /// [`DnsProvider::set_records`] (upsert) is implemented.
    pub set: bool,
    /// [`DnsProvider::append_records`] is implemented.
    pub append: bool,
    /// [`DnsProvider::delete_records`] is implemented.
    pub delete: bool,
}

impl Capabilities {
    /// Every operation supported.
    pub const ALL: Self = Self {
        get: true,
        set: true,
        append: true,
        delete: true,
    };

    /// Whether at least one write operation (`set` or `append`) is available.
    pub const fn can_write(&self) -> bool {
        self.set || self.append
    }
}

impl std::fmt::Display for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ops: Vec<&str> = [
            (self.get, "get"),
            (self.set, "set"),
            (self.append, "append"),
            (self.delete, "delete"),
        ]
        .into_iter()
        .filter_map(|(enabled, op)| enabled.then_some(op))
        .collect();

        if ops.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&ops.join(","))
        }
    }
}

/// Builds the error returned by operations a provider does not implement.
pub fn unsupported(provider: &str, operation: &str) -> ProviderError {
    ProviderError::Unsupported {
        provider: provider.to_string(),
        operation: operation.to_string(),
    }
}

/// DNS provider capability contract.
///
/// Only [`id`](Self::id) and [`capabilities`](Self::capabilities) are mandatory; every
/// record operation defaults to [`ProviderError::Unsupported`]. Implementors override the
/// operations they support and advertise exactly those in [`capabilities`](Self::capabilities).
///
/// Record names are zone-relative. Case rules are up to the provider.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Provider identifier.
    fn id(&self) -> &'static str;

    /// Operations this provider implements.
    fn capabilities(&self) -> Capabilities;

    /// Returns every record in `zone`.
    async fn get_records(&self, zone: &str) -> Result<Vec<ProviderRecord>> {
        let _ = zone;
        Err(unsupported(self.id(), "get_records"))
    }

    /// Upserts `records`: for every `(name, type)` present in the input, the existing
    /// records of that name and type are replaced by the input ones.
    ///
    /// Returns the records that were written.
    async fn set_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        let _ = (zone, records);
        Err(unsupported(self.id(), "set_records"))
    }

    /// Adds `records` without touching existing ones.
    ///
    /// Returns the records that were added.
    async fn append_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        let _ = (zone, records);
        Err(unsupported(self.id(), "append_records"))
    }

    /// Deletes records matching `records` by name and type, and by data when the
    /// input record carries non-empty data.
    ///
    /// Returns the records that were deleted. Inputs matching nothing are ignored.
    async fn delete_records(
        &self,
        zone: &str,
        records: &[ProviderRecord],
    ) -> Result<Vec<ProviderRecord>> {
        let _ = (zone, records);
        Err(unsupported(self.id(), "delete_records"))
    }
}

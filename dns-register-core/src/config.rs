//! Declared configuration and engine options

use std::path::Path;

use serde::{Deserialize, Serialize};

use dns_register_provider::ProviderConfig;

use crate::error::{CoreError, CoreResult};
use crate::types::Record;

/// Owner id used when none is configured.
pub const DEFAULT_OWNER_ID: &str = "caddy";
/// Name prefix of ownership marker records.
pub const MARKER_PREFIX: &str = "_cdr.";
/// Heritage tag embedded in every marker payload.
pub const MARKER_HERITAGE: &str = "caddy-dns-register";
/// TTL sent for records without an explicit TTL, and for every marker.
pub const DEFAULT_TTL: u32 = 300;

/// Top-level declared configuration.
///
/// ```json
/// {
///   "ownerId": "edge-1",
///   "zones": [
///     {
///       "zone": "example.com",
///       "provider": "primary",
///       "records": [{ "name": "www", "type": "A", "value": "192.0.2.1", "ttl": 300 }]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterConfig {
    /// Identifies this instance in ownership markers.
    #[serde(default, alias = "owner_id", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Engine behavior switches.
    #[serde(default)]
    pub options: EngineOptions,
    /// Zones to manage.
    #[serde(default, alias = "domains")]
    pub zones: Vec<ZoneConfig>,
}

impl RegisterConfig {
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CoreError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// The configured owner id, or [`DEFAULT_OWNER_ID`] when unset or blank.
    pub fn effective_owner_id(&self) -> String {
        self.owner_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_OWNER_ID)
            .to_string()
    }
}

/// One managed zone: its provider and declared records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    /// Zone name (e.g. `"example.com"`).
    #[serde(alias = "zoneName")]
    pub zone: String,
    /// Which provider manages the zone.
    #[serde(alias = "providerRef", alias = "dns_provider")]
    pub provider: ProviderRef,
    /// Declared records, zone-relative. Later duplicates of a `(name, type)` win.
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Reference to a zone's provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderRef {
    /// Name of a provider registered in the [`ProviderRegistry`](crate::traits::ProviderRegistry).
    Named(String),
    /// Provider built from inline configuration.
    Inline(ProviderConfig),
}

/// Engine behavior switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Delete markers of this instance whose target record no longer exists.
    pub sweep_orphan_markers: bool,
    /// Treat an unset declared TTL as [`DEFAULT_TTL`] when comparing, so owned records
    /// whose TTL drifted away from the default are updated back.
    pub enforce_default_ttl: bool,
    /// Maximum number of zones reconciled at the same time.
    pub zone_concurrency: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            sweep_orphan_markers: false,
            enforce_default_ttl: false,
            zone_concurrency: 1,
        }
    }
}

/// How ownership markers are named and what they contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFormat {
    pub prefix: String,
    pub owner_id: String,
    pub heritage: String,
}

impl MarkerFormat {
    /// Marker format for `owner_id` with the standard prefix and heritage tag.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            prefix: MARKER_PREFIX.to_string(),
            owner_id: owner_id.into(),
            heritage: MARKER_HERITAGE.to_string(),
        }
    }

    /// `owner=<owner id>,heritage=<heritage>`
    pub fn payload(&self) -> String {
        format!("owner={},heritage={}", self.owner_id, self.heritage)
    }

    /// Name of the marker guarding `target`.
    pub fn marker_name(&self, target: &str) -> String {
        format!("{}{target}", self.prefix)
    }

    /// The guarded record name if `name` is a marker name.
    pub fn target_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.prefix.as_str())
    }

    pub fn is_marker_name(&self, name: &str) -> bool {
        name.starts_with(self.prefix.as_str())
    }

    /// Whether `data` is this owner's payload, bare or wrapped in one pair of double quotes.
    pub fn is_own_payload(&self, data: &str) -> bool {
        let expected = self.payload();
        data == expected
            || data
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .is_some_and(|inner| inner == expected)
    }
}

//! Declared/owned record types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dns_register_provider::RecordType;

/// A DNS record as the engine sees it: name, type, canonical value, optional TTL.
///
/// Names are zone-relative (`"www"`, `"@"` for apex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Zone-relative record name.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Type-specific value (IP literal, target name, text payload, ...).
    pub value: String,
    /// TTL in seconds. `None` or `0` means "not set".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<RecordType>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            value: value.into(),
            ttl: None,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Identity of this record within its zone.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.name.clone(), self.record_type.clone())
    }

    /// The TTL if it was explicitly set to a non-zero value.
    pub fn explicit_ttl(&self) -> Option<u32> {
        self.ttl.filter(|ttl| *ttl > 0)
    }
}

/// `(name, type)` identity of a record within a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
}

impl RecordKey {
    pub fn new(name: impl Into<String>, record_type: impl Into<RecordType>) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.record_type)
    }
}

/// Records of a zone owned by this instance, keyed by `(name, type)`.
///
/// Rebuilt from the provider snapshot on every pass.
pub type OwnedIndex = BTreeMap<RecordKey, Record>;

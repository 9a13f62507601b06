//! Reconciliation plan

use serde::Serialize;

use dns_register_provider::ProviderRecord;

use super::record::{Record, RecordKey};

/// The changes one pass will make to a zone.
///
/// Computed once per pass and consumed immediately. Every list is sorted by record key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPlan {
    /// Declared records with no owned counterpart.
    pub to_create: Vec<Record>,
    /// Declared records whose owned counterpart differs in value or TTL.
    pub to_update: Vec<Record>,
    /// Owned records that are no longer declared.
    pub to_delete: Vec<RecordKey>,
    /// Markers of this instance whose target record no longer exists.
    ///
    /// Only populated when orphan marker sweeping is enabled.
    pub orphan_markers: Vec<ProviderRecord>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty()
            && self.to_update.is_empty()
            && self.to_delete.is_empty()
            && self.orphan_markers.is_empty()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.to_create.len(),
            update: self.to_update.len(),
            delete: self.to_delete.len(),
            orphan_markers: self.orphan_markers.len(),
        }
    }
}

/// Per-set counts of a [`ReconciliationPlan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub orphan_markers: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "create={} update={} delete={} orphan_markers={}",
            self.create, self.update, self.delete, self.orphan_markers
        )
    }
}

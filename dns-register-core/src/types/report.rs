//! Apply outcomes and pass reports

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use dns_register_provider::RecordType;

use super::plan::PlanSummary;

/// What the apply driver attempted for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplyAction {
    Delete,
    Create,
    Update,
    /// Removal of a marker whose target record is gone.
    SweepMarker,
}

impl std::fmt::Display for ApplyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Update => "update",
            Self::SweepMarker => "sweep-marker",
        };
        f.write_str(s)
    }
}

/// How an attempted action ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OutcomeStatus {
    /// The provider accepted the write.
    Applied,
    /// The provider rejected the write; retried implicitly on the next pass.
    Failed { reason: String },
    /// The provider lacks the capability this phase needs.
    Unsupported,
    /// The pass was cancelled before or while this item was written.
    Cancelled,
}

/// Result of one apply item, reported individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub action: ApplyAction,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// New value, for creates and updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }
}

/// Per-zone reconciliation state.
///
/// A zone moves through the states strictly in declaration order and ends in
/// `Done`, `ZoneFailed` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneState {
    Fetching,
    Classifying,
    Diffing,
    ApplyingDeletes,
    ApplyingCreates,
    ApplyingUpdates,
    Done,
    /// The snapshot could not be fetched; nothing was changed.
    ZoneFailed,
    Cancelled,
}

impl ZoneState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::ZoneFailed | Self::Cancelled)
    }
}

impl std::fmt::Display for ZoneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Fetching => "fetching",
            Self::Classifying => "classifying",
            Self::Diffing => "diffing",
            Self::ApplyingDeletes => "applying-deletes",
            Self::ApplyingCreates => "applying-creates",
            Self::ApplyingUpdates => "applying-updates",
            Self::Done => "done",
            Self::ZoneFailed => "zone-failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Everything one pass did to one zone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneReport {
    pub zone: String,
    /// Terminal state.
    pub state: ZoneState,
    /// Plan counts; `None` when the pass stopped before diffing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSummary>,
    pub outcomes: Vec<ApplyOutcome>,
    /// Fetch error message when `state` is `ZoneFailed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ZoneReport {
    /// Number of outcomes that did not end in [`OutcomeStatus::Applied`].
    pub fn unapplied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_applied()).count()
    }

    /// `true` when the pass finished and every planned item was applied.
    pub fn is_clean(&self) -> bool {
        self.state == ZoneState::Done && self.unapplied_count() == 0
    }
}

/// Reports of every zone reconciled in one pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub zones: Vec<ZoneReport>,
}

impl RunReport {
    pub fn zone(&self, zone: &str) -> Option<&ZoneReport> {
        self.zones.iter().find(|report| report.zone == zone)
    }

    /// Zones whose snapshot could not be fetched in this pass.
    pub fn failed_zones(&self) -> Vec<&str> {
        self.zones
            .iter()
            .filter(|report| report.state == ZoneState::ZoneFailed)
            .map(|report| report.zone.as_str())
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.zones.iter().all(ZoneReport::is_clean)
    }
}

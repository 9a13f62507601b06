//! Type definition module

mod plan;
mod record;
mod report;

pub use plan::{PlanSummary, ReconciliationPlan};
pub use record::{OwnedIndex, Record, RecordKey};
pub use report::{ApplyAction, ApplyOutcome, OutcomeStatus, RunReport, ZoneReport, ZoneState};

// Re-export public types of the provider library
pub use dns_register_provider::{Capabilities, ProviderRecord, RawRecord, RecordType};

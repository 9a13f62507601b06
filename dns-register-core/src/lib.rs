//! DNS Register Core Library
//!
//! Reconciles declared DNS records against live zones while only ever touching
//! records this instance owns. Ownership is tracked with TXT marker records
//! (`_cdr.<name>` carrying `owner=<id>,heritage=caddy-dns-register`) stored next
//! to the records they guard, so several instances can share a zone.
//!
//! A pass per zone fetches the snapshot, classifies ownership, diffs owned
//! against declared records and applies deletes, creates and updates in that
//! order. Providers are reached only through the capability contract of
//! `dns-register-provider`.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dns_register_core::{
//!     DnsRegistrar, InMemoryProviderRegistry, ProviderRegistry, RegisterConfig,
//! };
//! use dns_register_provider::MemoryProvider;
//!
//! # async fn example() -> dns_register_core::CoreResult<()> {
//! let registry = InMemoryProviderRegistry::new();
//! registry
//!     .register("primary".to_string(), Arc::new(MemoryProvider::new()))
//!     .await?;
//!
//! let config = RegisterConfig::from_json_file("register.json")?;
//! let registrar = DnsRegistrar::provision(config, &registry).await;
//! let report = registrar.run_pass().await;
//! println!("clean: {}", report.is_clean());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::{EngineOptions, MarkerFormat, ProviderRef, RegisterConfig, ZoneConfig};
pub use error::{CoreError, CoreResult};
pub use services::{DnsRegistrar, ManagedZone};
pub use traits::{InMemoryProviderRegistry, ProviderRegistry};
pub use types::{
    ApplyAction, ApplyOutcome, OutcomeStatus, PlanSummary, ReconciliationPlan, Record, RecordKey,
    RunReport, ZoneReport, ZoneState,
};

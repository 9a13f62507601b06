//! Reconciliation services
//!
//! Leaves first: [`codec`] maps records to provider records, [`ownership`]
//! classifies a snapshot, [`diff`] plans changes, [`apply`] writes them and
//! [`reconciler`] drives the whole pass per zone.

pub mod apply;
pub mod codec;
pub mod diff;
pub mod ownership;
mod reconciler;

pub use apply::ApplyDriver;
pub use diff::{diff, DiffOptions};
pub use ownership::{classify, Ownership};
pub use reconciler::{DnsRegistrar, ManagedZone};

//! # dns-register-provider
//!
//! The provider side of `dns-register`: a capability-based DNS provider contract,
//! the record model exchanged with providers, and an in-memory reference provider.
//!
//! ## Capability Contract
//!
//! | Operation | Method | Required |
//! |-----------|--------|----------|
//! | Fetch zone snapshot | [`DnsProvider::get_records`] | yes |
//! | Upsert records | [`DnsProvider::set_records`] | one of set/append |
//! | Append records | [`DnsProvider::append_records`] | one of set/append |
//! | Delete records | [`DnsProvider::delete_records`] | no |
//!
//! A provider advertises what it implements through [`DnsProvider::capabilities`];
//! callers check the returned [`Capabilities`] once instead of probing per call.
//!
//! ## Record Model
//!
//! [`ProviderRecord`] is a closed enum of typed variants (address, TXT, CNAME, MX, NS)
//! with a [`RawRecord`] fallback. [`ProviderRecord::to_raw`] gives a uniform
//! name/type/TTL/data view over every variant.
//!
//! ## Usage
//!
//! ```rust
//! use dns_register_provider::{DnsProvider, MemoryProvider, ProviderRecord};
//!
//! # async fn example() -> dns_register_provider::Result<()> {
//! let provider = MemoryProvider::new();
//! provider.add_zone("example.com", Vec::new()).await;
//!
//! provider
//!     .set_records(
//!         "example.com",
//!         &[ProviderRecord::Cname {
//!             name: "www".to_string(),
//!             target: "example.net.".to_string(),
//!             ttl: 300,
//!         }],
//!     )
//!     .await?;
//!
//! let records = provider.get_records("example.com").await?;
//! assert_eq!(records.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All provider operations return [`Result<T, ProviderError>`](ProviderError).
//! Operations a provider does not implement fail with [`ProviderError::Unsupported`].

mod error;
mod factory;
mod providers;
mod traits;
mod types;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::{create_provider, ProviderConfig};

// Re-export the capability contract
pub use traits::{unsupported, Capabilities, DnsProvider};

// Re-export types
pub use types::{ProviderRecord, RawRecord, RecordType};

// Re-export concrete providers
pub use providers::{MemoryProvider, MemoryProviderConfig};

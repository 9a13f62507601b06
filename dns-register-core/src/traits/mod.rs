//! Abstractions the engine depends on

mod provider_registry;

pub(crate) use provider_registry::ensure_usable;
pub use provider_registry::{InMemoryProviderRegistry, ProviderRegistry};

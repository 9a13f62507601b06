//! DNS Provider implementations

mod memory;

pub use memory::{MemoryProvider, MemoryProviderConfig};

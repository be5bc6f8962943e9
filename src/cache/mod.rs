//! Cache tiers consulted before any backend request.
//!
//! - `memory`: resolved strings per exact key batch, short TTL
//! - `persistent`: raw multilingual records in durable storage, long TTL
//! - `negative`: keys confirmed absent for the rest of the session

mod memory;
mod negative;
mod persistent;

pub use memory::{BatchKey, MemoryCache, MemoryCacheEntry, MemoryEntrySummary, DEFAULT_MEMORY_TTL_SECS};
pub use negative::NegativeKeyRegistry;
pub use persistent::{
    PersistentCache, PersistentCacheEnvelope, PersistentSummary, DEFAULT_PERSISTENT_TTL_SECS,
};

//! Cache Module
//!
//! Two-tier caching: a bounded in-process fast tier with pluggable eviction
//! and lazy TTL expiry, backed by a durable key-value store.

mod clock;
mod entry;
mod envelope;
mod flight;
mod manager;
mod policy;
mod stats;
mod tier;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use envelope::Envelope;
pub use manager::CacheManager;
pub use policy::{Candidate, EvictionPolicy, Fifo, Lfu, Lru, PolicyKind};
pub use stats::CacheStats;
pub use tier::FastTier;

// == Public Constants ==
/// Maximum key length accepted by the HTTP surface, in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed serialized value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

//! Cache Statistics Module
//!
//! Tracks cache performance metrics across both tiers.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Current number of fast-tier entries (live or not yet reaped)
    pub entry_count: usize,
    /// Reads answered by the fast tier
    pub hits: u64,
    /// Reads answered by the durable tier after a fast-tier miss
    pub durable_hits: u64,
    /// Reads that found nothing in either tier
    pub misses: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Stale entries removed on access or by a sweep
    pub expirations: u64,
    /// Failed durable-store calls (after retries)
    pub durable_errors: u64,
    /// Payloads that could not be decoded into the requested type
    pub decode_failures: u64,
    /// Producer invocations from `get_or_set`
    pub producer_runs: u64,
    /// `get_or_set` callers that waited on another caller's producer
    pub coalesced_waits: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate over both tiers.
    ///
    /// Returns (hits + durable_hits) / all lookups, or 0.0 without lookups.
    pub fn hit_rate(&self) -> f64 {
        let found = self.hits + self.durable_hits;
        let total = found + self.misses;
        if total == 0 {
            0.0
        } else {
            found as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_durable_hit(&mut self) {
        self.durable_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Adds `count` expired removals.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_durable_error(&mut self) {
        self.durable_errors += 1;
    }

    pub fn record_decode_failure(&mut self) {
        self.decode_failures += 1;
    }

    pub fn record_producer_run(&mut self) {
        self.producer_runs += 1;
    }

    pub fn record_coalesced_wait(&mut self) {
        self.coalesced_waits += 1;
    }

    // == Update Entry Count ==
    /// Updates the resident entry count.
    pub fn set_entry_count(&mut self, count: usize) {
        self.entry_count = count;
    }
}

//! Cache Entry Module
//!
//! Defines the structure for individual fast-tier entries with TTL support.

use bytes::Bytes;

// == Cache Entry ==
/// Represents a single fast-tier entry with its serialized value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized payload
    pub value: Bytes,
    /// Timestamp of the last write (Unix milliseconds)
    pub created_at: u64,
    /// Lifetime in milliseconds, measured from `created_at`
    pub ttl_ms: u64,
    /// Hit counter, 1 right after a write
    pub access_count: u64,
    /// Logical order of the last write
    pub written_tick: u64,
    /// Logical order of the last write or touch
    pub used_tick: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a freshly written entry.
    ///
    /// # Arguments
    /// * `value` - The serialized value
    /// * `ttl_ms` - Lifetime in milliseconds
    /// * `now` - Write time in Unix milliseconds
    /// * `tick` - Logical write order assigned by the store
    pub fn new(value: Bytes, ttl_ms: u64, now: u64, tick: u64) -> Self {
        Self {
            value,
            created_at: now,
            ttl_ms,
            access_count: 1,
            written_tick: tick,
            used_tick: tick,
        }
    }

    // == Expires At ==
    /// Returns the Unix millisecond at which the entry stops being live.
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl_ms)
    }

    // == Is Live ==
    /// Checks whether the entry is still live at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= created_at + ttl`,
    /// so a zero TTL is never live.
    pub fn is_live(&self, now: u64) -> bool {
        now < self.expires_at()
    }

    // == Touch ==
    /// Records a successful read.
    pub fn touch(&mut self, tick: u64) {
        self.access_count += 1;
        self.used_tick = tick;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ttl_ms: u64) -> CacheEntry {
        CacheEntry::new(Bytes::from_static(b"v"), ttl_ms, 10_000, 1)
    }

    #[test]
    fn test_entry_creation() {
        let entry = entry(60_000);

        assert_eq!(entry.value, Bytes::from_static(b"v"));
        assert_eq!(entry.access_count, 1);
        assert_eq!(entry.created_at, 10_000);
        assert_eq!(entry.expires_at(), 70_000);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = entry(60_000);

        assert!(entry.is_live(69_999));
        assert!(!entry.is_live(70_000), "Entry should be expired at boundary");
        assert!(!entry.is_live(70_001));
    }

    #[test]
    fn test_zero_ttl_is_never_live() {
        let entry = entry(0);
        assert!(!entry.is_live(10_000));
    }

    #[test]
    fn test_touch_keeps_expiry() {
        let mut entry = entry(60_000);
        entry.touch(7);

        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.used_tick, 7);
        assert_eq!(entry.written_tick, 1);
        assert_eq!(entry.expires_at(), 70_000);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let entry = entry(u64::MAX);
        assert!(entry.is_live(u64::MAX - 1));
    }
}

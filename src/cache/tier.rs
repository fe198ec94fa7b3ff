//! Fast Tier Module
//!
//! Bounded in-process entry map. Capacity is counted in entries and enforced
//! on insertion by evicting one victim chosen by the configured policy.

use std::collections::HashMap;

use bytes::Bytes;

use crate::cache::policy::{Candidate, EvictionPolicy};
use crate::cache::CacheEntry;

// == Fast Tier ==
/// In-process key → entry map with a hard entry-count bound.
///
/// Liveness is not checked here; callers decide what to do with stale entries.
#[derive(Debug)]
pub struct FastTier {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Victim selection strategy
    policy: Box<dyn EvictionPolicy>,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Logical clock for write and recency ordering
    tick: u64,
}

impl FastTier {
    // == Constructor ==
    /// Creates an empty tier. A `max_size` of 0 is treated as 1.
    pub fn new(max_size: usize, policy: Box<dyn EvictionPolicy>) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            max_size: max_size.max(1),
            tick: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    // == Get ==
    /// Returns the entry for `key`, live or not.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Put ==
    /// Inserts or overwrites an entry.
    ///
    /// Overwriting resets the access count. Inserting a new key into a full
    /// tier first evicts exactly one victim, whose key is returned.
    pub fn put(&mut self, key: &str, value: Bytes, ttl_ms: u64, now: u64) -> Option<String> {
        let evicted = if !self.entries.contains_key(key) && self.entries.len() >= self.max_size {
            self.evict_one()
        } else {
            None
        };

        let tick = self.next_tick();
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl_ms, now, tick));

        evicted
    }

    fn evict_one(&mut self) -> Option<String> {
        let victim = {
            let mut candidates = self.entries.iter().map(|(key, entry)| Candidate {
                key: key.as_str(),
                created_at: entry.created_at,
                access_count: entry.access_count,
                written_tick: entry.written_tick,
                used_tick: entry.used_tick,
            });
            self.policy
                .select_victim(&mut candidates)
                .map(str::to_string)
        }?;

        self.entries.remove(&victim);
        Some(victim)
    }

    // == Remove ==
    /// Removes `key`; returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Touch ==
    /// Records a hit on `key` without changing its value or TTL.
    pub fn touch(&mut self, key: &str) -> bool {
        if !self.entries.contains_key(key) {
            return false;
        }
        let tick = self.next_tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.touch(tick);
                true
            }
            None => false,
        }
    }

    // == Remove Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    // == Purge Expired ==
    /// Removes all entries that are no longer live at `now`.
    pub fn purge_expired(&mut self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    /// Drops every entry.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries, live or stale.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }
}

//! Cache Manager Module
//!
//! Public face of the cache. Reads go to the fast tier first and fall back to
//! the durable tier (backfilling on a hit); writes go to the fast tier and are
//! written through to the durable tier on a best-effort basis.
//!
//! Values are encoded with MessagePack in both tiers. The durable copy is
//! wrapped in an [`Envelope`] that carries its absolute expiry, so a value
//! backfilled from the durable tier never outlives the TTL it was set with.
//!
//! # Lifecycle
//! A manager is built once at startup with [`CacheManager::new`], shared as
//! `Arc<CacheManager>` and dropped on shutdown. Anything that outlives it,
//! such as the sweep task, must hold a `Weak` handle or be stopped first.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::flight::{Flight, FlightRegistry};
use crate::cache::{CacheStats, Clock, Envelope, FastTier, SystemClock, MAX_VALUE_SIZE};
use crate::config::CacheConfig;
use crate::durable::DurableStore;
use crate::error::{CacheError, DurableError, Result};

/// Mutable state guarded by one lock.
#[derive(Debug)]
struct State {
    tier: FastTier,
    stats: CacheStats,
}

/// Outcome of a fast-tier lookup.
enum FastRead<T> {
    /// Live entry that decoded as the requested type
    Hit(T, Bytes),
    /// Live entry that did not decode; already counted as a miss
    Undecodable,
    /// No live entry
    Absent,
}

// == Cache Manager ==
/// Two-tier cache with read-through, write-through and single-flight
/// memoization.
pub struct CacheManager {
    state: Mutex<State>,
    durable: Option<Arc<dyn DurableStore>>,
    clock: Arc<dyn Clock>,
    flights: FlightRegistry,
    config: CacheConfig,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a fast-tier-only manager on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        let tier = FastTier::new(config.max_entries, config.policy.build());
        Self {
            state: Mutex::new(State {
                tier,
                stats: CacheStats::new(),
            }),
            durable: None,
            clock: Arc::new(SystemClock),
            flights: FlightRegistry::new(),
            config,
        }
    }

    /// Puts `store` behind the fast tier.
    pub fn with_durable(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.durable = Some(store);
        self
    }

    /// Replaces the time source used for TTLs.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn has_durable(&self) -> bool {
        self.durable.is_some()
    }

    // == Get ==
    /// Returns the value stored under `key`, or `None` on a miss.
    ///
    /// A stale fast-tier entry is removed and treated as absent. Durable-tier
    /// failures and undecodable payloads are logged and count as misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read_fast(key).await {
            FastRead::Hit(value, _) => return Some(value),
            FastRead::Undecodable => return None,
            FastRead::Absent => {}
        }

        let envelope = self.read_durable(key).await?;
        let value = match decode(&envelope.payload) {
            Ok(value) => value,
            Err(err) => {
                let mut state = self.state.lock().await;
                state.stats.record_decode_failure();
                state.stats.record_miss();
                warn!("Treating undecodable durable payload for '{}' as a miss: {}", key, err);
                return None;
            }
        };
        self.backfill(key, envelope).await;
        Some(value)
    }

    /// Looks `key` up in the fast tier. Only an entry that decodes as `T`
    /// is touched and counted as a hit.
    async fn read_fast<T: DeserializeOwned>(&self, key: &str) -> FastRead<T> {
        let now = self.clock.now_ms();
        let mut state = self.state.lock().await;

        let (live, payload) = match state.tier.get(key) {
            Some(entry) => (entry.is_live(now), entry.value.clone()),
            None => return FastRead::Absent,
        };

        if !live {
            state.tier.remove(key);
            state.stats.record_expirations(1);
            let count = state.tier.len();
            state.stats.set_entry_count(count);
            debug!("Expired '{}' on access", key);
            return FastRead::Absent;
        }

        match decode(&payload) {
            Ok(value) => {
                state.tier.touch(key);
                state.stats.record_hit();
                FastRead::Hit(value, payload)
            }
            Err(err) => {
                state.stats.record_decode_failure();
                state.stats.record_miss();
                warn!("Treating undecodable payload for '{}' as a miss: {}", key, err);
                FastRead::Undecodable
            }
        }
    }

    /// Fetches the live durable copy of `key`. Misses, failures, expired
    /// envelopes and foreign bytes are all counted as misses.
    async fn read_durable(&self, key: &str) -> Option<Envelope> {
        let result = match &self.durable {
            Some(durable) => durable.get(key).await,
            None => Ok(None),
        };

        let now = self.clock.now_ms();
        let mut state = self.state.lock().await;
        let raw = match result {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                state.stats.record_miss();
                return None;
            }
            Err(err) => {
                warn!("Durable read of '{}' failed, serving fast tier only: {}", key, err);
                state.stats.record_durable_error();
                state.stats.record_miss();
                return None;
            }
        };

        match Envelope::decode(raw) {
            Some(envelope) if envelope.is_live(now) => Some(envelope),
            Some(_) => {
                debug!("Durable copy of '{}' has expired", key);
                state.stats.record_miss();
                None
            }
            None => {
                warn!("Treating unframed durable payload for '{}' as a miss", key);
                state.stats.record_decode_failure();
                state.stats.record_miss();
                None
            }
        }
    }

    /// Copies a durable hit into the fast tier for what is left of its TTL.
    async fn backfill(&self, key: &str, envelope: Envelope) {
        let now = self.clock.now_ms();
        let mut state = self.state.lock().await;
        state.stats.record_durable_hit();

        // A concurrent set may have landed while the durable read was pending.
        if state.tier.contains(key) {
            return;
        }
        let ttl_ms = envelope.ttl_remaining_ms(now);
        if ttl_ms == 0 {
            return;
        }
        Self::insert(&mut state, key, envelope.payload, ttl_ms, now);
        debug!("Backfilled '{}' from durable store for {} ms", key, ttl_ms);
    }

    fn insert(state: &mut State, key: &str, payload: Bytes, ttl_ms: u64, now: u64) {
        if let Some(victim) = state.tier.put(key, payload, ttl_ms, now) {
            state.stats.record_eviction();
            debug!(
                "Evicted '{}' ({}) to make room for '{}'",
                victim,
                state.tier.policy_name(),
                key
            );
        }
        let count = state.tier.len();
        state.stats.set_entry_count(count);
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl_seconds`.
    ///
    /// Fails only for invalid input. The durable write is best-effort: it is
    /// retried with backoff, then logged and dropped.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<()> {
        validate(ttl_seconds)?;
        let payload = encode(value)?;
        self.store(key, payload, ttl_seconds).await;
        Ok(())
    }

    async fn store(&self, key: &str, payload: Bytes, ttl_seconds: u64) {
        let ttl_ms = ttl_seconds.saturating_mul(1000);
        let now = self.clock.now_ms();
        {
            let mut state = self.state.lock().await;
            Self::insert(&mut state, key, payload.clone(), ttl_ms, now);
        }
        let framed = Envelope::new(payload, now.saturating_add(ttl_ms)).encode();
        self.write_through(key, framed, ttl_seconds).await;
    }

    async fn write_through(&self, key: &str, framed: Bytes, ttl_seconds: u64) {
        let Some(durable) = &self.durable else {
            return;
        };

        let attempts = self.config.durable_write_attempts.max(1);
        let mut backoff = self.config.durable_retry_backoff;
        for attempt in 1..=attempts {
            match durable.put(key, framed.clone(), ttl_seconds).await {
                Ok(()) => return,
                Err(err) if attempt < attempts => {
                    debug!(
                        "Durable write of '{}' failed (attempt {}/{}), retrying in {:?}: {}",
                        key, attempt, attempts, backoff, err
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => {
                    warn!(
                        "Durable write of '{}' gave up after {} attempts: {}",
                        key, attempts, err
                    );
                    self.state.lock().await.stats.record_durable_error();
                }
            }
        }
    }
    // == Delete ==
    /// Removes `key` from both tiers.
    ///
    /// Returns whether the fast tier held the key. A durable failure is
    /// logged, not returned.
    pub async fn delete(&self, key: &str) -> bool {
        let removed = {
            let mut state = self.state.lock().await;
            let removed = state.tier.remove(key);
            let count = state.tier.len();
            state.stats.set_entry_count(count);
            removed
        };

        if let Some(durable) = &self.durable {
            if let Err(err) = durable.delete(key).await {
                warn!("Durable delete of '{}' failed: {}", key, err);
                self.state.lock().await.stats.record_durable_error();
            }
        }

        removed
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, computing and storing it with
    /// `producer` on a miss.
    ///
    /// Concurrent callers for the same cold key share one producer run.
    pub async fn get_or_set<T, F, Fut>(&self, key: &str, producer: F, ttl_seconds: u64) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.try_get_or_set(key, || async move { Ok::<T, CacheError>(producer().await) }, ttl_seconds)
            .await
    }

    /// Like [`CacheManager::get_or_set`] with a fallible producer.
    ///
    /// A producer error is returned to its caller and nothing is cached.
    /// Callers that were waiting on it retry, so one of them runs its own
    /// producer next. A producer must not call back into `get_or_set` for
    /// its own key.
    pub async fn try_get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        ttl_seconds: u64,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        validate(ttl_seconds)?;

        loop {
            if let Some(value) = self.get::<T>(key).await {
                return Ok(value);
            }

            match self.flights.join(key) {
                Flight::Follower(slot) => {
                    self.state.lock().await.stats.record_coalesced_wait();
                    if let Some(payload) = FlightRegistry::wait(slot).await {
                        match decode(&payload) {
                            Ok(value) => return Ok(value),
                            Err(err) => {
                                self.state.lock().await.stats.record_decode_failure();
                                warn!("Shared value for '{}' did not decode: {}", key, err);
                            }
                        }
                    }
                    debug!("In-flight computation of '{}' ended without a value, retrying", key);
                }
                Flight::Leader(guard) => {
                    // The previous leader may have finished between our miss and join.
                    if let FastRead::Hit(value, payload) = self.read_fast(key).await {
                        guard.complete(payload);
                        return Ok(value);
                    }

                    self.state.lock().await.stats.record_producer_run();
                    let value = producer().await?;
                    let payload = encode(&value)?;
                    self.store(key, payload.clone(), ttl_seconds).await;
                    guard.complete(payload);
                    return Ok(value);
                }
            }
        }
    }

    // == Invalidate Prefix ==
    /// Removes every fast-tier entry whose key starts with `prefix`.
    ///
    /// The durable tier is only touched when `invalidate_durable_prefix` is
    /// configured and the store supports prefix deletion. Returns the number
    /// of fast-tier entries removed.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let removed = {
            let mut state = self.state.lock().await;
            let removed = state.tier.remove_prefix(prefix);
            let count = state.tier.len();
            state.stats.set_entry_count(count);
            removed
        };
        debug!("Invalidated {} fast-tier entries with prefix '{}'", removed, prefix);

        if self.config.invalidate_durable_prefix {
            if let Some(durable) = &self.durable {
                match durable.delete_prefix(prefix).await {
                    Ok(count) => {
                        debug!("Invalidated {} durable entries with prefix '{}'", count, prefix)
                    }
                    Err(DurableError::Unsupported(what)) => {
                        debug!("Durable store lacks {}, prefix '{}' left there", what, prefix)
                    }
                    Err(err) => {
                        warn!("Durable invalidation of prefix '{}' failed: {}", prefix, err);
                        self.state.lock().await.stats.record_durable_error();
                    }
                }
            }
        }

        removed
    }

    // == Purge Expired ==
    /// Removes all stale fast-tier entries. Hook for a periodic sweep.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.state.lock().await;
        let removed = state.tier.purge_expired(now);
        state.stats.record_expirations(removed);
        let count = state.tier.len();
        state.stats.set_entry_count(count);
        removed
    }

    /// Drops every fast-tier entry. The durable tier is left alone.
    pub async fn clear(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state.tier.clear();
        state.stats.set_entry_count(0);
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let mut stats = state.stats.clone();
        stats.set_entry_count(state.tier.len());
        stats
    }

    /// Returns the current number of fast-tier entries.
    pub async fn len(&self) -> usize {
        self.state.lock().await.tier.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.tier.is_empty()
    }

    /// Whether the fast tier currently holds `key`, live or stale.
    pub async fn contains(&self, key: &str) -> bool {
        self.state.lock().await.tier.contains(key)
    }
}

/// Keys are opaque to the library; only the TTL is constrained.
fn validate(ttl_seconds: u64) -> Result<()> {
    if ttl_seconds == 0 {
        return Err(CacheError::InvalidRequest(
            "TTL must be at least one second".to_string(),
        ));
    }
    Ok(())
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    let payload = rmp_serde::to_vec_named(value)?;
    if payload.len() > MAX_VALUE_SIZE {
        return Err(CacheError::InvalidRequest(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }
    Ok(Bytes::from(payload))
}

fn decode<T: DeserializeOwned>(payload: &[u8]) -> std::result::Result<T, rmp_serde::decode::Error> {
    rmp_serde::from_slice(payload)
}

//! In-memory durable store
//!
//! A process-local stand-in for the shared backing store, used by the
//! binary when no external store is configured and by tests. It honours
//! TTLs and can be taken offline to simulate an outage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::cache::{Clock, SystemClock};
use crate::durable::DurableStore;
use crate::error::DurableError;

#[derive(Debug, Clone)]
struct StoredValue {
    value: Bytes,
    expires_at: u64,
}

// == Memory Durable Store ==
#[derive(Debug)]
pub struct MemoryDurableStore {
    values: RwLock<HashMap<String, StoredValue>>,
    clock: Arc<dyn Clock>,
    online: AtomicBool,
}

impl Default for MemoryDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDurableStore {
    // == Constructor ==
    /// Creates an empty, online store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty, online store driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            clock,
            online: AtomicBool::new(true),
        }
    }

    // == Outage Simulation ==
    /// Takes the store offline (every call fails) or back online.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), DurableError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(DurableError::Unavailable("memory store is offline".to_string()))
        }
    }

    /// Number of stored keys, expired ones included until they are read.
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    /// Writes raw bytes, bypassing availability. Useful to seed test data.
    pub async fn insert_raw(&self, key: &str, value: Bytes, ttl_seconds: u64) {
        let expires_at = self.expiry(ttl_seconds);
        self.values
            .write()
            .await
            .insert(key.to_string(), StoredValue { value, expires_at });
    }

    fn expiry(&self, ttl_seconds: u64) -> u64 {
        self.clock
            .now_ms()
            .saturating_add(ttl_seconds.saturating_mul(1000))
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, DurableError> {
        self.check_online()?;
        let now = self.clock.now_ms();

        let mut values = self.values.write().await;
        match values.get(key) {
            Some(stored) if now < stored.expires_at => Ok(Some(stored.value.clone())),
            Some(_) => {
                values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Bytes, ttl_seconds: u64) -> Result<(), DurableError> {
        self.check_online()?;
        self.insert_raw(key, value, ttl_seconds).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DurableError> {
        self.check_online()?;
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, DurableError> {
        self.check_online()?;
        let mut values = self.values.write().await;
        let before = values.len();
        values.retain(|key, _| !key.starts_with(prefix));
        Ok(before - values.len())
    }
}

//! Durable Store Module
//!
//! Adapter interface to the slower, shared key-value store that backs the
//! fast tier. Values cross this boundary as opaque bytes.

mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::DurableError;

pub use memory::MemoryDurableStore;

// == Durable Store Trait ==
/// Key-value backing store behind the fast tier.
///
/// Implementations report failures as [`DurableError`] and never panic; a
/// missing key is `Ok(None)`, not an error.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetches the bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, DurableError>;

    /// Stores `value` under `key` for `ttl_seconds`.
    async fn put(&self, key: &str, value: Bytes, ttl_seconds: u64) -> Result<(), DurableError>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), DurableError>;

    /// Removes every key starting with `prefix`, returning how many went away.
    ///
    /// Not every backing store can enumerate keys, so this is optional.
    async fn delete_prefix(&self, _prefix: &str) -> Result<usize, DurableError> {
        Err(DurableError::Unsupported("prefix deletion"))
    }
}

//! tiercache - A two-tier cache
//!
//! A bounded in-process fast tier with LRU / LFU / FIFO eviction and lazy TTL
//! expiry, backed by a slower durable key-value store with read-through and
//! write-through semantics.

pub mod api;
pub mod cache;
pub mod config;
pub mod durable;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheManager, CacheStats, PolicyKind};
pub use config::{CacheConfig, Config};
pub use durable::{DurableStore, MemoryDurableStore};
pub use error::{CacheError, DurableError};
pub use tasks::spawn_sweep_task;

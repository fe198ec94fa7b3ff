//! Background Tasks Module
//!
//! Contains background tasks that run periodically next to the cache.
//!
//! # Tasks
//! - Expiry sweep: purges stale fast-tier entries at a configured interval

mod sweep;

pub use sweep::spawn_sweep_task;

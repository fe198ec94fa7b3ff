//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::PolicyKind;

/// Which durable store the binary wires behind the fast tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurableBackend {
    /// In-process stand-in store
    Memory,
    /// Fast tier only
    None,
}

impl FromStr for DurableBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(DurableBackend::Memory),
            "none" | "off" => Ok(DurableBackend::None),
            other => Err(format!("unknown durable backend: {}", other)),
        }
    }
}

/// Cache manager parameters.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of fast-tier entries
    pub max_entries: usize,
    /// TTL in seconds for HTTP writes that do not name one
    pub default_ttl: u64,
    /// Eviction policy of the fast tier
    pub policy: PolicyKind,
    /// Total attempts for one durable write, first try included
    pub durable_write_attempts: u32,
    /// Delay before the first durable write retry; doubles per retry
    pub durable_retry_backoff: Duration,
    /// Whether `invalidate_prefix` also clears matching durable keys
    pub invalidate_durable_prefix: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 300,
            policy: PolicyKind::Lru,
            durable_write_attempts: 3,
            durable_retry_backoff: Duration::from_millis(50),
            invalidate_durable_prefix: false,
        }
    }
}

impl CacheConfig {
    /// Loads cache parameters from the environment.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum fast-tier entries (default: 1000)
    /// - `DEFAULT_TTL` - Backfill TTL in seconds (default: 300)
    /// - `EVICTION_POLICY` - `lru`, `lfu` or `fifo` (default: lru)
    /// - `DURABLE_WRITE_ATTEMPTS` - Attempts per durable write (default: 3)
    /// - `DURABLE_RETRY_BACKOFF_MS` - First retry delay (default: 50)
    /// - `INVALIDATE_DURABLE_PREFIX` - Prefix invalidation reaches the durable tier (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            policy: env_or("EVICTION_POLICY", defaults.policy),
            durable_write_attempts: env_or("DURABLE_WRITE_ATTEMPTS", defaults.durable_write_attempts)
                .max(1),
            durable_retry_backoff: Duration::from_millis(env_or(
                "DURABLE_RETRY_BACKOFF_MS",
                defaults.durable_retry_backoff.as_millis() as u64,
            )),
            invalidate_durable_prefix: env_or(
                "INVALIDATE_DURABLE_PREFIX",
                defaults.invalidate_durable_prefix,
            ),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache manager parameters
    pub cache: CacheConfig,
    /// Durable store wired behind the fast tier
    pub durable_backend: DurableBackend,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds, 0 disables the sweep
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - everything read by [`CacheConfig::from_env`]
    /// - `DURABLE_BACKEND` - `memory` or `none` (default: memory)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            cache: CacheConfig::from_env(),
            durable_backend: env_or("DURABLE_BACKEND", DurableBackend::Memory),
            server_port: env_or("SERVER_PORT", 3000),
            sweep_interval: env_or("SWEEP_INTERVAL", 1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            durable_backend: DurableBackend::Memory,
            server_port: 3000,
            sweep_interval: 1,
        }
    }
}

/// Reads and parses `name`, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value {:?} for {}", raw, name);
            default
        }),
        Err(_) => default,
    }
}

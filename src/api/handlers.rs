//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheManager, MAX_KEY_LENGTH};
use crate::config::{Config, DurableBackend};
use crate::durable::MemoryDurableStore;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, InvalidateResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the one cache manager of this process.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache manager
    pub cache: Arc<CacheManager>,
}

impl AppState {
    /// Wraps an already built cache manager.
    pub fn new(cache: CacheManager) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Builds the cache manager described by the configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = CacheManager::new(config.cache.clone());
        let cache = match config.durable_backend {
            DurableBackend::Memory => cache.with_durable(Arc::new(MemoryDurableStore::new())),
            DurableBackend::None => cache,
        };
        Self::new(cache)
    }
}

/// Keys arriving over HTTP must be non-empty and at most `MAX_KEY_LENGTH` bytes.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// Handler for PUT /cache/:key
///
/// Stores a JSON value with optional TTL, writing through to the durable store.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    validate_key(&key)?;
    let ttl = req.ttl_or(state.cache.config().default_ttl);
    state.cache.set(&key, &req.value, ttl).await?;

    Ok(Json(SetResponse::new(key, ttl)))
}

/// Handler for GET /cache/:key
///
/// Reads through both tiers; 404 on a miss.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get::<Value>(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
///
/// Removes the key from both tiers. Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.cache.delete(&key).await;
    Json(DeleteResponse::new(key))
}

/// Handler for DELETE /prefix/:prefix
///
/// Drops every fast-tier entry under the prefix.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.cache.invalidate_prefix(&prefix).await;
    Json(InvalidateResponse::new(prefix, removed))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let config = state.cache.config();

    Json(StatsResponse::new(
        stats,
        config.policy.to_string(),
        config.max_entries,
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.has_durable()))
}

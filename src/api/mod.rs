//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `PUT /cache/:key` - Store a JSON value
//! - `GET /cache/:key` - Read a value
//! - `DELETE /cache/:key` - Delete a key
//! - `DELETE /prefix/:prefix` - Invalidate a key prefix
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

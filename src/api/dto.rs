//! Data Transfer Objects
//!
//! Response types of the shell's own endpoints. Actions answer with
//! [`crate::events::Outcome`] directly.

use serde::Serialize;

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded, unhealthy
    pub status: String,
    /// Local storage status
    pub storage: String,
    /// Shop backend status
    pub backend: String,
    /// Articles in the cart
    pub cart_items: u32,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

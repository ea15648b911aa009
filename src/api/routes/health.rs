//! Health Routes
//!
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health/ready - Readiness check (local storage usable)
//! - GET /health - Full health status including the shop backend

use axum::{extract::State, http::StatusCode, Json};

use crate::api::dto::HealthResponse;
use crate::api::state::ShellState;
use crate::storage::keys;

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// The storefront works offline from the built-in catalog, so only local
/// storage is required.
pub async fn readiness(State(state): State<ShellState>) -> StatusCode {
    if check_storage_health(&state) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<ShellState>) -> Json<HealthResponse> {
    let storage_ok = check_storage_health(&state);
    let backend_ok = check_backend_health(&state).await;

    let overall_status = match (storage_ok, backend_ok) {
        (true, true) => "healthy",
        (true, false) => "degraded",
        _ => "unhealthy",
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        storage: if storage_ok { "ok" } else { "error" }.to_string(),
        backend: if backend_ok { "ok" } else { "unreachable" }.to_string(),
        cart_items: state.store.with_state(|s| s.cart_count()),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn check_storage_health(state: &ShellState) -> bool {
    match state.store.storage().get_item(keys::CART) {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Local storage unhealthy");
            false
        }
    }
}

async fn check_backend_health(state: &ShellState) -> bool {
    match state.backend.categories().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Backend unreachable");
            false
        }
    }
}

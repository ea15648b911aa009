//! Storefront Shell
//!
//! Local HTTP server that hosts the storefront, built with Axum. Pages are
//! rendered server-side through the [`Router`](crate::router::Router); the
//! page script posts delegated events back and swaps in the changed regions.
//!
//! # Endpoints
//!
//! ## Pages
//! - `GET /` and `GET /*path` - Full page for a storefront location
//!
//! ## Actions
//! - `POST /_action` - Apply a delegated event, returns the region patch
//!
//! ## Assets
//! - `GET /css/style.css` - Stylesheet
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use casapetrada::api::{serve, ShellState};
//! use casapetrada::backend::{BackendClient, BackendConfig};
//! use casapetrada::config::Config;
//! use casapetrada::store::Store;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let backend = Arc::new(BackendClient::new(config.backend.client_config())?);
//!     let store = Store::in_memory(backend.clone());
//!
//!     let state = ShellState::new(store, backend, config.clone());
//!     serve(state, &config.shell).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ShellError, ShellResult};
pub use state::ShellState;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ShellConfig;

/// Build the shell router with all routes and middleware
pub fn build_router(state: ShellState) -> Router {
    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    Router::new()
        .route("/_action", post(routes::actions::dispatch_action))
        .route("/css/style.css", get(routes::assets::stylesheet))
        .nest("/health", health_routes)
        .route("/", get(routes::pages::render_page))
        .route("/*path", get(routes::pages::render_page))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the shell server
pub async fn serve(state: ShellState, config: &ShellConfig) -> Result<(), ShellError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Casa Petrada storefront listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ShellError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Storefront shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

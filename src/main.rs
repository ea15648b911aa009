//! Casa Petrada Storefront
//!
//! Run with: cargo run --bin casapetrada
//!
//! # Configuration
//!
//! Read from `config.toml` (user config dir, `/etc/casapetrada`, or the
//! working directory), then overridden by environment variables:
//! - `CASAPETRADA_HOST`, `CASAPETRADA_PORT`: Address of the local shell
//! - `CASAPETRADA_API_URL`: Shop backend base URL
//! - `CASAPETRADA_DATA_DIR`: Where cart, wishlist and session are kept
//! - `CASAPETRADA_LOG_LEVEL`, `CASAPETRADA_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely

use casapetrada::api::{serve, ShellState};
use casapetrada::backend::{Backend, BackendClient, ProductQuery};
use casapetrada::config::{Config, LoggingConfig};
use casapetrada::storage::{keys, FileStorage, LocalStorage, MemoryStorage};
use casapetrada::store::Store;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Casa Petrada storefront v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Backend: {}", config.backend.base_url);
    tracing::info!("Data directory: {}", config.storage.data_dir);

    let storage: Arc<dyn LocalStorage> = match FileStorage::in_dir(&config.storage.data_dir) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            tracing::warn!("Cannot open local storage ({}), session will not persist", e);
            Arc::new(MemoryStorage::new())
        }
    };
    let backend: Arc<dyn Backend> = Arc::new(BackendClient::new(config.backend.client_config())?);

    let store = Store::new(Arc::clone(&storage), Arc::clone(&backend));

    if matches!(storage.get_item(keys::PREFERRED_LANGUAGE), Ok(None)) {
        store.set_language(config.shop.language());
    }

    let _changes = store.subscribe(|state| {
        tracing::debug!(
            cart_items = state.cart_count(),
            wishlist = state.wishlist.len(),
            signed_in = state.is_authenticated(),
            "State changed"
        );
    });

    match store.check_auth_status().await {
        Ok(Some(user)) => tracing::info!("Restored session for {}", user.email),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Could not verify stored session: {}", e);
            store.dismiss_toast();
            store.clear_error();
        }
    }

    match store.load_products(&ProductQuery::default()).await {
        Ok(count) => tracing::info!("Loaded {} products from backend", count),
        Err(e) => {
            tracing::warn!("Backend unavailable ({}), using built-in catalog", e);
            store.dismiss_toast();
            store.clear_error();
        }
    }

    let state = ShellState::new(store, backend, config.clone());
    serve(state, &config.shell).await?;

    tracing::info!("Casa Petrada storefront stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.directive().into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

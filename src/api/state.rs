//! Shell State
//!
//! Shared state for all handlers. The router owns the rendered document, so
//! requests are serialized through its lock.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::backend::Backend;
use crate::config::Config;
use crate::router::Router;
use crate::store::Store;

/// Shared state of the storefront shell
#[derive(Clone)]
pub struct ShellState {
    pub router: Arc<Mutex<Router>>,
    pub store: Store,
    pub backend: Arc<dyn Backend>,
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl ShellState {
    pub fn new(store: Store, backend: Arc<dyn Backend>, config: Config) -> Self {
        let router = Router::new(store.clone(), config.shop.clone());
        Self {
            router: Arc::new(Mutex::new(router)),
            store,
            backend,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

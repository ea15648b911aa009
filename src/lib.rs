//! # Casa Petrada
//!
//! Storefront for a small boho jewelry and fashion shop: a client-side view
//! router, an observable application store, declarative form validation and
//! a typed façade over the shop's REST backend, hosted by a local shell
//! server.
//!
//! ## Modules
//!
//! - [`router`]: URL to view mapping, history and the region-diffing document
//! - [`views`]: page renderers over a store snapshot
//! - [`store`]: application state, persistence and change notification
//! - [`validation`]: per-field form rules
//! - [`backend`]: REST client for the shop backend
//! - [`events`]: delegated page events and their dispatch
//! - [`api`]: local HTTP shell with Axum
//! - [`storage`]: `localStorage`-like key/value persistence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use casapetrada::backend::{BackendClient, BackendConfig};
//! use casapetrada::config::ShopConfig;
//! use casapetrada::router::Router;
//! use casapetrada::store::Store;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(BackendClient::new(BackendConfig::default())?);
//!     let store = Store::in_memory(backend);
//!
//!     let mut router = Router::new(store, ShopConfig::default());
//!     let navigation = router.navigate("/product/2", true);
//!     println!("{} ({} regions changed)", navigation.title, navigation.patch.regions.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod events;
pub mod html;
pub mod money;
pub mod router;
pub mod storage;
pub mod store;
pub mod validation;
pub mod views;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ShellError, ShellState};

pub use backend::{Backend, BackendClient, BackendConfig, BackendError, BackendResult};

pub use catalog::{Catalog, Category, Product, ProductId};

pub use config::{Config, ConfigError, LoggingConfig, ShopConfig};

pub use events::{Action, DelegatedEvent, EventError, Outcome};

pub use html::Html;

pub use money::Money;

pub use router::{Navigation, Router, ViewId};

pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError, StorageResult};

pub use store::{AppState, Store, StoreError, StoreResult, Subscription};

pub use validation::{FormData, FormValidator, Rule, ValidationResult};

//! Local Storage
//!
//! Persistence for the client-side session: cart, wishlist, signed-in user,
//! access token and a few preferences.
//!
//! - **local**: the [`LocalStorage`] trait with memory and file backends
//! - **keys**: the storage key names
//! - **error**: error types

pub mod error;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use local::{get_json, set_json, FileStorage, LocalStorage, MemoryStorage};

/// Storage key names
pub mod keys {
    pub const CART: &str = "casapetrada_cart";
    pub const WISHLIST: &str = "casapetrada_wishlist";
    pub const USER: &str = "casapetrada_user";
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const SEARCH_HISTORY: &str = "search-history";
    pub const PREFERRED_LANGUAGE: &str = "preferred-language";
    pub const CONTACT_SUBMISSIONS: &str = "contact_submissions";
    pub const ORDERS: &str = "orders";

    /// Keys written by an older, independent cart implementation
    pub const LEGACY_CART: &str = "cart";
    pub const LEGACY_WISHLIST: &str = "wishlist";
}

//! Application Store
//!
//! Single source of truth for cross-view state. Every mutation replaces the
//! [`AppState`], mirrors the persisted subset to local storage and notifies
//! all subscribers before returning.

mod app_store;
pub mod checkout;
pub mod error;
pub mod state;

pub use app_store::{Listener, Store, Subscription};
pub use checkout::{CheckoutDetails, OrderTotals, ShippingPolicy, PAYMENT_METHODS};
pub use error::{StoreError, StoreResult};
pub use state::{
    AppState, CartItem, ContactSubmission, FormFeedback, FormId, Language, OrderLine,
    OrderSummary, Toast, ToastKind, SEARCH_HISTORY_LIMIT,
};

//! Store error types

use thiserror::Error;

use crate::backend::BackendError;
use crate::catalog::ProductId;

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend call failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The operation needs a signed-in user
    #[error("Not signed in")]
    NotAuthenticated,

    /// Checkout with an empty cart
    #[error("Cart is empty")]
    EmptyCart,

    /// Product id not present in the catalog
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// Order status outside the backend's set
    #[error("Unknown order status: {0}")]
    UnknownOrderStatus(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(StoreError::UnknownProduct(42).to_string(), "Unknown product: 42");
        let err: StoreError = BackendError::Unauthorized.into();
        assert_eq!(err.to_string(), "Backend error: Not authenticated");
    }
}

//! Shop Backend
//!
//! The REST façade the store talks to. [`Backend`] is the seam: the
//! storefront uses [`BackendClient`] (reqwest), tests plug in fakes.
//!
//! # Endpoints used
//!
//! - `POST /auth/login`, `POST /auth/register`, `GET /auth/me`
//! - `GET /products/`, `GET /products/:id`, `GET /products/categories`
//! - `POST /orders/`, `GET /orders/`
//! - `GET /reviews/product/:id`, `GET /reviews/product/:id/stats`, `POST /reviews/`
//! - `POST /newsletter/subscribe`, `POST /newsletter/unsubscribe`
//! - `POST /contact/`
//! - `GET /admin/stats`, `GET /admin/orders/recent`, `GET /admin/customers`,
//!   `GET /admin/analytics`
//! - `PUT /admin/orders/:id/status`, `PUT /admin/products/:id/featured`

pub mod client;
pub mod dto;
pub mod error;

#[cfg(test)]
pub mod fake;

pub use client::{BackendClient, BackendConfig, DEFAULT_API_BASE};
pub use dto::{
    AdminAnalytics, AdminCustomer, AdminCustomerList, AdminOrder, AdminStats, AnalyticsRange,
    ContactForm, LoginRequest, NewsletterRequest, NewsletterUnsubscribeRequest, OrderCreate,
    OrderItemCreate, OrderResponse, ProductQuery, RegisterRequest, Review, ReviewCreate,
    ReviewStats, User, ORDER_STATUSES,
};
pub use error::{BackendError, BackendResult};

use async_trait::async_trait;

use crate::catalog::ProductId;
use dto::{
    AdminOrderList, CategoryResponse, ContactResponse, FeaturedResponse, MessageResponse,
    NewsletterResponse, OrderStatusResponse, ProductListResponse, ProductResponse, TokenResponse,
};

/// Operations offered by the shop backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Exchange credentials for an access token
    async fn login(&self, request: &LoginRequest) -> BackendResult<TokenResponse>;

    /// Create a customer account
    async fn register(&self, request: &RegisterRequest) -> BackendResult<User>;

    /// Resolve the user behind a token
    async fn current_user(&self, token: &str) -> BackendResult<User>;

    async fn list_products(&self, query: &ProductQuery) -> BackendResult<ProductListResponse>;

    async fn get_product(&self, id: ProductId) -> BackendResult<ProductResponse>;

    async fn categories(&self) -> BackendResult<Vec<CategoryResponse>>;

    /// Place an order; guests pass no token
    async fn create_order(
        &self,
        token: Option<&str>,
        order: &OrderCreate,
    ) -> BackendResult<OrderResponse>;

    async fn list_orders(&self, token: &str) -> BackendResult<Vec<OrderResponse>>;

    async fn product_reviews(&self, id: ProductId) -> BackendResult<Vec<Review>>;

    /// Average and distribution of approved ratings
    async fn review_stats(&self, id: ProductId) -> BackendResult<ReviewStats>;

    async fn create_review(
        &self,
        token: Option<&str>,
        review: &ReviewCreate,
    ) -> BackendResult<Review>;

    async fn subscribe_newsletter(
        &self,
        request: &NewsletterRequest,
    ) -> BackendResult<NewsletterResponse>;

    async fn unsubscribe_newsletter(
        &self,
        request: &NewsletterUnsubscribeRequest,
    ) -> BackendResult<MessageResponse>;

    async fn submit_contact(&self, form: &ContactForm) -> BackendResult<ContactResponse>;

    /// Dashboard numbers, admin token required
    async fn admin_stats(&self, token: &str) -> BackendResult<AdminStats>;

    async fn admin_recent_orders(&self, token: &str, limit: u32) -> BackendResult<AdminOrderList>;

    async fn admin_customers(
        &self,
        token: &str,
        skip: u32,
        limit: u32,
    ) -> BackendResult<AdminCustomerList>;

    async fn admin_analytics(
        &self,
        token: &str,
        range: AnalyticsRange,
    ) -> BackendResult<AdminAnalytics>;

    async fn update_order_status(
        &self,
        token: &str,
        order_id: u32,
        status: &str,
    ) -> BackendResult<OrderStatusResponse>;

    /// Flip the featured flag of a product
    async fn toggle_product_featured(
        &self,
        token: &str,
        id: ProductId,
    ) -> BackendResult<FeaturedResponse>;
}

//! Benchmarks for routing, rendering and validation
//!
//! Run with: cargo bench

use casapetrada::backend::{
    AdminAnalytics, AdminCustomerList, AdminStats, AnalyticsRange, Backend, BackendResult,
    ContactForm, LoginRequest, NewsletterRequest, NewsletterUnsubscribeRequest, OrderCreate,
    OrderResponse, ProductQuery, RegisterRequest, Review, ReviewCreate, ReviewStats, User,
};
use casapetrada::backend::BackendError;
use casapetrada::backend::dto::{
    AdminOrderList, CategoryResponse, ContactResponse, FeaturedResponse, MessageResponse,
    NewsletterResponse, OrderStatusResponse, ProductListResponse, ProductResponse, TokenResponse,
};
use casapetrada::catalog::{Catalog, ProductId};
use casapetrada::config::ShopConfig;
use casapetrada::router::{RouteTable, Router};
use casapetrada::store::Store;
use casapetrada::validation::{FormData, FormValidator};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

/// Backend that is never reached while rendering
struct Offline;

#[async_trait::async_trait]
impl Backend for Offline {
    async fn login(&self, _: &LoginRequest) -> BackendResult<TokenResponse> {
        Err(BackendError::Unavailable)
    }
    async fn register(&self, _: &RegisterRequest) -> BackendResult<User> {
        Err(BackendError::Unavailable)
    }
    async fn current_user(&self, _: &str) -> BackendResult<User> {
        Err(BackendError::Unavailable)
    }
    async fn list_products(&self, _: &ProductQuery) -> BackendResult<ProductListResponse> {
        Err(BackendError::Unavailable)
    }
    async fn get_product(&self, _: ProductId) -> BackendResult<ProductResponse> {
        Err(BackendError::Unavailable)
    }
    async fn categories(&self) -> BackendResult<Vec<CategoryResponse>> {
        Err(BackendError::Unavailable)
    }
    async fn create_order(&self, _: Option<&str>, _: &OrderCreate) -> BackendResult<OrderResponse> {
        Err(BackendError::Unavailable)
    }
    async fn list_orders(&self, _: &str) -> BackendResult<Vec<OrderResponse>> {
        Err(BackendError::Unavailable)
    }
    async fn product_reviews(&self, _: ProductId) -> BackendResult<Vec<Review>> {
        Err(BackendError::Unavailable)
    }
    async fn review_stats(&self, _: ProductId) -> BackendResult<ReviewStats> {
        Err(BackendError::Unavailable)
    }
    async fn create_review(&self, _: Option<&str>, _: &ReviewCreate) -> BackendResult<Review> {
        Err(BackendError::Unavailable)
    }
    async fn subscribe_newsletter(&self, _: &NewsletterRequest) -> BackendResult<NewsletterResponse> {
        Err(BackendError::Unavailable)
    }
    async fn unsubscribe_newsletter(
        &self,
        _: &NewsletterUnsubscribeRequest,
    ) -> BackendResult<MessageResponse> {
        Err(BackendError::Unavailable)
    }
    async fn submit_contact(&self, _: &ContactForm) -> BackendResult<ContactResponse> {
        Err(BackendError::Unavailable)
    }
    async fn admin_stats(&self, _: &str) -> BackendResult<AdminStats> {
        Err(BackendError::Unavailable)
    }
    async fn admin_recent_orders(&self, _: &str, _: u32) -> BackendResult<AdminOrderList> {
        Err(BackendError::Unavailable)
    }
    async fn admin_customers(&self, _: &str, _: u32, _: u32) -> BackendResult<AdminCustomerList> {
        Err(BackendError::Unavailable)
    }
    async fn admin_analytics(&self, _: &str, _: AnalyticsRange) -> BackendResult<AdminAnalytics> {
        Err(BackendError::Unavailable)
    }
    async fn update_order_status(&self, _: &str, _: u32, _: &str) -> BackendResult<OrderStatusResponse> {
        Err(BackendError::Unavailable)
    }
    async fn toggle_product_featured(&self, _: &str, _: ProductId) -> BackendResult<FeaturedResponse> {
        Err(BackendError::Unavailable)
    }
}

fn bench_route_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("routes");
    let table = RouteTable::storefront();

    group.bench_function("resolve_static", |b| {
        b.iter(|| table.resolve(black_box("/datenschutz")))
    });

    group.bench_function("resolve_dynamic", |b| {
        b.iter(|| table.resolve(black_box("/order-confirmation/CP-00042")))
    });

    group.bench_function("resolve_miss", |b| {
        b.iter(|| table.resolve(black_box("/does/not/exist")))
    });

    group.finish();
}

fn bench_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation");

    let store = Store::in_memory(Arc::new(Offline));
    let catalog = Catalog::builtin();
    for product in catalog.products().iter().take(3) {
        store.add_to_cart(product, 2);
    }
    let mut router = Router::new(store, ShopConfig::default());

    for path in ["/", "/products?sort=price-asc", "/product/2", "/cart", "/checkout"] {
        group.bench_function(format!("navigate {}", path), |b| {
            b.iter(|| router.navigate(black_box(path), false))
        });
    }

    group.bench_function("refresh_unchanged", |b| {
        router.navigate("/products", false);
        b.iter(|| router.refresh())
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");
    let validator = FormValidator::checkout();

    let form: FormData = [
        ("first_name", "Ana"),
        ("last_name", "Lopez"),
        ("email", "ana@example.com"),
        ("phone", "+49 30 1234567"),
        ("street", "Hauptstr. 1"),
        ("postal_code", "10115"),
        ("city", "Berlin"),
        ("payment_method", "paypal"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    group.bench_function("checkout_valid", |b| {
        b.iter(|| validator.validate(black_box(&form)))
    });

    let empty = FormData::new();
    group.bench_function("checkout_empty", |b| {
        b.iter(|| validator.validate(black_box(&empty)))
    });

    group.finish();
}

criterion_group!(benches, bench_route_matching, bench_navigation, bench_validation);
criterion_main!(benches);

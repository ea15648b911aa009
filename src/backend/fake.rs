//! In-process backend used by unit tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::dto::*;
use super::error::{BackendError, BackendResult};
use super::Backend;
use crate::catalog::ProductId;

#[derive(Default)]
pub struct FakeBackend {
    offline: AtomicBool,
    accounts: Mutex<Vec<(String, String, User)>>,
    pub products: Mutex<Vec<ProductResponse>>,
    pub orders: Mutex<Vec<OrderCreate>>,
    pub newsletter: Mutex<Vec<String>>,
    pub contacts: Mutex<Vec<ContactForm>>,
    pub reviews: Mutex<Vec<Review>>,
    /// Status set from the dashboard, by order id
    pub order_statuses: Mutex<BTreeMap<u32, String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        let backend = Self::default();
        backend.offline.store(true, Ordering::SeqCst);
        backend
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn with_account(self, email: &str, password: &str, is_admin: bool) -> Self {
        let id = self.accounts.lock().unwrap().len() as u32 + 1;
        let user = User {
            id,
            email: email.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            is_active: true,
            is_admin,
            newsletter_subscribed: false,
        };
        self.accounts
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string(), user));
        self
    }

    pub fn with_product(self, id: ProductId, name: &str, price: f64) -> Self {
        let product: ProductResponse = serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "slug": name.to_lowercase().replace(' ', "-"),
            "price": price,
        }))
        .unwrap();
        self.products.lock().unwrap().push(product);
        self
    }

    pub fn token_for(email: &str) -> String {
        format!("token-{}", email)
    }

    fn check(&self) -> BackendResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn admin_for_token(&self, token: &str) -> BackendResult<User> {
        let user = self.user_for_token(token)?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(BackendError::Unauthorized)
        }
    }

    fn status_of(&self, order_id: u32) -> String {
        self.order_statuses
            .lock()
            .unwrap()
            .get(&order_id)
            .cloned()
            .unwrap_or_else(|| "pending".to_string())
    }

    fn user_for_token(&self, token: &str) -> BackendResult<User> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(email, _, _)| Self::token_for(email) == token)
            .map(|(_, _, user)| user.clone())
            .ok_or(BackendError::Unauthorized)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, request: &LoginRequest) -> BackendResult<TokenResponse> {
        self.check()?;
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|(email, password, _)| *email == request.email && *password == request.password)
            .map(|(email, _, _)| TokenResponse {
                access_token: Self::token_for(email),
                token_type: "bearer".to_string(),
            })
            .ok_or(BackendError::Unauthorized)
    }

    async fn register(&self, request: &RegisterRequest) -> BackendResult<User> {
        self.check()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|(email, _, _)| *email == request.email) {
            return Err(BackendError::Api {
                status: 400,
                message: "E-Mail bereits registriert".to_string(),
            });
        }
        let user = User {
            id: accounts.len() as u32 + 1,
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            is_active: true,
            is_admin: false,
            newsletter_subscribed: request.newsletter_subscribed,
        };
        accounts.push((request.email.clone(), request.password.clone(), user.clone()));
        Ok(user)
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        self.check()?;
        self.user_for_token(token)
    }

    async fn list_products(&self, query: &ProductQuery) -> BackendResult<ProductListResponse> {
        self.check()?;
        let products: Vec<ProductResponse> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                query.category.as_ref().map_or(true, |slug| {
                    p.category.as_ref().map(|c| &c.slug) == Some(slug)
                })
            })
            .cloned()
            .collect();
        Ok(ProductListResponse {
            total: products.len() as u32,
            products,
            skip: 0,
            limit: 20,
        })
    }

    async fn get_product(&self, id: ProductId) -> BackendResult<ProductResponse> {
        self.check()?;
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("/products/{}", id)))
    }

    async fn categories(&self) -> BackendResult<Vec<CategoryResponse>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn create_order(
        &self,
        _token: Option<&str>,
        order: &OrderCreate,
    ) -> BackendResult<OrderResponse> {
        self.check()?;
        let mut orders = self.orders.lock().unwrap();
        orders.push(order.clone());
        let id = orders.len() as u32;
        Ok(OrderResponse {
            id,
            order_number: format!("CP-{:05}", id),
            status: "pending".to_string(),
            total_amount: order.total_amount,
            created_at: Utc::now(),
            items: Vec::new(),
        })
    }

    async fn list_orders(&self, token: &str) -> BackendResult<Vec<OrderResponse>> {
        self.check()?;
        self.user_for_token(token)?;
        let orders = self.orders.lock().unwrap();
        Ok(orders
            .iter()
            .enumerate()
            .map(|(i, o)| OrderResponse {
                id: i as u32 + 1,
                order_number: format!("CP-{:05}", i + 1),
                status: "confirmed".to_string(),
                total_amount: o.total_amount,
                created_at: Utc::now(),
                items: o
                    .items
                    .iter()
                    .map(|item| OrderItemResponse {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        price: item.price,
                        product_name: None,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn product_reviews(&self, id: ProductId) -> BackendResult<Vec<Review>> {
        self.check()?;
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.product_id == id)
            .cloned()
            .collect())
    }

    async fn review_stats(&self, id: ProductId) -> BackendResult<ReviewStats> {
        self.check()?;
        let reviews = self.reviews.lock().unwrap();
        let ratings: Vec<u8> = reviews
            .iter()
            .filter(|r| r.product_id == id)
            .map(|r| r.rating)
            .collect();
        let mut distribution: BTreeMap<u8, u32> = (1..=5).map(|star| (star, 0)).collect();
        for rating in &ratings {
            *distribution.entry(*rating).or_default() += 1;
        }
        let average = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64
        };
        Ok(ReviewStats {
            average_rating: (average * 10.0).round() / 10.0,
            total_reviews: ratings.len() as u32,
            rating_distribution: distribution,
        })
    }

    async fn create_review(
        &self,
        _token: Option<&str>,
        review: &ReviewCreate,
    ) -> BackendResult<Review> {
        self.check()?;
        let mut reviews = self.reviews.lock().unwrap();
        let created = Review {
            id: reviews.len() as u32 + 1,
            product_id: review.product_id,
            rating: review.rating,
            title: review.title.clone(),
            comment: review.comment.clone(),
            reviewer_name: review.reviewer_name.clone(),
            is_verified_purchase: false,
            created_at: Utc::now(),
        };
        reviews.push(created.clone());
        Ok(created)
    }

    async fn subscribe_newsletter(
        &self,
        request: &NewsletterRequest,
    ) -> BackendResult<NewsletterResponse> {
        self.check()?;
        let mut subscribers = self.newsletter.lock().unwrap();
        if subscribers.contains(&request.email) {
            return Err(BackendError::Api {
                status: 400,
                message: "Diese E-Mail-Adresse ist bereits für den Newsletter angemeldet."
                    .to_string(),
            });
        }
        subscribers.push(request.email.clone());
        Ok(NewsletterResponse {
            email: request.email.clone(),
            is_active: true,
        })
    }

    async fn unsubscribe_newsletter(
        &self,
        request: &NewsletterUnsubscribeRequest,
    ) -> BackendResult<MessageResponse> {
        self.check()?;
        let mut subscribers = self.newsletter.lock().unwrap();
        let before = subscribers.len();
        subscribers.retain(|e| *e != request.email);
        if subscribers.len() == before {
            return Err(BackendError::NotFound("/newsletter/unsubscribe".to_string()));
        }
        Ok(MessageResponse {
            message: "Abgemeldet".to_string(),
        })
    }

    async fn submit_contact(&self, form: &ContactForm) -> BackendResult<ContactResponse> {
        self.check()?;
        let mut contacts = self.contacts.lock().unwrap();
        contacts.push(form.clone());
        Ok(ContactResponse {
            message: "Ihre Nachricht wurde erfolgreich gesendet!".to_string(),
            contact_id: Some(format!("contact_{}", contacts.len())),
        })
    }

    async fn admin_stats(&self, token: &str) -> BackendResult<AdminStats> {
        self.check()?;
        self.admin_for_token(token)?;
        Ok(AdminStats {
            overview: AdminOverview {
                total_revenue: 15420.50,
                total_orders: self.orders.lock().unwrap().len() as u64,
                total_products: 8,
                total_customers: self.accounts.lock().unwrap().len() as u64,
            },
            recent_orders: Vec::new(),
            trends: AdminTrends::default(),
        })
    }

    async fn admin_recent_orders(&self, token: &str, limit: u32) -> BackendResult<AdminOrderList> {
        self.check()?;
        self.admin_for_token(token)?;
        let orders = self.orders.lock().unwrap();
        let field = |order: &OrderCreate, key: &str| {
            order.shipping_address.get(key).cloned().unwrap_or_default()
        };
        Ok(AdminOrderList {
            orders: orders
                .iter()
                .enumerate()
                .rev()
                .take(limit as usize)
                .map(|(i, o)| {
                    let id = i as u32 + 1;
                    AdminOrder {
                        id,
                        order_number: format!("CP-{:05}", id),
                        customer_name: format!("{} {}", field(o, "first_name"), field(o, "last_name")),
                        customer_email: field(o, "email"),
                        total_amount: o.total_amount,
                        status: self.status_of(id),
                        created_at: Some(Utc::now()),
                        items_count: o.items.len() as u32,
                    }
                })
                .collect(),
        })
    }

    async fn admin_customers(
        &self,
        token: &str,
        skip: u32,
        limit: u32,
    ) -> BackendResult<AdminCustomerList> {
        self.check()?;
        self.admin_for_token(token)?;
        let accounts = self.accounts.lock().unwrap();
        Ok(AdminCustomerList {
            customers: accounts
                .iter()
                .skip(skip as usize)
                .take(limit as usize)
                .map(|(_, _, user)| AdminCustomer {
                    id: user.id,
                    email: user.email.clone(),
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    created_at: None,
                    is_active: user.is_active,
                    newsletter_subscribed: user.newsletter_subscribed,
                })
                .collect(),
            total: accounts.len() as u64,
            skip,
            limit,
        })
    }

    async fn admin_analytics(
        &self,
        token: &str,
        _range: AnalyticsRange,
    ) -> BackendResult<AdminAnalytics> {
        self.check()?;
        self.admin_for_token(token)?;
        Ok(AdminAnalytics {
            revenue: TrendFigure {
                total: 15420.50,
                change_percentage: 12.5,
                trend: "up".to_string(),
            },
            top_products: vec![TopProduct {
                name: "KORSIKA - Boho Kette".to_string(),
                sales: 23,
                revenue: 1147.70,
            }],
            sales_by_category: vec![CategoryShare {
                category: "ketten".to_string(),
                percentage: 45.0,
            }],
            ..Default::default()
        })
    }

    async fn update_order_status(
        &self,
        token: &str,
        order_id: u32,
        status: &str,
    ) -> BackendResult<OrderStatusResponse> {
        self.check()?;
        self.admin_for_token(token)?;
        if order_id == 0 || order_id as usize > self.orders.lock().unwrap().len() {
            return Err(BackendError::NotFound(format!("/admin/orders/{}/status", order_id)));
        }
        self.order_statuses
            .lock()
            .unwrap()
            .insert(order_id, status.to_string());
        Ok(OrderStatusResponse {
            message: "Order status updated".to_string(),
            order_id,
            new_status: status.to_string(),
        })
    }

    async fn toggle_product_featured(
        &self,
        token: &str,
        id: ProductId,
    ) -> BackendResult<FeaturedResponse> {
        self.check()?;
        self.admin_for_token(token)?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("/admin/products/{}/featured", id)))?;
        product.is_featured = !product.is_featured;
        Ok(FeaturedResponse {
            message: "Product featured status updated".to_string(),
            product_id: id,
            is_featured: product.is_featured,
        })
    }
}

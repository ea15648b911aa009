//! Shop REST API Client
//!
//! HTTP client for the shop backend's `/api/v1` surface. Bodies are JSON,
//! authenticated calls carry `Authorization: Bearer <token>`. Failures are
//! returned to the caller as-is; there is no retry policy.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use super::dto::*;
use super::error::{BackendError, BackendResult};
use super::Backend;
use crate::catalog::ProductId;

/// Default backend base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL including the version prefix (e.g. "http://localhost:8000/api/v1")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// reqwest-based implementation of [`Backend`]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client with the given configuration
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> BackendResult<T> {
        let request = Self::authorize(self.client.get(self.url(path)), token);
        tracing::debug!(path, "GET backend");
        let response = request.send().await.map_err(BackendError::from_transport)?;
        Self::decode(path, response).await
    }

    async fn post<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> BackendResult<T> {
        let request = Self::authorize(self.client.post(self.url(path)).json(body), token);
        tracing::debug!(path, "POST backend");
        let response = request.send().await.map_err(BackendError::from_transport)?;
        Self::decode(path, response).await
    }

    async fn put<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> BackendResult<T> {
        let mut request = self.client.put(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = Self::authorize(request, token);
        tracing::debug!(path, "PUT backend");
        let response = request.send().await.map_err(BackendError::from_transport)?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> BackendResult<T> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| BackendError::Decode(e.to_string()));
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BackendError::Unauthorized),
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(path.to_string())),
            _ => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorDetail>(&text)
                    .map(|d| d.message())
                    .unwrap_or(text);

                tracing::warn!(path, status = status.as_u16(), %message, "Backend call failed");

                Err(BackendError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn login(&self, request: &LoginRequest) -> BackendResult<TokenResponse> {
        self.post("/auth/login", request, None).await
    }

    async fn register(&self, request: &RegisterRequest) -> BackendResult<User> {
        self.post("/auth/register", request, None).await
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        self.get("/auth/me", Some(token)).await
    }

    async fn list_products(&self, query: &ProductQuery) -> BackendResult<ProductListResponse> {
        let qs = query.to_query_string();
        let path = if qs.is_empty() {
            "/products/".to_string()
        } else {
            format!("/products/?{}", qs)
        };
        self.get(&path, None).await
    }

    async fn get_product(&self, id: ProductId) -> BackendResult<ProductResponse> {
        self.get(&format!("/products/{}", id), None).await
    }

    async fn categories(&self) -> BackendResult<Vec<CategoryResponse>> {
        self.get("/products/categories", None).await
    }

    async fn create_order(
        &self,
        token: Option<&str>,
        order: &OrderCreate,
    ) -> BackendResult<OrderResponse> {
        self.post("/orders/", order, token).await
    }

    async fn list_orders(&self, token: &str) -> BackendResult<Vec<OrderResponse>> {
        self.get("/orders/", Some(token)).await
    }

    async fn product_reviews(&self, id: ProductId) -> BackendResult<Vec<Review>> {
        self.get(&format!("/reviews/product/{}", id), None).await
    }

    async fn review_stats(&self, id: ProductId) -> BackendResult<ReviewStats> {
        self.get(&format!("/reviews/product/{}/stats", id), None).await
    }

    async fn create_review(
        &self,
        token: Option<&str>,
        review: &ReviewCreate,
    ) -> BackendResult<Review> {
        self.post("/reviews/", review, token).await
    }

    async fn subscribe_newsletter(
        &self,
        request: &NewsletterRequest,
    ) -> BackendResult<NewsletterResponse> {
        self.post("/newsletter/subscribe", request, None).await
    }

    async fn unsubscribe_newsletter(
        &self,
        request: &NewsletterUnsubscribeRequest,
    ) -> BackendResult<MessageResponse> {
        self.post("/newsletter/unsubscribe", request, None).await
    }

    async fn submit_contact(&self, form: &ContactForm) -> BackendResult<ContactResponse> {
        self.post("/contact/", form, None).await
    }

    async fn admin_stats(&self, token: &str) -> BackendResult<AdminStats> {
        self.get("/admin/stats", Some(token)).await
    }

    async fn admin_recent_orders(&self, token: &str, limit: u32) -> BackendResult<AdminOrderList> {
        self.get(&format!("/admin/orders/recent?limit={}", limit), Some(token))
            .await
    }

    async fn admin_customers(
        &self,
        token: &str,
        skip: u32,
        limit: u32,
    ) -> BackendResult<AdminCustomerList> {
        self.get(
            &format!("/admin/customers?skip={}&limit={}", skip, limit),
            Some(token),
        )
        .await
    }

    async fn admin_analytics(
        &self,
        token: &str,
        range: AnalyticsRange,
    ) -> BackendResult<AdminAnalytics> {
        self.get(&format!("/admin/analytics?range={}", range.as_str()), Some(token))
            .await
    }

    async fn update_order_status(
        &self,
        token: &str,
        order_id: u32,
        status: &str,
    ) -> BackendResult<OrderStatusResponse> {
        self.put(
            &format!("/admin/orders/{}/status", order_id),
            Some(&OrderStatusUpdate { status }),
            Some(token),
        )
        .await
    }

    async fn toggle_product_featured(
        &self,
        token: &str,
        id: ProductId,
    ) -> BackendResult<FeaturedResponse> {
        self.put::<(), _>(&format!("/admin/products/{}/featured", id), None, Some(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = BackendClient::new(BackendConfig::new("http://shop.test/api/v1/")).unwrap();
        assert_eq!(client.base_url(), "http://shop.test/api/v1");
        assert_eq!(client.url("/auth/me"), "http://shop.test/api/v1/auth/me");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:9/api/v1".to_string(),
            request_timeout_ms: 2_000,
        };
        let client = BackendClient::new(config).unwrap();

        let err = client.categories().await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Unavailable | BackendError::Timeout | BackendError::Request(_)
        ));
    }
}

//! Backend Data Transfer Objects
//!
//! Request and response bodies of the shop's `/api/v1` REST surface.
//! Amounts travel as decimal euros on the wire and are converted to
//! [`Money`] at this boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{Category, Product, ProductId};
use crate::money::Money;

// ============================================
// AUTH DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub newsletter_subscribed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// The signed-in customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub newsletter_subscribed: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ============================================
// PRODUCT DTOs
// ============================================

/// Query parameters for `GET /products`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ProductQuery {
    /// Encode as a query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(skip) = self.skip {
            parts.push(format!("skip={}", skip));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }
        if let Some(category) = &self.category {
            parts.push(format!("category={}", urlencoding::encode(category)));
        }
        if let Some(featured) = self.featured {
            parts.push(format!("featured={}", featured));
        }
        if let Some(search) = &self.search {
            parts.push(format!("search={}", urlencoding::encode(search)));
        }
        parts.join("&")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryResponse {
    pub id: u32,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: u32,
}

impl From<CategoryResponse> for Category {
    fn from(c: CategoryResponse) -> Self {
        Category::new(c.name, c.slug, c.description.unwrap_or_default(), c.sort_order)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductImageResponse {
    pub image_url: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub sort_order: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub care_instructions: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_bestseller: bool,
    #[serde(default)]
    pub is_new_arrival: bool,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(default)]
    pub is_handmade: bool,
    #[serde(default)]
    pub category: Option<CategoryResponse>,
    #[serde(default)]
    pub images: Vec<ProductImageResponse>,
}

impl From<ProductResponse> for Product {
    fn from(p: ProductResponse) -> Self {
        let image = p
            .images
            .iter()
            .find(|i| i.is_primary)
            .or_else(|| p.images.iter().min_by_key(|i| i.sort_order))
            .map(|i| i.image_url.clone());

        let mut product = Product::new(p.id, p.name, p.slug, Money::from_euros(p.price));
        if let Some(image) = image {
            product.image = image;
        }
        product.description = p.description.unwrap_or_default();
        product.short_description = p.short_description.unwrap_or_default();
        product.compare_at_price = p.compare_at_price.map(Money::from_euros);
        product.category = p.category.map(|c| c.slug);
        product.material = p.material;
        product.care_instructions = p.care_instructions;
        product.inventory_quantity = p.inventory_quantity.max(0) as u32;
        product.is_featured = p.is_featured;
        product.is_bestseller = p.is_bestseller;
        product.is_new_arrival = p.is_new_arrival;
        product.is_sale = p.is_sale;
        product.is_handmade = p.is_handmade;
        product
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total: u32,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub limit: u32,
}

// ============================================
// ORDER DTOs
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemCreate {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price in euros
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItemCreate>,
    pub total_amount: f64,
    pub shipping_address: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BTreeMap<String, String>>,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: f64,
    #[serde(default)]
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub id: u32,
    pub order_number: String,
    pub status: String,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItemResponse>,
}

// ============================================
// REVIEW DTOs
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct ReviewCreate {
    pub product_id: ProductId,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: u32,
    pub product_id: ProductId,
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================
// NEWSLETTER / CONTACT DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct NewsletterRequest {
    pub email: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct NewsletterUnsubscribeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsletterResponse {
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactForm {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactResponse {
    pub message: String,
    #[serde(default)]
    pub contact_id: Option<String>,
}

/// Generic `{"message": ...}` acknowledgement
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// ============================================
// ADMIN DTOs
// ============================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminOverview {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub total_products: u64,
    pub total_customers: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminRecentOrder {
    pub id: u32,
    pub order_number: String,
    pub customer_name: String,
    pub total: f64,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminTrends {
    pub orders_this_week: u64,
    pub orders_last_week: u64,
    pub revenue_this_month: f64,
    pub revenue_last_month: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    pub overview: AdminOverview,
    #[serde(default)]
    pub recent_orders: Vec<AdminRecentOrder>,
    #[serde(default)]
    pub trends: AdminTrends,
}

/// Statuses an order can be moved to from the dashboard
pub const ORDER_STATUSES: [&str; 7] = [
    "pending",
    "confirmed",
    "processing",
    "shipped",
    "delivered",
    "cancelled",
    "refunded",
];

/// Order row of `GET /admin/orders/recent`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminOrder {
    pub id: u32,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub total_amount: f64,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminOrderList {
    pub orders: Vec<AdminOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminCustomer {
    pub id: u32,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub newsletter_subscribed: bool,
}

/// Page of `GET /admin/customers`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminCustomerList {
    pub customers: Vec<AdminCustomer>,
    pub total: u64,
    pub skip: u32,
    pub limit: u32,
}

/// Period covered by `GET /admin/analytics`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl AnalyticsRange {
    pub const ALL: [AnalyticsRange; 4] = [
        AnalyticsRange::Week,
        AnalyticsRange::Month,
        AnalyticsRange::Quarter,
        AnalyticsRange::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalyticsRange::Week => "week",
            AnalyticsRange::Month => "month",
            AnalyticsRange::Quarter => "quarter",
            AnalyticsRange::Year => "year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalyticsRange::Week => "Woche",
            AnalyticsRange::Month => "Monat",
            AnalyticsRange::Quarter => "Quartal",
            AnalyticsRange::Year => "Jahr",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == raw.trim())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrendFigure {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub change_percentage: f64,
    #[serde(default)]
    pub trend: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversionRate {
    pub rate: f64,
    #[serde(default)]
    pub change_percentage: f64,
    #[serde(default)]
    pub trend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopProduct {
    pub name: String,
    pub sales: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminAnalytics {
    pub revenue: TrendFigure,
    pub orders: TrendFigure,
    pub customers: TrendFigure,
    pub conversion_rate: ConversionRate,
    #[serde(default)]
    pub top_products: Vec<TopProduct>,
    #[serde(default)]
    pub sales_by_category: Vec<CategoryShare>,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusUpdate<'a> {
    pub status: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusResponse {
    #[serde(default)]
    pub message: String,
    pub order_id: u32,
    pub new_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedResponse {
    #[serde(default)]
    pub message: String,
    pub product_id: ProductId,
    pub is_featured: bool,
}

// ============================================
// REVIEW STATS
// ============================================

/// Aggregate of the approved reviews of one product
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReviewStats {
    pub average_rating: f64,
    pub total_reviews: u32,
    /// Count per star rating, 1 to 5
    #[serde(default)]
    pub rating_distribution: BTreeMap<u8, u32>,
}

/// Error body returned by the backend (`{"detail": ...}`)
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    /// Human-readable message, flattening validation error lists
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

//! Application State
//!
//! The single state value held by the [`Store`](super::Store) and the types
//! it is made of.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::backend::{
    AdminAnalytics, AdminCustomerList, AdminOrder, AdminStats, AnalyticsRange, ContactForm,
    OrderResponse, Review, ReviewStats, User,
};
use crate::catalog::{Product, ProductId};
use crate::money::Money;

/// Maximum number of remembered search queries
pub const SEARCH_HISTORY_LIMIT: usize = 10;

/// A line in the shopping cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price
    pub price: Money,
    pub image: String,
    /// Always at least 1
    pub quantity: u32,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }

    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Severity of a toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

impl ToastKind {
    /// How long the toast stays visible
    pub fn duration(self) -> Duration {
        match self {
            ToastKind::Success | ToastKind::Info => Duration::milliseconds(3000),
            ToastKind::Error => Duration::milliseconds(5000),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Info => "info",
            ToastKind::Error => "error",
        }
    }
}

/// A transient notification
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            expires_at: Utc::now() + kind.duration(),
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Interface language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "de" | "de-de" => Some(Language::De),
            "en" | "en-us" | "en-gb" => Some(Language::En),
            _ => None,
        }
    }
}

/// One line of a placed order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Money,
}

/// A placed order as remembered by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
    pub order_number: String,
    pub status: String,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl OrderSummary {
    /// Summary of an order just placed from `cart`
    pub fn from_placed(response: &OrderResponse, cart: &[CartItem]) -> Self {
        Self {
            order_number: response.order_number.clone(),
            status: response.status.clone(),
            total: Money::from_euros(response.total_amount),
            created_at: response.created_at,
            lines: cart
                .iter()
                .map(|item| OrderLine {
                    product_id: item.id,
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
        }
    }

    /// Summary of an order listed by the backend
    pub fn from_response(response: &OrderResponse) -> Self {
        Self {
            order_number: response.order_number.clone(),
            status: response.status.clone(),
            total: Money::from_euros(response.total_amount),
            created_at: response.created_at,
            lines: response
                .items
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    name: item
                        .product_name
                        .clone()
                        .unwrap_or_else(|| format!("Artikel #{}", item.product_id)),
                    quantity: item.quantity,
                    price: Money::from_euros(item.price),
                })
                .collect(),
        }
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// A contact form submission kept for the customer's reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactSubmission {
    pub form: ContactForm,
    pub reference: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Forms that can report validation feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormId {
    Login,
    Register,
    Checkout,
    Contact,
    Newsletter,
    Unsubscribe,
    Review,
}

/// Submitted values and per-field errors of the last rejected form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFeedback {
    pub values: BTreeMap<String, String>,
    pub errors: BTreeMap<String, String>,
}

impl FormFeedback {
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Products loaded from the backend (empty until loaded)
    pub products: Vec<Product>,
    pub cart: Vec<CartItem>,
    pub wishlist: Vec<ProductId>,
    pub user: Option<User>,
    pub token: Option<String>,
    pub search_query: String,
    pub selected_category: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    /// Most recent first
    pub search_history: Vec<String>,
    pub language: Language,
    /// Most recent first
    pub orders: Vec<OrderSummary>,
    pub contact_submissions: Vec<ContactSubmission>,
    pub reviews: BTreeMap<ProductId, Vec<Review>>,
    /// Backend aggregates of approved reviews
    pub review_stats: BTreeMap<ProductId, ReviewStats>,
    pub admin_stats: Option<AdminStats>,
    /// Most recent first
    pub admin_orders: Vec<AdminOrder>,
    pub admin_customers: Option<AdminCustomerList>,
    pub admin_analytics: Option<(AnalyticsRange, AdminAnalytics)>,
    pub toast: Option<Toast>,
    /// Feedback for the last rejected form submission
    pub form: Option<(FormId, FormFeedback)>,
}

impl AppState {
    /// Number of articles in the cart
    pub fn cart_count(&self) -> u32 {
        self.cart.iter().map(|i| i.quantity).sum()
    }

    pub fn cart_subtotal(&self) -> Money {
        self.cart.iter().map(CartItem::line_total).sum()
    }

    pub fn cart_item(&self, id: ProductId) -> Option<&CartItem> {
        self.cart.iter().find(|i| i.id == id)
    }

    pub fn in_wishlist(&self, id: ProductId) -> bool {
        self.wishlist.contains(&id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(|u| u.is_admin).unwrap_or(false)
    }

    /// The toast to display, if it has not expired yet
    pub fn active_toast(&self, now: DateTime<Utc>) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| t.is_active(now))
    }

    /// Feedback for `form`, if the last rejected submission was that form
    pub fn feedback(&self, form: FormId) -> Option<&FormFeedback> {
        match &self.form {
            Some((id, feedback)) if *id == form => Some(feedback),
            _ => None,
        }
    }

    pub fn order(&self, order_number: &str) -> Option<&OrderSummary> {
        self.orders.iter().find(|o| o.order_number == order_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ProductId, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id,
            name: format!("Artikel {}", id),
            price: Money::from_cents(cents),
            image: String::new(),
            quantity,
        }
    }

    #[test]
    fn test_cart_totals() {
        let state = AppState {
            cart: vec![item(1, 2490, 2), item(2, 990, 1)],
            ..Default::default()
        };
        assert_eq!(state.cart_count(), 3);
        assert_eq!(state.cart_subtotal(), Money::from_cents(5970));
    }

    #[test]
    fn test_toast_expiry() {
        let toast = Toast::new(ToastKind::Success, "Hinzugefügt");
        let state = AppState {
            toast: Some(toast.clone()),
            ..Default::default()
        };
        assert!(state.active_toast(Utc::now()).is_some());
        assert!(state
            .active_toast(toast.expires_at + Duration::milliseconds(1))
            .is_none());
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("EN"), Some(Language::En));
        assert_eq!(Language::parse("de-DE"), Some(Language::De));
        assert_eq!(Language::parse("fr"), None);
        assert_eq!(Language::default().code(), "de");
    }

    #[test]
    fn test_feedback_is_form_specific() {
        let mut feedback = FormFeedback::default();
        feedback.errors.insert("email".to_string(), "Pflichtfeld".to_string());
        let state = AppState {
            form: Some((FormId::Login, feedback)),
            ..Default::default()
        };
        assert_eq!(
            state.feedback(FormId::Login).and_then(|f| f.error("email")),
            Some("Pflichtfeld")
        );
        assert!(state.feedback(FormId::Register).is_none());
    }
}

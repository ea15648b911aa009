//! Checkout
//!
//! Order totals and the mapping from the checkout form to the backend's
//! order payload. All arithmetic happens in cents.

use std::collections::BTreeMap;

use super::state::CartItem;
use crate::backend::{OrderCreate, OrderItemCreate};
use crate::money::Money;

/// Shipping cost rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Flat shipping cost
    pub flat_rate: Money,
    /// Subtotal from which shipping is free
    pub free_from: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_rate: Money::from_cents(490),
            free_from: Money::from_cents(5000),
        }
    }
}

impl ShippingPolicy {
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal.is_zero() || subtotal >= self.free_from {
            Money::ZERO
        } else {
            self.flat_rate
        }
    }

    /// Amount still missing for free shipping
    pub fn missing_for_free_shipping(&self, subtotal: Money) -> Option<Money> {
        if subtotal < self.free_from {
            Some(self.free_from - subtotal)
        } else {
            None
        }
    }
}

/// Subtotal, shipping and total of a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

impl OrderTotals {
    pub fn compute(cart: &[CartItem], policy: &ShippingPolicy) -> Self {
        let subtotal: Money = cart.iter().map(CartItem::line_total).sum();
        let shipping = policy.shipping_for(subtotal);
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

/// Accepted payment methods
pub const PAYMENT_METHODS: &[(&str, &str)] = &[
    ("paypal", "PayPal"),
    ("klarna", "Klarna"),
    ("creditcard", "Kreditkarte"),
    ("prepayment", "Vorkasse"),
];

/// Fields of the checkout form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub payment_method: String,
    pub notes: String,
}

impl CheckoutDetails {
    /// Read the details from submitted form fields
    pub fn from_form(form: &BTreeMap<String, String>) -> Self {
        let field = |name: &str| form.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
        let country = field("country");

        Self {
            first_name: field("first_name"),
            last_name: field("last_name"),
            email: field("email"),
            phone: field("phone"),
            street: field("street"),
            postal_code: field("postal_code"),
            city: field("city"),
            country: if country.is_empty() {
                "Deutschland".to_string()
            } else {
                country
            },
            payment_method: field("payment_method"),
            notes: field("notes"),
        }
    }

    fn shipping_address(&self) -> BTreeMap<String, String> {
        let mut address = BTreeMap::new();
        address.insert("first_name".to_string(), self.first_name.clone());
        address.insert("last_name".to_string(), self.last_name.clone());
        address.insert("email".to_string(), self.email.clone());
        if !self.phone.is_empty() {
            address.insert("phone".to_string(), self.phone.clone());
        }
        address.insert("street".to_string(), self.street.clone());
        address.insert("postal_code".to_string(), self.postal_code.clone());
        address.insert("city".to_string(), self.city.clone());
        address.insert("country".to_string(), self.country.clone());
        address
    }

    /// Build the backend payload for `cart`
    pub fn to_order(&self, cart: &[CartItem], totals: &OrderTotals) -> OrderCreate {
        OrderCreate {
            items: cart
                .iter()
                .map(|item| OrderItemCreate {
                    product_id: item.id,
                    quantity: item.quantity,
                    price: item.price.as_euros(),
                })
                .collect(),
            total_amount: totals.total.as_euros(),
            shipping_address: self.shipping_address(),
            billing_address: None,
            payment_method: self.payment_method.clone(),
            notes: if self.notes.is_empty() {
                None
            } else {
                Some(self.notes.clone())
            },
        }
    }
}

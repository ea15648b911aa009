//! Catalog data types
//!
//! - `Product`: a sellable item
//! - `Category`: a product category addressed by slug

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Numeric product identifier as assigned by the backend
pub type ProductId = u32;

/// A product in the shop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    pub price: Money,
    /// Original price when the product is on sale
    #[serde(default)]
    pub compare_at_price: Option<Money>,
    /// Category slug
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub care_instructions: Option<String>,
    /// Primary image URL
    pub image: String,
    #[serde(default)]
    pub inventory_quantity: u32,
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
}

impl Product {
    /// Create a product with the mandatory fields
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        slug: impl Into<String>,
        price: Money,
    ) -> Self {
        let slug = slug.into();
        Self {
            id,
            name: name.into(),
            image: format!("/images/products/{}.jpg", slug),
            slug,
            description: String::new(),
            short_description: String::new(),
            price,
            compare_at_price: None,
            category: None,
            material: None,
            care_instructions: None,
            inventory_quantity: 0,
            is_featured: false,
            is_bestseller: false,
            is_new_arrival: false,
            is_sale: false,
            is_handmade: false,
        }
    }

    /// Builder method: set category slug
    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    /// Builder method: set long and short description
    pub fn describe(mut self, short: impl Into<String>, long: impl Into<String>) -> Self {
        self.short_description = short.into();
        self.description = long.into();
        self
    }

    /// Builder method: set material and care instructions
    pub fn material(mut self, material: impl Into<String>, care: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self.care_instructions = Some(care.into());
        self
    }

    /// Builder method: set available stock
    pub fn stock(mut self, quantity: u32) -> Self {
        self.inventory_quantity = quantity;
        self
    }

    /// Builder method: mark as on sale with the original price
    pub fn on_sale(mut self, compare_at: Money) -> Self {
        self.is_sale = true;
        self.compare_at_price = Some(compare_at);
        self
    }

    /// Builder method: set the merchandising flags
    pub fn flags(mut self, featured: bool, bestseller: bool, new_arrival: bool, handmade: bool) -> Self {
        self.is_featured = featured;
        self.is_bestseller = bestseller;
        self.is_new_arrival = new_arrival;
        self.is_handmade = handmade;
        self
    }

    pub fn in_stock(&self) -> bool {
        self.inventory_quantity > 0
    }

    /// Case-insensitive match against name and descriptions
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.short_description.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: u32,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
        sort_order: u32,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: description.into(),
            sort_order,
        }
    }
}

//! Views
//!
//! One render function per route. Views read a snapshot of the state through
//! [`ViewContext`] and return an [`Html`] body; [`layout`] wraps it into the
//! document regions. Interactive elements carry `data-action` attributes
//! that the shell forwards to the event dispatcher.

mod account;
mod admin;
mod cart;
mod components;
mod layout;
mod pages;
mod shop;

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::config::ShopConfig;
use crate::html::Html;
use crate::router::{Location, Params, Region, ViewId};
use crate::store::AppState;

/// Everything a view may read while rendering
pub struct ViewContext<'a> {
    pub location: &'a Location,
    pub params: &'a Params,
    pub state: &'a AppState,
    pub catalog: &'a Catalog,
    pub shop: &'a ShopConfig,
    pub now: DateTime<Utc>,
}

impl ViewContext<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Rendered body of a view
#[derive(Debug, Clone)]
pub struct Page {
    /// Overrides the route title
    pub title: Option<String>,
    pub body: Html,
}

impl Page {
    pub fn new(body: Html) -> Self {
        Self { title: None, body }
    }

    pub fn titled(title: impl Into<String>, body: Html) -> Self {
        Self {
            title: Some(title.into()),
            body,
        }
    }
}

/// Render `view`; `None` when the addressed entity does not exist
pub fn render(view: ViewId, ctx: &ViewContext) -> Option<Page> {
    match view {
        ViewId::Home => Some(shop::home(ctx)),
        ViewId::Products => Some(shop::products(ctx)),
        ViewId::Category => shop::category(ctx),
        ViewId::Product => shop::product(ctx),
        ViewId::Search => Some(shop::search(ctx)),
        ViewId::Cart => Some(cart::cart(ctx)),
        ViewId::Checkout => Some(cart::checkout(ctx)),
        ViewId::OrderConfirmation => cart::order_confirmation(ctx),
        ViewId::Login => Some(account::login(ctx)),
        ViewId::Register => Some(account::register(ctx)),
        ViewId::Account => Some(account::account(ctx)),
        ViewId::Wishlist => Some(account::wishlist(ctx)),
        ViewId::Admin => Some(admin::dashboard(ctx)),
        ViewId::About => Some(pages::about(ctx)),
        ViewId::Contact => Some(pages::contact(ctx)),
        ViewId::Blog => Some(pages::blog(ctx)),
        ViewId::BlogPost => pages::blog_post(ctx),
        ViewId::Impressum => Some(pages::impressum(ctx)),
        ViewId::Datenschutz => Some(pages::datenschutz(ctx)),
        ViewId::Agb => Some(pages::agb(ctx)),
        ViewId::Widerruf => Some(pages::widerruf(ctx)),
        ViewId::Versand => Some(pages::versand(ctx)),
        ViewId::NewsletterUnsubscribe => Some(pages::newsletter_unsubscribe(ctx)),
        ViewId::NotFound => None,
    }
}

/// Fallback for unmatched paths and unknown entities
pub fn not_found(ctx: &ViewContext) -> Page {
    pages::not_found(ctx)
}

/// Wrap a page into the document regions
pub fn layout(ctx: &ViewContext, page: Page) -> Vec<(Region, Html)> {
    vec![
        (Region::Header, layout::header(ctx)),
        (Region::Main, page.body),
        (Region::Footer, layout::footer(ctx)),
        (Region::Toast, layout::toast(ctx)),
    ]
}

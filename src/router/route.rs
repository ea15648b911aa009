//! Route Table
//!
//! Static path patterns mapped to views. Patterns are matched segment by
//! segment in registration order; `:name` segments match anything.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Route parameters by name
pub type Params = BTreeMap<String, String>;

/// Identifies the render function of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    Home,
    Products,
    Category,
    Product,
    Search,
    Cart,
    Checkout,
    OrderConfirmation,
    Login,
    Register,
    Account,
    Wishlist,
    Admin,
    About,
    Contact,
    Blog,
    BlogPost,
    Impressum,
    Datenschutz,
    Agb,
    Widerruf,
    Versand,
    NewsletterUnsubscribe,
    NotFound,
}

/// Title of the fallback view for unmatched paths
pub const NOT_FOUND_TITLE: &str = "Seite nicht gefunden";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// A registered route
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    segments: Vec<Segment>,
    view: ViewId,
    title: String,
}

impl Route {
    pub fn new(pattern: &str, view: ViewId, title: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
            view,
            title: title.to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_dynamic(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Param(_)))
    }

    /// Match a normalized path, returning the decoded parameters
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(s) if s == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    let value = urlencoding::decode(part)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| part.to_string());
                    params.insert(name.clone(), value);
                }
            }
        }
        Some(params)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {:?} ({})", self.pattern, self.view, self.title)
    }
}

/// Ordered list of routes, first match wins
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: &str, view: ViewId, title: &str) -> &mut Self {
        self.routes.push(Route::new(pattern, view, title));
        self
    }

    /// All routes of the storefront
    pub fn storefront() -> Self {
        let mut table = Self::new();
        table
            .add("/", ViewId::Home, "Casa Petrada - Boho Schmuck & Mode")
            .add("/products", ViewId::Products, "Alle Produkte")
            .add("/category/:slug", ViewId::Category, "Kategorie")
            .add("/product/:id", ViewId::Product, "Produkt")
            .add("/search", ViewId::Search, "Suche")
            .add("/cart", ViewId::Cart, "Warenkorb")
            .add("/checkout", ViewId::Checkout, "Kasse")
            .add(
                "/order-confirmation/:number",
                ViewId::OrderConfirmation,
                "Bestellbestätigung",
            )
            .add("/login", ViewId::Login, "Anmelden")
            .add("/register", ViewId::Register, "Registrieren")
            .add("/account", ViewId::Account, "Mein Konto")
            .add("/wishlist", ViewId::Wishlist, "Wunschliste")
            .add("/admin", ViewId::Admin, "Admin Dashboard")
            .add("/about", ViewId::About, "Über uns")
            .add("/contact", ViewId::Contact, "Kontakt")
            .add("/blog", ViewId::Blog, "Blog")
            .add("/blog/:slug", ViewId::BlogPost, "Blog")
            .add("/impressum", ViewId::Impressum, "Impressum")
            .add("/datenschutz", ViewId::Datenschutz, "Datenschutzerklärung")
            .add("/agb", ViewId::Agb, "AGB")
            .add("/widerruf", ViewId::Widerruf, "Widerrufsbelehrung")
            .add("/versand", ViewId::Versand, "Versand & Zahlung")
            .add(
                "/newsletter/unsubscribe",
                ViewId::NewsletterUnsubscribe,
                "Newsletter abmelden",
            );
        table
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route matching `path`, with its parameters
    pub fn resolve(&self, path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .find_map(|route| route.matches(path).map(|params| (route, params)))
    }

    /// Parameters of the first matching route, empty if none matches
    pub fn params(&self, path: &str) -> Params {
        self.resolve(path).map(|(_, p)| p).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_and_dynamic_match() {
        let table = RouteTable::storefront();

        let (route, params) = table.resolve("/cart").unwrap();
        assert_eq!(route.view(), ViewId::Cart);
        assert!(params.is_empty());

        let (route, params) = table.resolve("/product/abc").unwrap();
        assert_eq!(route.view(), ViewId::Product);
        assert_eq!(params.get("id").map(String::as_str), Some("abc"));

        assert!(table.resolve("/product").is_none());
        assert!(table.resolve("/product/1/reviews").is_none());
        assert!(table.resolve("/does-not-exist").is_none());
    }

    #[test]
    fn test_root_only_matches_root() {
        let table = RouteTable::storefront();
        assert_eq!(table.resolve("/").unwrap().0.view(), ViewId::Home);
        assert!(table.resolve("").is_none());
    }

    #[test]
    fn test_params_are_decoded() {
        let table = RouteTable::storefront();
        let params = table.params("/category/fu%C3%9Fkettchen");
        assert_eq!(params.get("slug").map(String::as_str), Some("fußkettchen"));
    }

    #[test]
    fn test_first_registered_wins() {
        let mut table = RouteTable::new();
        table
            .add("/blog/:slug", ViewId::BlogPost, "Artikel")
            .add("/blog/archiv", ViewId::Blog, "Archiv");

        let (route, params) = table.resolve("/blog/archiv").unwrap();
        assert_eq!(route.view(), ViewId::BlogPost);
        assert_eq!(params.get("slug").map(String::as_str), Some("archiv"));
    }

    #[test]
    fn test_storefront_has_unique_patterns() {
        let table = RouteTable::storefront();
        let mut patterns: Vec<&str> = table.routes().iter().map(Route::pattern).collect();
        let count = patterns.len();
        patterns.sort();
        patterns.dedup();
        assert_eq!(patterns.len(), count);
        assert_eq!(count, 23);
    }
}

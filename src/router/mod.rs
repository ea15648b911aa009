//! View Router
//!
//! Maps a URL path to a view, keeps the navigation history and mounts the
//! rendered view into the [`Document`].
//!
//! Rendering is synchronous: a view is rendered completely from a snapshot
//! of the store state and only then mounted, so a navigation either updates
//! the document or leaves it as it was.

pub mod document;
pub mod history;
pub mod route;

pub use document::{Document, Patch, Region};
pub use history::{History, Location, MemoryHistory};
pub use route::{Params, Route, RouteTable, ViewId, NOT_FOUND_TITLE};

use chrono::Utc;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::ShopConfig;
use crate::store::Store;
use crate::views::{self, ViewContext};

/// Result of a navigation
#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    /// Link target of the rendered location
    pub path: String,
    pub view: ViewId,
    pub title: String,
    /// False when the not-found view was rendered
    pub found: bool,
    pub patch: Patch,
}

/// Storefront router
pub struct Router {
    table: RouteTable,
    history: Box<dyn History>,
    document: Document,
    store: Store,
    shop: ShopConfig,
    builtin: Catalog,
    current: Option<Location>,
}

impl Router {
    /// Router over the storefront routes with in-memory history
    pub fn new(store: Store, shop: ShopConfig) -> Self {
        Self::with_history(store, shop, Box::new(MemoryHistory::new()))
    }

    pub fn with_history(store: Store, shop: ShopConfig, history: Box<dyn History>) -> Self {
        Self {
            table: RouteTable::storefront(),
            history,
            document: Document::new(),
            store,
            shop,
            builtin: Catalog::builtin(),
            current: None,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn shop(&self) -> &ShopConfig {
        &self.shop
    }

    pub fn history(&self) -> &dyn History {
        self.history.as_ref()
    }

    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    /// Products currently shown: the backend list once loaded, else built-in
    pub fn catalog(&self) -> Catalog {
        let products = self.store.with_state(|s| s.products.clone());
        if products.is_empty() {
            self.builtin.clone()
        } else {
            Catalog::with_products(products)
        }
    }

    /// Render `path`, pushing a history entry when `push_state` is set
    pub fn navigate(&mut self, path: &str, push_state: bool) -> Navigation {
        let location = Location::parse(path);

        let leaving = self
            .current
            .as_ref()
            .map_or(true, |current| current.path != location.path);
        if leaving {
            self.store.clear_form_feedback();
        }

        if push_state {
            self.history.push(&location.href());
        }

        self.render(location)
    }

    /// Render a location requested from outside the app (address bar,
    /// reload). Reopening the current location replaces its entry, and
    /// locations that end on the not-found view are not recorded.
    pub fn open(&mut self, path: &str) -> Navigation {
        let href = Location::parse(path).href();
        if self.current.as_ref().map_or(false, |c| c.href() == href) {
            return self.replace(&href);
        }

        let navigation = self.navigate(&href, false);
        if navigation.found {
            self.history.push(&href);
        }
        navigation
    }

    /// Render `path` in place of the current history entry
    pub fn replace(&mut self, path: &str) -> Navigation {
        let location = Location::parse(path);
        if self.current.as_ref().map_or(true, |c| c.path != location.path) {
            self.store.clear_form_feedback();
        }
        self.history.replace(&location.href());
        self.render(location)
    }

    /// Re-render the current location without touching history
    pub fn refresh(&mut self) -> Navigation {
        let location = self
            .current
            .clone()
            .unwrap_or_else(|| Location::parse("/"));
        self.render(location)
    }

    /// Parameters of the route matching `path`
    pub fn get_params(&self, path: &str) -> Params {
        self.table.params(&Location::parse(path).path)
    }

    pub fn back(&mut self) -> Option<Navigation> {
        let href = self.history.back()?;
        Some(self.navigate(&href, false))
    }

    pub fn forward(&mut self) -> Option<Navigation> {
        let href = self.history.forward()?;
        Some(self.navigate(&href, false))
    }

    /// The browser moved through its history on its own
    pub fn on_popstate(&mut self, path: &str) -> Navigation {
        let href = Location::parse(path).href();
        self.history.sync(&href);
        self.navigate(&href, false)
    }

    fn render(&mut self, location: Location) -> Navigation {
        let state = self.store.get_state();
        let products_loaded = !state.products.is_empty();
        let loaded;
        let catalog = if products_loaded {
            loaded = Catalog::with_products(state.products.clone());
            &loaded
        } else {
            &self.builtin
        };

        let resolved = self
            .table
            .resolve(&location.path)
            .map(|(route, params)| (route.view(), route.title().to_string(), params));
        let (view, route_title, params) = match resolved {
            Some(found) => found,
            None => (ViewId::NotFound, NOT_FOUND_TITLE.to_string(), Params::new()),
        };

        let ctx = ViewContext {
            location: &location,
            params: &params,
            state: &state,
            catalog,
            shop: &self.shop,
            now: Utc::now(),
        };

        let (view, title, page) = match views::render(view, &ctx) {
            Some(page) => {
                let title = page.title.clone().unwrap_or(route_title);
                (view, title, page)
            }
            None => (ViewId::NotFound, NOT_FOUND_TITLE.to_string(), views::not_found(&ctx)),
        };
        let found = view != ViewId::NotFound;
        let content = views::layout(&ctx, page);

        self.document.set_lang(state.language.code());
        let patch = self.document.mount(&title, content);

        if found {
            tracing::debug!(path = %location, view = ?view, "Navigated");
        } else {
            tracing::debug!(path = %location, "No route, rendered not-found view");
        }

        let path = location.href();
        self.current = Some(location);

        Navigation {
            path,
            view,
            title,
            found,
            patch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::store::{FormFeedback, FormId};
    use std::sync::Arc;

    fn router() -> Router {
        Router::new(
            Store::in_memory(Arc::new(FakeBackend::new())),
            ShopConfig::default(),
        )
    }

    #[test]
    fn test_static_routes_set_title() {
        let mut router = router();
        let routes: Vec<(String, String)> = router
            .table()
            .routes()
            .iter()
            .filter(|r| !r.is_dynamic())
            .map(|r| (r.pattern().to_string(), r.title().to_string()))
            .collect();
        assert!(!routes.is_empty());

        for (pattern, title) in routes {
            let nav = router.navigate(&pattern, true);
            assert!(nav.found, "{} not found", pattern);
            assert_eq!(nav.title, title);
            assert_eq!(router.document().title(), title);
        }
    }

    #[test]
    fn test_get_params() {
        let router = router();
        let params = router.get_params("/product/abc");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id").map(String::as_str), Some("abc"));

        assert!(router.get_params("/cart").is_empty());
        assert_eq!(
            router.get_params("/order-confirmation/CP-00001?x=1")["number"],
            "CP-00001"
        );
    }

    #[test]
    fn test_unknown_path_renders_not_found() {
        let mut router = router();
        let nav = router.navigate("/does-not-exist", true);
        assert!(!nav.found);
        assert_eq!(nav.view, ViewId::NotFound);
        assert_eq!(router.document().title(), NOT_FOUND_TITLE);
        assert!(router
            .document()
            .region(Region::Main)
            .is_some_and(|m| m.as_str().contains("nicht gefunden")));
    }

    #[test]
    fn test_unknown_product_renders_not_found() {
        let mut router = router();
        let nav = router.navigate("/product/abc", true);
        assert!(!nav.found);

        let nav = router.navigate("/product/2", true);
        assert!(nav.found);
        assert!(nav.title.contains("KORSIKA"));
    }

    #[test]
    fn test_history_back_forward() {
        let mut router = router();
        router.navigate("/", true);
        router.navigate("/products", true);
        router.navigate("/cart", true);

        let nav = router.back().unwrap();
        assert_eq!(nav.view, ViewId::Products);
        assert_eq!(router.history().len(), 3);

        let nav = router.forward().unwrap();
        assert_eq!(nav.view, ViewId::Cart);
        assert!(router.forward().is_none());

        let nav = router.on_popstate("/");
        assert_eq!(nav.view, ViewId::Home);
        assert_eq!(router.history().current(), Some("/"));
    }

    #[test]
    fn test_replace_overwrites_entry() {
        let mut router = router();
        router.navigate("/", true);
        router.navigate("/product/2", true);
        let nav = router.replace("/product/2?tab=reviews");
        assert_eq!(nav.path, "/product/2?tab=reviews");
        assert_eq!(router.history().len(), 2);
        assert_eq!(router.history().current(), Some("/product/2?tab=reviews"));
    }

    #[test]
    fn test_open_records_each_location_once() {
        let mut router = router();
        router.open("/");
        router.open("/product/2");
        router.open("/product/2");
        assert_eq!(router.history().len(), 2);

        let nav = router.open("/favicon.ico");
        assert!(!nav.found);
        let nav = router.open("/product/999");
        assert!(!nav.found);
        assert_eq!(router.history().len(), 2);
        assert_eq!(router.history().current(), Some("/product/2"));
    }

    #[test]
    fn test_navigate_without_push_keeps_history() {
        let mut router = router();
        router.navigate("/", true);
        router.navigate("/about", false);
        assert_eq!(router.history().len(), 1);
        assert_eq!(router.current().map(|l| l.path.as_str()), Some("/about"));
    }

    #[test]
    fn test_refresh_patches_only_changed_regions() {
        let mut router = router();
        router.navigate("/about", true);

        let product = router.catalog().find(2).cloned().unwrap();
        router.store().add_to_cart(&product, 1);

        let nav = router.refresh();
        assert!(nav.patch.changed(Region::Header));
        assert!(!nav.patch.changed(Region::Main));
        assert!(!nav.patch.changed(Region::Footer));
    }

    #[test]
    fn test_leaving_page_clears_form_feedback() {
        let mut router = router();
        router.navigate("/login", true);
        router
            .store()
            .set_form_feedback(FormId::Login, FormFeedback::default());

        router.refresh();
        assert!(router.store().get_state().form.is_some());

        router.navigate("/login?next=/account", true);
        assert!(router.store().get_state().form.is_some());

        router.navigate("/cart", true);
        assert!(router.store().get_state().form.is_none());
    }

    #[test]
    fn test_search_query_is_escaped() {
        let mut router = router();
        router.navigate("/search?q=<script>alert(1)</script>", true);
        let main = router.document().region(Region::Main).unwrap().as_str();
        assert!(!main.contains("<script>alert(1)"));
        assert!(main.contains("&lt;script&gt;"));
    }
}

//! Delegated Events
//!
//! Interactive elements carry a `data-action` attribute instead of inline
//! handlers. The page script posts the action name, the element's data
//! attributes and any form fields as a [`DelegatedEvent`]; it is parsed into
//! an [`Action`] and applied to the store and router by [`dispatch`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::backend::{AnalyticsRange, ContactForm, RegisterRequest, ReviewCreate, ORDER_STATUSES};
use crate::catalog::ProductId;
use crate::router::{Location, Navigation, Router, ViewId};
use crate::store::{CheckoutDetails, FormFeedback, FormId, Language, StoreError, ToastKind};
use crate::validation::{FormData, FormValidator};

/// Event payload posted by the page script
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelegatedEvent {
    pub action: String,
    /// `data-*` attributes of the element that fired
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    /// Fields of the submitted form
    #[serde(default)]
    pub form: FormData,
    /// Location the browser was showing
    #[serde(default)]
    pub path: Option<String>,
}

impl DelegatedEvent {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Self::default()
        }
    }

    pub fn data(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.form.insert(key.to_string(), value.to_string());
        self
    }
}

/// Errors turning an event into an action
#[derive(Error, Debug, PartialEq)]
pub enum EventError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action '{action}' is missing '{arg}'")]
    MissingArgument { action: String, arg: &'static str },

    #[error("Action '{action}' has invalid '{arg}': {value}")]
    InvalidArgument {
        action: String,
        arg: &'static str,
        value: String,
    },
}

/// A user interaction
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddToCart { id: ProductId, quantity: u32 },
    RemoveFromCart { id: ProductId },
    UpdateQuantity { id: ProductId, quantity: i64 },
    ClearCart,
    ToggleWishlist { id: ProductId },
    AddToWishlist { id: ProductId },
    RemoveFromWishlist { id: ProductId },
    Navigate { path: String },
    Search { query: String },
    SelectCategory { category: Option<String> },
    Sort { sort: String },
    ShowTab { tab: String },
    Login { form: FormData, next: Option<String> },
    Register { form: FormData },
    Logout,
    Checkout { form: FormData },
    SubscribeNewsletter { form: FormData },
    UnsubscribeNewsletter { form: FormData },
    Contact { form: FormData },
    SubmitReview { product: ProductId, form: FormData },
    UpdateOrderStatus { order: u32, status: String },
    ToggleFeatured { id: ProductId },
    SetLanguage(Language),
    DismissToast,
    Back,
    Forward,
    Popstate { path: String },
}

impl Action {
    /// Parse the action named by `event`
    pub fn parse(event: &DelegatedEvent) -> Result<Self, EventError> {
        let args = Args { event };

        let action = match event.action.as_str() {
            "add-to-cart" => Action::AddToCart {
                id: args.id()?,
                quantity: match args.any(&["quantity"]) {
                    Some(q) => args.number("quantity", q)?,
                    None => 1,
                },
            },
            "remove-from-cart" => Action::RemoveFromCart { id: args.id()? },
            "update-quantity" => {
                let raw = args.required(&["quantity", "value"], "quantity")?;
                Action::UpdateQuantity {
                    id: args.id()?,
                    quantity: args.number("quantity", raw)?,
                }
            }
            "clear-cart" => Action::ClearCart,
            "toggle-wishlist" => Action::ToggleWishlist { id: args.id()? },
            "add-to-wishlist" => Action::AddToWishlist { id: args.id()? },
            "remove-from-wishlist" => Action::RemoveFromWishlist { id: args.id()? },
            "navigate" => Action::Navigate {
                path: args.required(&["path", "href"], "path")?.to_string(),
            },
            "search" => Action::Search {
                query: args.any(&["q", "query"]).unwrap_or_default().to_string(),
            },
            "select-category" => Action::SelectCategory {
                category: args.any(&["category", "value"]).map(str::to_string),
            },
            "sort" => Action::Sort {
                sort: args.required(&["sort", "value"], "sort")?.to_string(),
            },
            "show-tab" => Action::ShowTab {
                tab: args.required(&["tab"], "tab")?.to_string(),
            },
            "login" => Action::Login {
                form: event.form.clone(),
                next: event.data.get("next").filter(|n| n.starts_with('/')).cloned(),
            },
            "register" => Action::Register {
                form: event.form.clone(),
            },
            "logout" => Action::Logout,
            "checkout" => Action::Checkout {
                form: event.form.clone(),
            },
            "subscribe-newsletter" => Action::SubscribeNewsletter {
                form: event.form.clone(),
            },
            "unsubscribe-newsletter" => Action::UnsubscribeNewsletter {
                form: event.form.clone(),
            },
            "contact" => Action::Contact {
                form: event.form.clone(),
            },
            "submit-review" => {
                let raw = args.required(&["product"], "product")?;
                Action::SubmitReview {
                    product: args.number("product", raw)?,
                    form: event.form.clone(),
                }
            }
            "set-language" => {
                let code = args.required(&["lang", "value"], "lang")?;
                let language = Language::parse(code).ok_or_else(|| EventError::InvalidArgument {
                    action: event.action.clone(),
                    arg: "lang",
                    value: code.to_string(),
                })?;
                Action::SetLanguage(language)
            }
            "dismiss-toast" => Action::DismissToast,
            "update-order-status" => {
                let raw = args.required(&["order", "id"], "order")?;
                let status = args.required(&["status", "value"], "status")?;
                if !ORDER_STATUSES.contains(&status) {
                    return Err(EventError::InvalidArgument {
                        action: event.action.clone(),
                        arg: "status",
                        value: status.to_string(),
                    });
                }
                Action::UpdateOrderStatus {
                    order: args.number("order", raw)?,
                    status: status.to_string(),
                }
            }
            "toggle-featured" => Action::ToggleFeatured { id: args.id()? },
            "back" => Action::Back,
            "forward" => Action::Forward,
            "popstate" => Action::Popstate {
                path: args.required(&["path"], "path")?.to_string(),
            },
            other => return Err(EventError::UnknownAction(other.to_string())),
        };

        Ok(action)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::AddToCart { .. } => "add-to-cart",
            Action::RemoveFromCart { .. } => "remove-from-cart",
            Action::UpdateQuantity { .. } => "update-quantity",
            Action::ClearCart => "clear-cart",
            Action::ToggleWishlist { .. } => "toggle-wishlist",
            Action::AddToWishlist { .. } => "add-to-wishlist",
            Action::RemoveFromWishlist { .. } => "remove-from-wishlist",
            Action::Navigate { .. } => "navigate",
            Action::Search { .. } => "search",
            Action::SelectCategory { .. } => "select-category",
            Action::Sort { .. } => "sort",
            Action::ShowTab { .. } => "show-tab",
            Action::Login { .. } => "login",
            Action::Register { .. } => "register",
            Action::Logout => "logout",
            Action::Checkout { .. } => "checkout",
            Action::SubscribeNewsletter { .. } => "subscribe-newsletter",
            Action::UnsubscribeNewsletter { .. } => "unsubscribe-newsletter",
            Action::Contact { .. } => "contact",
            Action::SubmitReview { .. } => "submit-review",
            Action::SetLanguage(_) => "set-language",
            Action::DismissToast => "dismiss-toast",
            Action::UpdateOrderStatus { .. } => "update-order-status",
            Action::ToggleFeatured { .. } => "toggle-featured",
            Action::Back => "back",
            Action::Forward => "forward",
            Action::Popstate { .. } => "popstate",
        }
    }
}

/// Argument lookup over data attributes, then form fields
struct Args<'a> {
    event: &'a DelegatedEvent,
}

impl<'a> Args<'a> {
    fn any(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|key| {
            self.event
                .data
                .get(*key)
                .or_else(|| self.event.form.get(*key))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        })
    }

    fn required(&self, keys: &[&str], arg: &'static str) -> Result<&'a str, EventError> {
        self.any(keys).ok_or_else(|| EventError::MissingArgument {
            action: self.event.action.clone(),
            arg,
        })
    }

    fn number<T: std::str::FromStr>(&self, arg: &'static str, raw: &str) -> Result<T, EventError> {
        raw.parse().map_err(|_| EventError::InvalidArgument {
            action: self.event.action.clone(),
            arg,
            value: raw.to_string(),
        })
    }

    fn id(&self) -> Result<ProductId, EventError> {
        let raw = self.required(&["id"], "id")?;
        self.number("id", raw)
    }
}

/// How the browser history should follow the rendered location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryUpdate {
    None,
    Push,
    Replace,
    /// The browser steps back through its own history
    Back,
    /// The browser steps forward through its own history
    Forward,
}

/// Result of dispatching an action
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    #[serde(flatten)]
    pub navigation: Navigation,
    pub history: HistoryUpdate,
}

impl Outcome {
    fn stay(navigation: Navigation) -> Self {
        Self {
            navigation,
            history: HistoryUpdate::None,
        }
    }

    fn pushed(navigation: Navigation) -> Self {
        Self {
            navigation,
            history: HistoryUpdate::Push,
        }
    }

    fn replaced(navigation: Navigation) -> Self {
        Self {
            navigation,
            history: HistoryUpdate::Replace,
        }
    }

    fn traversed(navigation: Navigation, history: HistoryUpdate) -> Self {
        Self { navigation, history }
    }
}

/// Rows fetched for the dashboard's order list
const ADMIN_ORDER_LIMIT: u32 = 20;

/// Page size of the dashboard's customer list
const ADMIN_CUSTOMER_LIMIT: u32 = 50;

/// Load the backend data the view at `path` shows.
///
/// Failures are logged; the view renders with what the store already has.
pub async fn prefetch(router: &Router, path: &str) {
    let location = Location::parse(path);
    let Some((route, params)) = router.table().resolve(&location.path) else {
        return;
    };
    let store = router.store();
    let (authenticated, admin) = store.with_state(|s| (s.is_authenticated(), s.is_admin()));

    let result = match route.view() {
        ViewId::Account if authenticated => store.load_orders().await.map(|_| ()),
        ViewId::Admin if admin => match location.query("tab").unwrap_or("overview") {
            "orders" => store.load_admin_orders(ADMIN_ORDER_LIMIT).await.map(|_| ()),
            "customers" => store.load_admin_customers(0, ADMIN_CUSTOMER_LIMIT).await.map(|_| ()),
            "analytics" => {
                let range = location
                    .query("range")
                    .and_then(AnalyticsRange::parse)
                    .unwrap_or_default();
                store.load_admin_analytics(range).await
            }
            "products" => Ok(()),
            _ => store.load_admin_stats().await,
        },
        ViewId::Product => {
            let key = params.get("id").map(String::as_str).unwrap_or_default();
            let known = router.catalog().lookup(key).map(|p| p.id);
            let id = match (known, key.parse::<ProductId>()) {
                (Some(id), _) => Some(id),
                (None, Ok(id)) => store.load_product(id).await.ok().map(|p| p.id),
                (None, Err(_)) => None,
            };
            match id {
                Some(id) => {
                    let reviews = store.load_product_reviews(id).await.map(|_| ());
                    let stats = store.load_review_stats(id).await;
                    reviews.and(stats)
                }
                None => Ok(()),
            }
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        tracing::debug!(path, error = %e, "Prefetch failed");
    }
}

/// Apply a parsed event, first catching up with the browser's location
pub async fn handle(router: &mut Router, event: &DelegatedEvent) -> Result<Outcome, EventError> {
    let action = Action::parse(event)?;

    if let Some(path) = event.path.as_deref() {
        let href = Location::parse(path).href();
        let behind = router.current().map_or(true, |current| current.href() != href);
        if behind && !matches!(action, Action::Popstate { .. }) {
            tracing::debug!(path = %href, "Syncing router with browser location");
            router.on_popstate(&href);
        }
    }

    Ok(dispatch(router, action).await)
}

async fn go(router: &mut Router, path: &str) -> Outcome {
    prefetch(router, path).await;
    Outcome::pushed(router.navigate(path, true))
}

fn current_href(router: &Router) -> String {
    router
        .current()
        .map(Location::href)
        .unwrap_or_else(|| "/".to_string())
}

/// Keep the rejected values and field errors so the form re-renders with them
fn reject(router: &mut Router, form: FormId, values: FormData, errors: BTreeMap<String, String>) -> Outcome {
    tracing::debug!(form = ?form, errors = errors.len(), "Form rejected");
    router
        .store()
        .set_form_feedback(form, FormFeedback { values, errors });
    Outcome::stay(router.refresh())
}

/// Apply `action` and report what changed
pub async fn dispatch(router: &mut Router, action: Action) -> Outcome {
    tracing::debug!(action = action.name(), "Dispatching action");
    let store = router.store().clone();

    match action {
        Action::AddToCart { id, quantity } => {
            let catalog = router.catalog();
            match catalog.find(id) {
                Some(product) => {
                    store.add_to_cart(product, quantity);
                    store.show_toast(
                        ToastKind::Success,
                        format!("{} wurde zum Warenkorb hinzugefügt.", product.name),
                    );
                }
                None => {
                    tracing::warn!(error = %StoreError::UnknownProduct(id), "Cannot add to cart");
                    store.show_toast(ToastKind::Error, "Produkt nicht gefunden.");
                }
            }
            Outcome::stay(router.refresh())
        }
        Action::RemoveFromCart { id } => {
            store.remove_from_cart(id);
            store.show_toast(ToastKind::Info, "Artikel aus dem Warenkorb entfernt.");
            Outcome::stay(router.refresh())
        }
        Action::UpdateQuantity { id, quantity } => {
            store.update_cart_quantity(id, quantity);
            Outcome::stay(router.refresh())
        }
        Action::ClearCart => {
            store.clear_cart();
            Outcome::stay(router.refresh())
        }
        Action::ToggleWishlist { id } => {
            let message = if store.toggle_wishlist(id) {
                "Zur Wunschliste hinzugefügt."
            } else {
                "Von der Wunschliste entfernt."
            };
            store.show_toast(ToastKind::Info, message);
            Outcome::stay(router.refresh())
        }
        Action::AddToWishlist { id } => {
            store.add_to_wishlist(id);
            Outcome::stay(router.refresh())
        }
        Action::RemoveFromWishlist { id } => {
            store.remove_from_wishlist(id);
            Outcome::stay(router.refresh())
        }
        Action::Navigate { path } => go(router, &path).await,
        Action::Search { query } => {
            store.set_search_query(&query);
            let path = Location::parse("/search").with_query("q", query.trim()).href();
            go(router, &path).await
        }
        Action::SelectCategory { category } => {
            store.set_selected_category(category.clone());
            let path = match category {
                Some(slug) => Location::parse("/products").with_query("category", &slug).href(),
                None => "/products".to_string(),
            };
            go(router, &path).await
        }
        Action::Sort { sort } => {
            let location = Location::parse(&current_href(router)).with_query("sort", &sort);
            Outcome::replaced(router.replace(&location.href()))
        }
        Action::ShowTab { tab } => {
            let href = Location::parse(&current_href(router)).with_query("tab", &tab).href();
            prefetch(router, &href).await;
            Outcome::replaced(router.replace(&href))
        }
        Action::Login { form, next } => {
            let result = FormValidator::login().validate(&form);
            if !result.is_valid {
                return reject(router, FormId::Login, form, result.errors);
            }

            let email = form.get("email").map(String::as_str).unwrap_or_default();
            let password = form.get("password").map(String::as_str).unwrap_or_default();
            match store.login_with_credentials(email, password).await {
                Ok(user) => {
                    store.show_toast(
                        ToastKind::Success,
                        format!("Willkommen zurück, {}!", user.first_name),
                    );
                    go(router, next.as_deref().unwrap_or("/account")).await
                }
                Err(_) => reject(router, FormId::Login, form, BTreeMap::new()),
            }
        }
        Action::Register { form } => {
            let result = FormValidator::register().validate(&form);
            if !result.is_valid {
                return reject(router, FormId::Register, form, result.errors);
            }

            let field = |name: &str| form.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
            let request = RegisterRequest {
                email: field("email"),
                password: form.get("password").cloned().unwrap_or_default(),
                first_name: field("first_name"),
                last_name: field("last_name"),
                newsletter_subscribed: form.contains_key("newsletter"),
            };
            match store.register(request).await {
                Ok(_) => {
                    store.show_toast(ToastKind::Success, "Willkommen bei Casa Petrada!");
                    go(router, "/account").await
                }
                Err(_) => reject(router, FormId::Register, form, BTreeMap::new()),
            }
        }
        Action::Logout => {
            store.logout();
            store.show_toast(ToastKind::Info, "Du wurdest abgemeldet.");
            go(router, "/").await
        }
        Action::Checkout { form } => {
            if store.with_state(|s| s.cart.is_empty()) {
                store.show_toast(ToastKind::Error, "Dein Warenkorb ist leer.");
                return Outcome::stay(router.refresh());
            }

            let result = FormValidator::checkout().validate(&form);
            if !result.is_valid {
                return reject(router, FormId::Checkout, form, result.errors);
            }

            let details = CheckoutDetails::from_form(&form);
            let policy = router.shop().shipping_policy();
            match store.create_order(&details, &policy).await {
                Ok(summary) => {
                    store.show_toast(
                        ToastKind::Success,
                        format!("Vielen Dank! Bestellung {} ist eingegangen.", summary.order_number),
                    );
                    let path = format!("/order-confirmation/{}", summary.order_number);
                    go(router, &path).await
                }
                Err(_) => reject(router, FormId::Checkout, form, BTreeMap::new()),
            }
        }
        Action::SubscribeNewsletter { form } => {
            let result = FormValidator::newsletter().validate(&form);
            if let Some(message) = result.error("email") {
                store.show_toast(ToastKind::Error, message);
                return reject(router, FormId::Newsletter, form, result.errors);
            }

            let email = form.get("email").map(String::as_str).unwrap_or_default();
            if store.subscribe_to_newsletter(email).await.is_ok() {
                store.clear_form_feedback();
            }
            Outcome::stay(router.refresh())
        }
        Action::UnsubscribeNewsletter { form } => {
            let result = FormValidator::newsletter().validate(&form);
            if !result.is_valid {
                return reject(router, FormId::Unsubscribe, form, result.errors);
            }

            let email = form.get("email").map(String::as_str).unwrap_or_default();
            match store.unsubscribe_from_newsletter(email).await {
                Ok(()) => go(router, "/").await,
                Err(_) => reject(router, FormId::Unsubscribe, form, BTreeMap::new()),
            }
        }
        Action::Contact { form } => {
            let result = FormValidator::contact().validate(&form);
            if !result.is_valid {
                return reject(router, FormId::Contact, form, result.errors);
            }

            let field = |name: &str| form.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
            let contact = ContactForm {
                first_name: field("first_name"),
                last_name: field("last_name"),
                email: field("email"),
                subject: field("subject"),
                message: field("message"),
            };
            match store.submit_contact_form(contact).await {
                Ok(()) => {
                    store.clear_form_feedback();
                    Outcome::stay(router.refresh())
                }
                Err(_) => reject(router, FormId::Contact, form, BTreeMap::new()),
            }
        }
        Action::SubmitReview { product, form } => {
            let result = FormValidator::review().validate(&form);
            if !result.is_valid {
                return reject(router, FormId::Review, form, result.errors);
            }

            let optional = |name: &str| {
                form.get(name)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            };
            let review = ReviewCreate {
                product_id: product,
                rating: optional("rating")
                    .and_then(|r| r.parse::<f64>().ok())
                    .map(|r| r.round().clamp(1.0, 5.0) as u8)
                    .unwrap_or(5),
                title: optional("title"),
                comment: optional("comment"),
                reviewer_name: optional("reviewer_name"),
                reviewer_email: store.with_state(|s| s.user.as_ref().map(|u| u.email.clone())),
            };
            match store.submit_review(review).await {
                Ok(()) => {
                    store.clear_form_feedback();
                    Outcome::stay(router.refresh())
                }
                Err(_) => reject(router, FormId::Review, form, BTreeMap::new()),
            }
        }
        Action::UpdateOrderStatus { order, status } => {
            if let Err(e) = store.update_order_status(order, &status).await {
                tracing::warn!(order, error = %e, "Order status not changed");
                if matches!(e, StoreError::NotAuthenticated) {
                    store.show_toast(ToastKind::Error, "Bitte melde dich als Administrator an.");
                }
            }
            Outcome::stay(router.refresh())
        }
        Action::ToggleFeatured { id } => {
            if let Err(e) = store.toggle_product_featured(id).await {
                tracing::warn!(product = id, error = %e, "Featured flag not changed");
                if matches!(e, StoreError::NotAuthenticated) {
                    store.show_toast(ToastKind::Error, "Bitte melde dich als Administrator an.");
                }
            }
            Outcome::stay(router.refresh())
        }
        Action::SetLanguage(language) => {
            store.set_language(language);
            Outcome::stay(router.refresh())
        }
        Action::DismissToast => {
            store.dismiss_toast();
            Outcome::stay(router.refresh())
        }
        Action::Back => match router.back() {
            Some(navigation) => Outcome::traversed(navigation, HistoryUpdate::Back),
            None => Outcome::stay(router.refresh()),
        },
        Action::Forward => match router.forward() {
            Some(navigation) => Outcome::traversed(navigation, HistoryUpdate::Forward),
            None => Outcome::stay(router.refresh()),
        },
        Action::Popstate { path } => {
            prefetch(router, &path).await;
            Outcome::stay(router.on_popstate(&path))
        }
    }
}

//! Observable Store
//!
//! Holds the [`AppState`], mirrors its persisted subset to local storage and
//! notifies every subscriber synchronously after each mutation.

use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::checkout::{CheckoutDetails, OrderTotals, ShippingPolicy};
use super::error::{StoreError, StoreResult};
use super::state::{
    AppState, CartItem, ContactSubmission, FormFeedback, FormId, Language, OrderSummary, Toast,
    ToastKind, SEARCH_HISTORY_LIMIT,
};
use crate::backend::{
    AnalyticsRange, Backend, BackendError, ContactForm, LoginRequest, NewsletterRequest,
    NewsletterUnsubscribeRequest, ProductQuery, RegisterRequest, ReviewCreate, User,
    ORDER_STATUSES,
};
use crate::catalog::{Product, ProductId};
use crate::storage::{get_json, keys, set_json, LocalStorage, MemoryStorage, StorageResult};

/// Callback invoked with the new state after every mutation
pub type Listener = Arc<dyn Fn(&AppState) + Send + Sync>;

/// Parts of the state mirrored to local storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persisted {
    Cart,
    Wishlist,
    /// User and access token
    Session,
    SearchHistory,
    Language,
    Orders,
    Contacts,
}

struct Shared {
    state: Mutex<AppState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
    storage: Arc<dyn LocalStorage>,
    backend: Arc<dyn Backend>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Application store, cheap to clone
#[derive(Clone)]
pub struct Store {
    shared: Arc<Shared>,
}

/// Handle returned by [`Store::subscribe`]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Stop receiving notifications. Dropping the handle does the same.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            lock(&shared.listeners).retain(|(id, _)| *id != self.id);
            tracing::debug!(listener = self.id, "Store listener removed");
        }
    }
}

impl Store {
    /// Create a store, restoring the persisted subset from `storage`
    pub fn new(storage: Arc<dyn LocalStorage>, backend: Arc<dyn Backend>) -> Self {
        let state = load_persisted(storage.as_ref());

        tracing::info!(
            cart_items = state.cart.len(),
            wishlist = state.wishlist.len(),
            signed_in = state.user.is_some(),
            "Store initialized"
        );

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                storage,
                backend,
            }),
        }
    }

    /// Store backed by volatile storage
    pub fn in_memory(backend: Arc<dyn Backend>) -> Self {
        Self::new(Arc::new(MemoryStorage::new()), backend)
    }

    /// Clone of the current state
    pub fn get_state(&self) -> AppState {
        lock(&self.shared.state).clone()
    }

    /// Read the current state without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&lock(&self.shared.state))
    }

    pub fn storage(&self) -> &dyn LocalStorage {
        self.shared.storage.as_ref()
    }

    fn backend(&self) -> &dyn Backend {
        self.shared.backend.as_ref()
    }

    /// Register a listener called after every mutation
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let id = self.shared.next_listener.fetch_add(1, Ordering::SeqCst);
        lock(&self.shared.listeners).push((id, Arc::new(listener)));
        tracing::debug!(listener = id, "Store listener added");

        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.shared.listeners).len()
    }

    /// Apply `f` to a copy of the state, swap it in, persist and notify.
    ///
    /// Storage is written under the state lock so writes land in commit
    /// order. Listeners run after the lock is released.
    fn update<F>(&self, persisted: &[Persisted], f: F) -> AppState
    where
        F: FnOnce(&mut AppState),
    {
        let snapshot = {
            let mut guard = lock(&self.shared.state);
            let mut next = guard.clone();
            f(&mut next);
            self.persist(&next, persisted);
            *guard = next.clone();
            next
        };

        self.notify(&snapshot);
        snapshot
    }

    fn notify(&self, state: &AppState) {
        let listeners: Vec<Listener> = lock(&self.shared.listeners)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(state);
        }
    }

    fn persist(&self, state: &AppState, parts: &[Persisted]) {
        let storage = self.storage();

        for part in parts {
            let result: StorageResult<()> = match part {
                Persisted::Cart => set_json(storage, keys::CART, &state.cart),
                Persisted::Wishlist => set_json(storage, keys::WISHLIST, &state.wishlist),
                Persisted::Session => persist_session(storage, state),
                Persisted::SearchHistory => {
                    set_json(storage, keys::SEARCH_HISTORY, &state.search_history)
                }
                Persisted::Language => {
                    storage.set_item(keys::PREFERRED_LANGUAGE, state.language.code())
                }
                Persisted::Orders => set_json(storage, keys::ORDERS, &state.orders),
                Persisted::Contacts => {
                    set_json(storage, keys::CONTACT_SUBMISSIONS, &state.contact_submissions)
                }
            };

            if let Err(e) = result {
                tracing::warn!(part = ?part, error = %e, "Failed to persist state");
            }
        }
    }

    // ============ Cart ============

    /// Add `quantity` of `product`, merging with an existing line
    pub fn add_to_cart(&self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        self.update(&[Persisted::Cart], |state| {
            match state.cart.iter_mut().find(|i| i.id == product.id) {
                Some(item) => item.quantity = item.quantity.saturating_add(quantity),
                None => state.cart.push(CartItem::from_product(product, quantity)),
            }
        });

        tracing::debug!(product = product.id, quantity, "Added to cart");
    }

    pub fn remove_from_cart(&self, id: ProductId) {
        self.update(&[Persisted::Cart], |state| {
            state.cart.retain(|i| i.id != id);
        });
    }

    /// Set the quantity of a line; zero or less removes it
    pub fn update_cart_quantity(&self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.update(&[Persisted::Cart], |state| {
            if let Some(item) = state.cart.iter_mut().find(|i| i.id == id) {
                item.quantity = quantity;
            }
        });
    }

    pub fn clear_cart(&self) {
        self.update(&[Persisted::Cart], |state| state.cart.clear());
    }

    // ============ Wishlist ============

    pub fn add_to_wishlist(&self, id: ProductId) {
        self.update(&[Persisted::Wishlist], |state| {
            if !state.wishlist.contains(&id) {
                state.wishlist.push(id);
            }
        });
    }

    pub fn remove_from_wishlist(&self, id: ProductId) {
        self.update(&[Persisted::Wishlist], |state| {
            state.wishlist.retain(|w| *w != id);
        });
    }

    /// Add or remove; returns whether the product is now on the wishlist
    pub fn toggle_wishlist(&self, id: ProductId) -> bool {
        let state = self.update(&[Persisted::Wishlist], |state| {
            if state.wishlist.contains(&id) {
                state.wishlist.retain(|w| *w != id);
            } else {
                state.wishlist.push(id);
            }
        });
        state.in_wishlist(id)
    }

    // ============ Session ============

    /// Record a signed-in user and their access token
    pub fn login(&self, user: User, token: impl Into<String>) {
        let token = token.into();
        tracing::info!(user = %user.email, "Signed in");
        self.update(&[Persisted::Session], |state| {
            state.user = Some(user);
            state.token = Some(token);
            state.error = None;
        });
    }

    pub fn logout(&self) {
        tracing::info!("Signed out");
        self.update(&[Persisted::Session], |state| {
            state.user = None;
            state.token = None;
            state.admin_stats = None;
            state.admin_orders.clear();
            state.admin_customers = None;
            state.admin_analytics = None;
        });
    }

    // ============ UI state ============

    /// Set the current search query and remember it in the search history
    pub fn set_search_query(&self, query: &str) {
        let query = query.trim().to_string();
        self.update(&[Persisted::SearchHistory], |state| {
            if !query.is_empty() {
                state
                    .search_history
                    .retain(|q| !q.eq_ignore_ascii_case(&query));
                state.search_history.insert(0, query.clone());
                state.search_history.truncate(SEARCH_HISTORY_LIMIT);
            }
            state.search_query = query;
        });
    }

    pub fn set_selected_category(&self, category: Option<String>) {
        self.update(&[], |state| state.selected_category = category);
    }

    pub fn set_products(&self, products: Vec<Product>) {
        self.update(&[], |state| state.products = products);
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(&[], |state| state.loading = loading);
    }

    pub fn set_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.update(&[], |state| state.error = Some(error));
    }

    pub fn clear_error(&self) {
        self.update(&[], |state| state.error = None);
    }

    pub fn set_language(&self, language: Language) {
        self.update(&[Persisted::Language], |state| state.language = language);
    }

    pub fn show_toast(&self, kind: ToastKind, message: impl Into<String>) {
        let toast = Toast::new(kind, message);
        self.update(&[], |state| state.toast = Some(toast));
    }

    pub fn dismiss_toast(&self) {
        self.update(&[], |state| state.toast = None);
    }

    /// Remember rejected form input so the view can show it with errors
    pub fn set_form_feedback(&self, form: FormId, feedback: FormFeedback) {
        self.update(&[], |state| state.form = Some((form, feedback)));
    }

    pub fn clear_form_feedback(&self) {
        if self.with_state(|s| s.form.is_some()) {
            self.update(&[], |state| state.form = None);
        }
    }

    // ============ Backend operations ============

    /// Log a failed backend call and surface it in the state
    fn fail(&self, operation: &str, err: BackendError) -> StoreError {
        tracing::error!(operation, error = %err, "Backend operation failed");
        let message = err.user_message();
        self.update(&[], |state| {
            state.loading = false;
            state.error = Some(message.clone());
            state.toast = Some(Toast::new(ToastKind::Error, message.clone()));
        });
        StoreError::Backend(err)
    }

    /// Validate the stored token against the backend.
    ///
    /// A rejected token signs the user out; other failures keep the session.
    pub async fn check_auth_status(&self) -> StoreResult<Option<User>> {
        let Some(token) = self.with_state(|s| s.token.clone()) else {
            return Ok(None);
        };

        match self.backend().current_user(&token).await {
            Ok(user) => {
                self.update(&[Persisted::Session], |state| state.user = Some(user.clone()));
                Ok(Some(user))
            }
            Err(BackendError::Unauthorized) => {
                tracing::info!("Stored token rejected, signing out");
                self.logout();
                Ok(None)
            }
            Err(e) => Err(self.fail("check_auth_status", e)),
        }
    }

    /// Sign in with email and password
    pub async fn login_with_credentials(&self, email: &str, password: &str) -> StoreResult<User> {
        self.set_loading(true);

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let result = async {
            let token = self.backend().login(&request).await?;
            let user = self.backend().current_user(&token.access_token).await?;
            Ok::<_, BackendError>((user, token.access_token))
        }
        .await;

        match result {
            Ok((user, token)) => {
                self.login(user.clone(), token);
                self.set_loading(false);
                Ok(user)
            }
            Err(e) => Err(self.fail("login", e)),
        }
    }

    /// Create an account and sign in with it
    pub async fn register(&self, request: RegisterRequest) -> StoreResult<User> {
        self.set_loading(true);

        if let Err(e) = self.backend().register(&request).await {
            return Err(self.fail("register", e));
        }

        self.login_with_credentials(&request.email, &request.password)
            .await
    }

    /// Replace the product list with the backend's
    pub async fn load_products(&self, query: &ProductQuery) -> StoreResult<usize> {
        self.set_loading(true);

        match self.backend().list_products(query).await {
            Ok(list) => {
                let products: Vec<Product> = list.products.into_iter().map(Product::from).collect();
                let count = products.len();
                self.update(&[], |state| {
                    state.products = products;
                    state.loading = false;
                });
                tracing::debug!(count, "Products loaded");
                Ok(count)
            }
            Err(e) => Err(self.fail("load_products", e)),
        }
    }

    pub async fn load_product_reviews(&self, id: ProductId) -> StoreResult<usize> {
        match self.backend().product_reviews(id).await {
            Ok(reviews) => {
                let count = reviews.len();
                self.update(&[], |state| {
                    state.reviews.insert(id, reviews);
                });
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(product = id, error = %e, "Failed to load reviews");
                Err(StoreError::Backend(e))
            }
        }
    }

    /// Fetch a product the loaded list does not contain yet.
    ///
    /// With no list loaded the whole list is fetched first, so the catalog
    /// never shrinks to a single backend product.
    pub async fn load_product(&self, id: ProductId) -> StoreResult<Product> {
        if self.with_state(|s| s.products.is_empty()) {
            match self.backend().list_products(&ProductQuery::default()).await {
                Ok(list) => {
                    let products: Vec<Product> =
                        list.products.into_iter().map(Product::from).collect();
                    self.update(&[], |state| state.products = products);
                }
                Err(e) => {
                    tracing::warn!(product = id, error = %e, "Failed to load products");
                    return Err(StoreError::Backend(e));
                }
            }
            if let Some(product) =
                self.with_state(|s| s.products.iter().find(|p| p.id == id).cloned())
            {
                return Ok(product);
            }
        }

        match self.backend().get_product(id).await {
            Ok(response) => {
                let product = Product::from(response);
                let added = product.clone();
                self.update(&[], |state| {
                    state.products.retain(|p| p.id != id);
                    state.products.push(added);
                });
                tracing::debug!(product = id, "Product loaded");
                Ok(product)
            }
            Err(e) => {
                tracing::warn!(product = id, error = %e, "Failed to load product");
                Err(StoreError::Backend(e))
            }
        }
    }

    pub async fn load_review_stats(&self, id: ProductId) -> StoreResult<()> {
        match self.backend().review_stats(id).await {
            Ok(stats) => {
                self.update(&[], |state| {
                    state.review_stats.insert(id, stats);
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(product = id, error = %e, "Failed to load review stats");
                Err(StoreError::Backend(e))
            }
        }
    }

    /// Submit a product review; it appears once approved by the shop
    pub async fn submit_review(&self, review: ReviewCreate) -> StoreResult<()> {
        let token = self.with_state(|s| s.token.clone());
        match self.backend().create_review(token.as_deref(), &review).await {
            Ok(_) => {
                self.show_toast(
                    ToastKind::Success,
                    "Danke für deine Bewertung! Sie wird nach Prüfung veröffentlicht.",
                );
                Ok(())
            }
            Err(e) => Err(self.fail("submit_review", e)),
        }
    }

    pub async fn subscribe_to_newsletter(&self, email: &str) -> StoreResult<()> {
        let request = NewsletterRequest {
            email: email.trim().to_string(),
            source: "website".to_string(),
        };

        match self.backend().subscribe_newsletter(&request).await {
            Ok(_) => {
                self.show_toast(ToastKind::Success, "Danke für deine Anmeldung zum Newsletter!");
                Ok(())
            }
            Err(e) => Err(self.fail("subscribe_to_newsletter", e)),
        }
    }

    pub async fn unsubscribe_from_newsletter(&self, email: &str) -> StoreResult<()> {
        let request = NewsletterUnsubscribeRequest {
            email: email.trim().to_string(),
        };

        match self.backend().unsubscribe_newsletter(&request).await {
            Ok(_) => {
                self.show_toast(ToastKind::Success, "Du wurdest vom Newsletter abgemeldet.");
                Ok(())
            }
            Err(e) => Err(self.fail("unsubscribe_from_newsletter", e)),
        }
    }

    pub async fn submit_contact_form(&self, form: ContactForm) -> StoreResult<()> {
        match self.backend().submit_contact(&form).await {
            Ok(response) => {
                let submission = ContactSubmission {
                    form,
                    reference: response.contact_id,
                    submitted_at: Utc::now(),
                };
                self.update(&[Persisted::Contacts], |state| {
                    state.contact_submissions.push(submission);
                    state.toast = Some(Toast::new(ToastKind::Success, response.message.clone()));
                });
                Ok(())
            }
            Err(e) => Err(self.fail("submit_contact_form", e)),
        }
    }

    /// Place an order for the current cart and clear it on success
    pub async fn create_order(
        &self,
        details: &CheckoutDetails,
        shipping: &ShippingPolicy,
    ) -> StoreResult<OrderSummary> {
        let (cart, token) = self.with_state(|s| (s.cart.clone(), s.token.clone()));
        if cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let totals = OrderTotals::compute(&cart, shipping);
        let order = details.to_order(&cart, &totals);

        self.set_loading(true);
        match self.backend().create_order(token.as_deref(), &order).await {
            Ok(response) => {
                let summary = OrderSummary::from_placed(&response, &cart);
                tracing::info!(
                    order_number = %summary.order_number,
                    total = %summary.total,
                    "Order placed"
                );
                self.update(&[Persisted::Cart, Persisted::Orders], |state| {
                    state.cart.clear();
                    state.orders.insert(0, summary.clone());
                    state.loading = false;
                });
                Ok(summary)
            }
            Err(e) => Err(self.fail("create_order", e)),
        }
    }

    /// Replace the local order log with the backend's order list
    pub async fn load_orders(&self) -> StoreResult<usize> {
        let token = self
            .with_state(|s| s.token.clone())
            .ok_or(StoreError::NotAuthenticated)?;

        match self.backend().list_orders(&token).await {
            Ok(orders) => {
                let summaries: Vec<OrderSummary> =
                    orders.iter().map(OrderSummary::from_response).collect();
                let count = summaries.len();
                self.update(&[Persisted::Orders], |state| state.orders = summaries);
                Ok(count)
            }
            Err(e) => Err(self.fail("load_orders", e)),
        }
    }

    pub async fn load_admin_stats(&self) -> StoreResult<()> {
        let token = self
            .with_state(|s| s.token.clone())
            .ok_or(StoreError::NotAuthenticated)?;

        match self.backend().admin_stats(&token).await {
            Ok(stats) => {
                self.update(&[], |state| state.admin_stats = Some(stats));
                Ok(())
            }
            Err(e) => Err(self.fail("load_admin_stats", e)),
        }
    }

    fn admin_token(&self) -> StoreResult<String> {
        self.with_state(|s| s.token.clone())
            .ok_or(StoreError::NotAuthenticated)
    }

    pub async fn load_admin_orders(&self, limit: u32) -> StoreResult<usize> {
        let token = self.admin_token()?;
        match self.backend().admin_recent_orders(&token, limit).await {
            Ok(list) => {
                let count = list.orders.len();
                self.update(&[], |state| state.admin_orders = list.orders);
                Ok(count)
            }
            Err(e) => Err(self.fail("load_admin_orders", e)),
        }
    }

    pub async fn load_admin_customers(&self, skip: u32, limit: u32) -> StoreResult<u64> {
        let token = self.admin_token()?;
        match self.backend().admin_customers(&token, skip, limit).await {
            Ok(page) => {
                let total = page.total;
                self.update(&[], |state| state.admin_customers = Some(page));
                Ok(total)
            }
            Err(e) => Err(self.fail("load_admin_customers", e)),
        }
    }

    pub async fn load_admin_analytics(&self, range: AnalyticsRange) -> StoreResult<()> {
        let token = self.admin_token()?;
        match self.backend().admin_analytics(&token, range).await {
            Ok(analytics) => {
                self.update(&[], |state| state.admin_analytics = Some((range, analytics)));
                Ok(())
            }
            Err(e) => Err(self.fail("load_admin_analytics", e)),
        }
    }

    /// Move an order to `status` and reflect it in the dashboard lists
    pub async fn update_order_status(&self, order_id: u32, status: &str) -> StoreResult<()> {
        if !ORDER_STATUSES.contains(&status) {
            return Err(StoreError::UnknownOrderStatus(status.to_string()));
        }
        let token = self.admin_token()?;

        match self.backend().update_order_status(&token, order_id, status).await {
            Ok(updated) => {
                tracing::info!(order = order_id, status = %updated.new_status, "Order status updated");
                self.update(&[], |state| {
                    for order in state.admin_orders.iter_mut().filter(|o| o.id == order_id) {
                        order.status = updated.new_status.clone();
                    }
                    if let Some(stats) = state.admin_stats.as_mut() {
                        for order in stats.recent_orders.iter_mut().filter(|o| o.id == order_id) {
                            order.status = updated.new_status.clone();
                        }
                    }
                    state.toast = Some(Toast::new(ToastKind::Success, "Bestellstatus aktualisiert."));
                });
                Ok(())
            }
            Err(e) => Err(self.fail("update_order_status", e)),
        }
    }

    /// Flip the featured flag of a product; returns the new flag
    pub async fn toggle_product_featured(&self, id: ProductId) -> StoreResult<bool> {
        let token = self.admin_token()?;

        match self.backend().toggle_product_featured(&token, id).await {
            Ok(updated) => {
                let featured = updated.is_featured;
                let message = if featured {
                    "Produkt wird jetzt hervorgehoben."
                } else {
                    "Produkt wird nicht mehr hervorgehoben."
                };
                self.update(&[], |state| {
                    for product in state.products.iter_mut().filter(|p| p.id == id) {
                        product.is_featured = featured;
                    }
                    state.toast = Some(Toast::new(ToastKind::Success, message));
                });
                Ok(featured)
            }
            Err(e) => Err(self.fail("toggle_product_featured", e)),
        }
    }
}

fn persist_session(storage: &dyn LocalStorage, state: &AppState) -> StorageResult<()> {
    match &state.user {
        Some(user) => set_json(storage, keys::USER, user)?,
        None => storage.remove_item(keys::USER)?,
    }
    match &state.token {
        Some(token) => storage.set_item(keys::ACCESS_TOKEN, token),
        None => storage.remove_item(keys::ACCESS_TOKEN),
    }
}

fn read<T: DeserializeOwned>(storage: &dyn LocalStorage, key: &str) -> Option<T> {
    match get_json(storage, key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring unreadable stored value");
            None
        }
    }
}

fn read_raw(storage: &dyn LocalStorage, key: &str) -> Option<String> {
    storage.get_item(key).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Failed to read local storage");
        None
    })
}

/// Restore the persisted subset of the state
fn load_persisted(storage: &dyn LocalStorage) -> AppState {
    let mut cart: Vec<CartItem> = read(storage, keys::CART).unwrap_or_default();
    cart.retain(|i| i.quantity >= 1);

    let mut seen = BTreeSet::new();
    cart.retain(|i| seen.insert(i.id));

    for legacy in [keys::LEGACY_CART, keys::LEGACY_WISHLIST] {
        if read_raw(storage, legacy).is_some() {
            tracing::warn!(
                key = legacy,
                "Found data under a legacy storage key; it is not merged into the store"
            );
        }
    }

    AppState {
        cart,
        wishlist: read(storage, keys::WISHLIST).unwrap_or_default(),
        user: read(storage, keys::USER),
        token: read_raw(storage, keys::ACCESS_TOKEN),
        search_history: read(storage, keys::SEARCH_HISTORY).unwrap_or_default(),
        language: read_raw(storage, keys::PREFERRED_LANGUAGE)
            .and_then(|code| Language::parse(&code))
            .unwrap_or_default(),
        orders: read(storage, keys::ORDERS).unwrap_or_default(),
        contact_submissions: read(storage, keys::CONTACT_SUBMISSIONS).unwrap_or_default(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::catalog::Catalog;
    use crate::money::Money;
    use std::sync::atomic::AtomicUsize;

    fn store() -> Store {
        Store::in_memory(Arc::new(FakeBackend::new()))
    }

    fn product(id: ProductId) -> Product {
        Catalog::builtin().find(id).cloned().unwrap()
    }

    #[test]
    fn test_add_to_cart_merges_same_product() {
        let store = store();
        let korsika = product(2);

        store.add_to_cart(&korsika, 1);
        store.add_to_cart(&korsika, 2);

        let state = store.get_state();
        assert_eq!(state.cart.len(), 1);
        assert_eq!(state.cart[0].quantity, 3);
        assert_eq!(state.cart_subtotal(), Money::from_cents(3 * 4990));
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let store = store();
        store.add_to_cart(&product(2), 0);
        assert!(store.get_state().cart.is_empty());
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let store = store();
        store.add_to_cart(&product(2), 2);
        store.add_to_cart(&product(7), 1);

        store.update_cart_quantity(2, 5);
        assert_eq!(store.get_state().cart_item(2).map(|i| i.quantity), Some(5));

        store.update_cart_quantity(2, 0);
        let state = store.get_state();
        assert!(state.cart_item(2).is_none());
        assert_eq!(state.cart.len(), 1);

        store.update_cart_quantity(7, -3);
        assert!(store.get_state().cart.is_empty());
    }

    #[test]
    fn test_wishlist_has_no_duplicates() {
        let store = store();
        store.add_to_wishlist(3);
        store.add_to_wishlist(3);
        assert_eq!(store.get_state().wishlist, vec![3]);

        assert!(!store.toggle_wishlist(3));
        assert!(store.toggle_wishlist(4));
        store.remove_from_wishlist(4);
        assert!(store.get_state().wishlist.is_empty());
    }

    #[test]
    fn test_subscribers_notified_until_unsubscribed() {
        let store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let last_count = Arc::new(AtomicUsize::new(0));

        let subscription = {
            let calls = Arc::clone(&calls);
            let last_count = Arc::clone(&last_count);
            store.subscribe(move |state| {
                calls.fetch_add(1, Ordering::SeqCst);
                last_count.store(state.cart_count() as usize, Ordering::SeqCst);
            })
        };
        assert_eq!(store.listener_count(), 1);

        store.add_to_cart(&product(2), 2);
        store.set_search_query("kette");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(last_count.load(Ordering::SeqCst), 2);

        subscription.unsubscribe();
        assert_eq!(store.listener_count(), 0);

        store.clear_cart();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropped_subscription_stops_notifications() {
        let store = store();
        let calls = Arc::new(AtomicUsize::new(0));

        {
            let calls = Arc::clone(&calls);
            let _subscription = store.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
            store.add_to_cart(&product(2), 1);
            assert_eq!(store.listener_count(), 1);
        }

        assert_eq!(store.listener_count(), 0);
        store.add_to_cart(&product(2), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Storage whose first write stalls, letting a later write overtake it
    struct SlowFirstWrite {
        inner: MemoryStorage,
        stalled: std::sync::atomic::AtomicBool,
    }

    impl LocalStorage for SlowFirstWrite {
        fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(200));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> StorageResult<()> {
            self.inner.remove_item(key)
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            self.inner.keys()
        }
    }

    #[test]
    fn test_concurrent_mutations_persist_in_commit_order() {
        let storage: Arc<dyn LocalStorage> = Arc::new(SlowFirstWrite {
            inner: MemoryStorage::new(),
            stalled: std::sync::atomic::AtomicBool::new(false),
        });
        let backend: Arc<dyn Backend> = Arc::new(FakeBackend::new());
        let store = Store::new(Arc::clone(&storage), Arc::clone(&backend));

        let first = {
            let store = store.clone();
            std::thread::spawn(move || store.add_to_cart(&product(2), 1))
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        let second = {
            let store = store.clone();
            std::thread::spawn(move || store.add_to_cart(&product(7), 1))
        };
        first.join().unwrap();
        second.join().unwrap();

        let in_memory = store.get_state().cart;
        let reloaded = Store::new(storage, backend).get_state().cart;
        assert_eq!(in_memory.len(), 2);
        assert_eq!(reloaded, in_memory);
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = store();
        let seen = Arc::new(AtomicUsize::new(0));
        let inner = store.clone();
        let seen_by_listener = Arc::clone(&seen);
        let _subscription = store.subscribe(move |_| {
            let count = inner.with_state(|s| s.cart.len());
            seen_by_listener.store(count, Ordering::SeqCst);
        });

        store.add_to_cart(&product(1), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_state_survives_fresh_store() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        let backend: Arc<dyn Backend> = Arc::new(FakeBackend::new());

        let user = User {
            id: 1,
            email: "a@b.de".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            is_active: true,
            is_admin: false,
            newsletter_subscribed: false,
        };

        let first = Store::new(Arc::clone(&storage), Arc::clone(&backend));
        first.add_to_cart(&product(2), 2);
        first.add_to_cart(&product(7), 1);
        first.add_to_wishlist(4);
        first.login(user.clone(), "token-a@b.de");
        first.set_language(Language::En);

        let second = Store::new(storage, backend);
        let state = second.get_state();
        assert_eq!(state.cart, first.get_state().cart);
        assert_eq!(state.wishlist, vec![4]);
        assert_eq!(state.user, Some(user));
        assert_eq!(state.token.as_deref(), Some("token-a@b.de"));
        assert_eq!(state.language, Language::En);
    }

    #[test]
    fn test_logout_clears_persisted_session() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        let store = Store::new(Arc::clone(&storage), Arc::new(FakeBackend::new()));
        store.login(
            User {
                id: 1,
                email: "a@b.de".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                is_active: true,
                is_admin: false,
                newsletter_subscribed: false,
            },
            "t",
        );
        store.logout();

        assert_eq!(storage.get_item(keys::USER).unwrap(), None);
        assert_eq!(storage.get_item(keys::ACCESS_TOKEN).unwrap(), None);
    }

    #[test]
    fn test_corrupt_and_legacy_storage_is_ignored() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(keys::CART, "{broken").unwrap();
        storage
            .set_item(keys::LEGACY_CART, r#"[{"id":1,"price":"24,90 €"}]"#)
            .unwrap();
        storage.set_item(keys::WISHLIST, "[1,2]").unwrap();

        let store = Store::new(storage, Arc::new(FakeBackend::new()));
        let state = store.get_state();
        assert!(state.cart.is_empty());
        assert_eq!(state.wishlist, vec![1, 2]);
    }

    #[test]
    fn test_search_history_recent_unique_bounded() {
        let store = store();
        for i in 0..12 {
            store.set_search_query(&format!("q{}", i));
        }
        store.set_search_query("Q5");
        store.set_search_query("   ");

        let state = store.get_state();
        assert_eq!(state.search_history.len(), SEARCH_HISTORY_LIMIT);
        assert_eq!(state.search_history[0], "Q5");
        assert_eq!(
            state
                .search_history
                .iter()
                .filter(|q| q.eq_ignore_ascii_case("q5"))
                .count(),
            1
        );
        assert_eq!(state.search_query, "");
    }

    #[tokio::test]
    async fn test_login_with_credentials() {
        let backend = FakeBackend::new().with_account("a@b.de", "geheim123", false);
        let store = Store::in_memory(Arc::new(backend));

        let user = store.login_with_credentials("a@b.de", "geheim123").await.unwrap();
        assert_eq!(user.email, "a@b.de");

        let state = store.get_state();
        assert!(state.is_authenticated());
        assert!(!state.loading);
        assert_eq!(state.token, Some(FakeBackend::token_for("a@b.de")));
    }

    #[tokio::test]
    async fn test_failed_login_sets_error() {
        let backend = FakeBackend::new().with_account("a@b.de", "geheim123", false);
        let store = Store::in_memory(Arc::new(backend));

        let err = store.login_with_credentials("a@b.de", "falsch").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(BackendError::Unauthorized)));

        let state = store.get_state();
        assert!(!state.is_authenticated());
        assert!(!state.loading);
        assert!(state.error.is_some());
        assert_eq!(state.toast.map(|t| t.kind), Some(ToastKind::Error));
    }

    #[tokio::test]
    async fn test_check_auth_status_signs_out_on_rejected_token() {
        let store = Store::in_memory(Arc::new(FakeBackend::new()));
        store.login(
            User {
                id: 9,
                email: "x@y.de".to_string(),
                first_name: "X".to_string(),
                last_name: "Y".to_string(),
                is_active: true,
                is_admin: false,
                newsletter_subscribed: false,
            },
            "stale",
        );

        assert_eq!(store.check_auth_status().await.unwrap(), None);
        assert!(store.get_state().user.is_none());
    }

    #[tokio::test]
    async fn test_check_auth_status_keeps_session_when_offline() {
        let backend = Arc::new(FakeBackend::new().with_account("a@b.de", "pw", false));
        let store = Store::in_memory(backend.clone());
        store.login_with_credentials("a@b.de", "pw").await.unwrap();

        backend.set_offline(true);
        assert!(store.check_auth_status().await.is_err());
        assert!(store.get_state().user.is_some());
    }

    #[tokio::test]
    async fn test_register_signs_in() {
        let store = Store::in_memory(Arc::new(FakeBackend::new()));
        let user = store
            .register(RegisterRequest {
                email: "neu@b.de".to_string(),
                password: "geheim123".to_string(),
                first_name: "Neu".to_string(),
                last_name: "Kundin".to_string(),
                newsletter_subscribed: true,
            })
            .await
            .unwrap();

        assert_eq!(user.first_name, "Neu");
        assert!(store.get_state().is_authenticated());
    }

    #[tokio::test]
    async fn test_create_order_clears_cart_and_logs_order() {
        let backend = Arc::new(FakeBackend::new());
        let store = Store::in_memory(backend.clone());
        store.add_to_cart(&product(2), 1);

        let details = CheckoutDetails {
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            email: "a@b.de".to_string(),
            street: "Hauptstr. 1".to_string(),
            postal_code: "10115".to_string(),
            city: "Berlin".to_string(),
            country: "Deutschland".to_string(),
            payment_method: "paypal".to_string(),
            ..Default::default()
        };

        let summary = store
            .create_order(&details, &ShippingPolicy::default())
            .await
            .unwrap();

        assert_eq!(summary.total, Money::from_cents(4990 + 490));
        assert_eq!(summary.item_count(), 1);

        let state = store.get_state();
        assert!(state.cart.is_empty());
        assert_eq!(state.order(&summary.order_number), Some(&summary));
        assert_eq!(backend.orders.lock().unwrap().len(), 1);

        let persisted: Vec<OrderSummary> = get_json(store.storage(), keys::ORDERS).unwrap().unwrap();
        assert_eq!(persisted.len(), 1);
    }

    #[tokio::test]
    async fn test_create_order_with_empty_cart() {
        let store = store();
        let err = store
            .create_order(&CheckoutDetails::default(), &ShippingPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyCart));
    }

    #[tokio::test]
    async fn test_failed_order_keeps_cart() {
        let store = Store::in_memory(Arc::new(FakeBackend::offline()));
        store.add_to_cart(&product(2), 1);

        assert!(store
            .create_order(&CheckoutDetails::default(), &ShippingPolicy::default())
            .await
            .is_err());

        let state = store.get_state();
        assert_eq!(state.cart.len(), 1);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_newsletter_and_contact() {
        let backend = Arc::new(FakeBackend::new());
        let store = Store::in_memory(backend.clone());

        store.subscribe_to_newsletter("a@b.de").await.unwrap();
        assert!(store.subscribe_to_newsletter("a@b.de").await.is_err());
        store.unsubscribe_from_newsletter("a@b.de").await.unwrap();

        store
            .submit_contact_form(ContactForm {
                first_name: "Ana".to_string(),
                last_name: "Lopez".to_string(),
                email: "a@b.de".to_string(),
                subject: "Lieferung".to_string(),
                message: "Wann kommt meine Kette?".to_string(),
            })
            .await
            .unwrap();

        let state = store.get_state();
        assert_eq!(state.contact_submissions.len(), 1);
        assert_eq!(
            state.contact_submissions[0].reference.as_deref(),
            Some("contact_1")
        );
    }

    #[tokio::test]
    async fn test_admin_stats_requires_admin() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_account("kunde@b.de", "pw", false)
                .with_account("admin@b.de", "pw", true),
        );

        let store = Store::in_memory(backend.clone());
        assert!(matches!(
            store.load_admin_stats().await,
            Err(StoreError::NotAuthenticated)
        ));

        store.login_with_credentials("kunde@b.de", "pw").await.unwrap();
        assert!(store.load_admin_stats().await.is_err());

        store.login_with_credentials("admin@b.de", "pw").await.unwrap();
        store.load_admin_stats().await.unwrap();
        assert!(store.get_state().admin_stats.is_some());
    }

    #[tokio::test]
    async fn test_admin_order_status_and_featured() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_account("admin@b.de", "pw", true)
                .with_product(2, "KORSIKA Kette", 49.9),
        );
        let store = Store::in_memory(backend.clone());
        store.add_to_cart(&product(2), 1);
        let details = CheckoutDetails {
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            email: "a@b.de".to_string(),
            ..Default::default()
        };
        store
            .create_order(&details, &ShippingPolicy::default())
            .await
            .unwrap();

        assert!(matches!(
            store.update_order_status(1, "shipped").await,
            Err(StoreError::NotAuthenticated)
        ));

        store.login_with_credentials("admin@b.de", "pw").await.unwrap();
        store.load_products(&ProductQuery::default()).await.unwrap();
        assert_eq!(store.load_admin_orders(20).await.unwrap(), 1);
        assert_eq!(store.get_state().admin_orders[0].customer_name, "Ana Lopez");

        assert!(matches!(
            store.update_order_status(1, "lost").await,
            Err(StoreError::UnknownOrderStatus(_))
        ));
        store.update_order_status(1, "shipped").await.unwrap();
        assert_eq!(store.get_state().admin_orders[0].status, "shipped");
        assert_eq!(backend.order_statuses.lock().unwrap().get(&1).map(String::as_str), Some("shipped"));

        assert!(store.toggle_product_featured(2).await.unwrap());
        let state = store.get_state();
        assert!(state.products.iter().any(|p| p.id == 2 && p.is_featured));

        assert_eq!(store.load_admin_customers(0, 50).await.unwrap(), 1);
        store.load_admin_analytics(AnalyticsRange::Week).await.unwrap();
        assert_eq!(
            store.get_state().admin_analytics.map(|(range, _)| range),
            Some(AnalyticsRange::Week)
        );

        store.logout();
        let state = store.get_state();
        assert!(state.admin_orders.is_empty());
        assert!(state.admin_customers.is_none());
    }

    #[tokio::test]
    async fn test_load_missing_product_and_review_stats() {
        let backend = Arc::new(FakeBackend::new().with_product(42, "Neue Tasche", 39.0));
        let store = Store::in_memory(backend.clone());

        let loaded = store.load_product(42).await.unwrap();
        assert_eq!(loaded.price, Money::from_cents(3900));
        assert_eq!(store.get_state().products.len(), 1);
        assert!(store.load_product(43).await.is_err());

        let added = FakeBackend::new().with_product(43, "Strandkleid", 59.0);
        let response = added.products.lock().unwrap().pop().unwrap();
        backend.products.lock().unwrap().push(response);
        assert_eq!(store.load_product(43).await.unwrap().name, "Strandkleid");
        assert_eq!(store.get_state().products.len(), 2);

        store
            .submit_review(ReviewCreate {
                product_id: 42,
                rating: 4,
                title: None,
                comment: None,
                reviewer_name: None,
                reviewer_email: None,
            })
            .await
            .unwrap();
        store.load_review_stats(42).await.unwrap();
        let stats = store.get_state().review_stats.get(&42).cloned().unwrap();
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.average_rating, 4.0);
    }
}

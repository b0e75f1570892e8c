//! In-memory stand-in for the demo storefront
//!
//! [`FakeStorefront`] implements [`Page`] by modelling the handful of views
//! and selectors the suite touches, so scenarios, YAML specs and the runner
//! can be exercised without node, a browser or the network. Actions on
//! elements the current view does not render fail the way Playwright does,
//! with [`E2eError::Timeout`].
//!
//! [`Quirk`]s switch on specific storefront bugs to prove that scenarios
//! actually catch them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{E2eError, E2eResult};
use crate::page::{Launcher, Page};
use crate::pages::checkout::{COMPLETE_TITLE, INFO_TITLE, ORDER_CONFIRMATION, OVERVIEW_TITLE};
use crate::pages::{cart, inventory, selectors as sel, Credentials, Product, SortOrder};

pub const COMPLETE_TEXT: &str =
    "Your order has been dispatched, and will arrive just as fast as the pony can get there!";

const ADD_PREFIX: &str = "[data-test=\"add-to-cart-";
const REMOVE_PREFIX: &str = "[data-test=\"remove-";
const TAX_PERCENT: u64 = 8;

/// Storefront bugs that can be switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quirk {
    /// The sort control changes nothing
    SortIgnored,
    /// The cart badge is never rendered
    CartBadgeMissing,
    /// Remove buttons do nothing
    RemoveIgnored,
    /// The first-name check is skipped, so the last name is reported first
    FirstNameNotValidated,
    /// The logout link only closes the menu
    LogoutIgnored,
    /// The item total is shown without a currency sign
    SubtotalUnformatted,
    /// The order confirmation banner has the wrong wording
    WrongConfirmation,
    /// Continue shopping empties the cart
    CartClearedOnContinue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Blank,
    NotFound,
    Login,
    Inventory,
    Cart,
    CheckoutInfo,
    Overview,
    Complete,
}

impl View {
    fn path(&self) -> &'static str {
        match self {
            View::Blank | View::NotFound => "",
            View::Login => "/",
            View::Inventory => "/inventory.html",
            View::Cart => "/cart.html",
            View::CheckoutInfo => "/checkout-step-one.html",
            View::Overview => "/checkout-step-two.html",
            View::Complete => "/checkout-complete.html",
        }
    }

    fn from_path(path: &str) -> View {
        match path {
            "" | "/" => View::Login,
            "/inventory.html" => View::Inventory,
            "/cart.html" => View::Cart,
            "/checkout-step-one.html" => View::CheckoutInfo,
            "/checkout-step-two.html" => View::Overview,
            "/checkout-complete.html" => View::Complete,
            _ => View::NotFound,
        }
    }

    fn title(&self) -> Option<&'static str> {
        match self {
            View::Inventory => Some(inventory::TITLE),
            View::Cart => Some(cart::TITLE),
            View::CheckoutInfo => Some(INFO_TITLE),
            View::Overview => Some(OVERVIEW_TITLE),
            View::Complete => Some(COMPLETE_TITLE),
            View::Blank | View::NotFound | View::Login => None,
        }
    }

    fn logged_in_only(&self) -> bool {
        !matches!(self, View::Blank | View::NotFound | View::Login)
    }
}

struct State {
    view: View,
    path: String,
    logged_in: bool,
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    postal_code: String,
    error: Option<String>,
    menu_open: bool,
    cart: Vec<Product>,
    sort: SortOrder,
    closed: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            view: View::Blank,
            path: String::new(),
            logged_in: false,
            username: String::new(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            postal_code: String::new(),
            error: None,
            menu_open: false,
            cart: Vec::new(),
            sort: SortOrder::NameAsc,
            closed: false,
        }
    }
}

/// One fake browser tab on the storefront
pub struct FakeStorefront {
    base_url: String,
    quirks: HashSet<Quirk>,
    action_timeout: Duration,
    state: Mutex<State>,
    closed_counter: Option<Arc<AtomicUsize>>,
}

impl FakeStorefront {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            quirks: HashSet::new(),
            action_timeout: Duration::from_millis(50),
            state: Mutex::new(State::default()),
            closed_counter: None,
        }
    }

    pub fn with_quirk(mut self, quirk: Quirk) -> Self {
        self.quirks.insert(quirk);
        self
    }

    /// Products currently in the cart, in the order they were added
    pub fn cart(&self) -> Vec<Product> {
        self.lock().cart.clone()
    }

    fn has(&self, quirk: Quirk) -> bool {
        self.quirks.contains(&quirk)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock can only come from a test assertion
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn open(&self) -> E2eResult<MutexGuard<'_, State>> {
        let state = self.lock();
        if state.closed {
            return Err(E2eError::Driver("session already closed".to_string()));
        }
        Ok(state)
    }

    fn timeout(&self, selector: &str, condition: &str) -> E2eError {
        E2eError::Timeout {
            selector: selector.to_string(),
            condition: condition.to_string(),
            timeout_ms: self.action_timeout.as_millis() as u64,
        }
    }

    fn navigate(&self, state: &mut State, view: View) {
        state.menu_open = false;
        state.error = None;

        let view = if view.logged_in_only() && !state.logged_in {
            state.error = Some(format!(
                "Epic sadface: You can only access '{}' when you are logged in.",
                view.path()
            ));
            View::Login
        } else {
            view
        };

        if view == View::CheckoutInfo {
            state.first_name.clear();
            state.last_name.clear();
            state.postal_code.clear();
        }
        state.view = view;
        state.path = view.path().to_string();
    }

    /// Inventory listing in display order
    fn listing(&self, state: &State) -> Vec<Product> {
        let mut products = Product::ALL.to_vec();
        let order = if self.has(Quirk::SortIgnored) {
            SortOrder::NameAsc
        } else {
            state.sort
        };
        match order {
            SortOrder::NameAsc => products.sort_by_key(|p| p.name()),
            SortOrder::NameDesc => products.sort_by(|a, b| b.name().cmp(a.name())),
            SortOrder::PriceLowHigh => products.sort_by_key(|p| p.price_cents()),
            SortOrder::PriceHighLow => products.sort_by(|a, b| b.price_cents().cmp(&a.price_cents())),
        }
        products
    }

    /// Text of every element matching `selector` in the current view
    fn elements(&self, state: &State, selector: &str) -> Vec<String> {
        let view = state.view;
        let one = |text: &str| vec![text.to_string()];

        if view.logged_in_only() {
            match selector {
                sel::TITLE => return view.title().map(one).unwrap_or_default(),
                sel::CART_LINK => return one(""),
                sel::CART_BADGE => {
                    if state.cart.is_empty() || self.has(Quirk::CartBadgeMissing) {
                        return Vec::new();
                    }
                    return one(&state.cart.len().to_string());
                }
                sel::BURGER_MENU => return one("Open Menu"),
                sel::LOGOUT_LINK if state.menu_open => return one("Logout"),
                _ => {}
            }
        }

        let names = |products: &[Product]| products.iter().map(|p| p.name().to_string()).collect();
        let prices = |products: &[Product]| {
            products.iter().map(|p| format_price(p.price_cents())).collect()
        };

        match (view, selector) {
            (View::Login, sel::USERNAME) => one(&state.username),
            (View::Login, sel::PASSWORD) => one(&state.password),
            (View::Login, sel::LOGIN_BUTTON) => one("Login"),
            (View::Login | View::CheckoutInfo, sel::ERROR) => {
                state.error.as_deref().map(one).unwrap_or_default()
            }

            (View::Inventory, sel::ITEM_NAME) => names(&self.listing(state)),
            (View::Inventory, sel::ITEM_PRICE) => prices(&self.listing(state)),
            (View::Inventory, sel::SORT_CONTAINER) => one("Name (A to Z)Name (Z to A)Price (low to high)Price (high to low)"),
            (View::Inventory, s) if s.starts_with(ADD_PREFIX) => match product_in(s, ADD_PREFIX) {
                Some(p) if !state.cart.contains(&p) => one("Add to cart"),
                _ => Vec::new(),
            },
            (View::Inventory | View::Cart, s) if s.starts_with(REMOVE_PREFIX) => {
                match product_in(s, REMOVE_PREFIX) {
                    Some(p) if state.cart.contains(&p) => one("Remove"),
                    _ => Vec::new(),
                }
            }

            (View::Cart | View::Overview, sel::CART_ITEM | sel::ITEM_NAME) => names(&state.cart),
            (View::Cart | View::Overview, sel::ITEM_PRICE) => prices(&state.cart),
            (View::Cart, sel::CHECKOUT) => one("Checkout"),
            (View::Cart, sel::CONTINUE_SHOPPING) => one("Continue Shopping"),

            (View::CheckoutInfo, sel::FIRST_NAME) => one(&state.first_name),
            (View::CheckoutInfo, sel::LAST_NAME) => one(&state.last_name),
            (View::CheckoutInfo, sel::POSTAL_CODE) => one(&state.postal_code),
            (View::CheckoutInfo, sel::CONTINUE) => one("Continue"),

            (View::Overview, sel::SUBTOTAL_LABEL) => {
                let total = format_price(subtotal_cents(&state.cart));
                if self.has(Quirk::SubtotalUnformatted) {
                    one(&format!("Item total: {}", total.trim_start_matches('$')))
                } else {
                    one(&format!("Item total: {total}"))
                }
            }
            (View::Overview, sel::TAX_LABEL) => {
                one(&format!("Tax: {}", format_price(tax_cents(&state.cart))))
            }
            (View::Overview, sel::TOTAL_LABEL) => one(&format!(
                "Total: {}",
                format_price(subtotal_cents(&state.cart) + tax_cents(&state.cart))
            )),
            (View::Overview, sel::FINISH) => one("Finish"),

            (View::Complete, sel::COMPLETE_HEADER) if self.has(Quirk::WrongConfirmation) => {
                one("Thanks for your order")
            }
            (View::Complete, sel::COMPLETE_HEADER) => one(ORDER_CONFIRMATION),
            (View::Complete, sel::COMPLETE_TEXT) => one(COMPLETE_TEXT),
            (View::Complete, sel::BACK_TO_PRODUCTS) => one("Back Home"),

            _ => Vec::new(),
        }
    }

    fn submit_login(&self, state: &mut State) {
        let error = if state.username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if state.password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if state.password != Credentials::PASSWORD {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else if state.username == Credentials::LOCKED_OUT_USER {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else if state.username == Credentials::STANDARD_USER {
            None
        } else {
            Some("Epic sadface: Username and password do not match any user in this service")
        };

        match error {
            Some(message) => state.error = Some(message.to_string()),
            None => {
                state.logged_in = true;
                self.navigate(state, View::Inventory);
            }
        }
    }

    fn submit_shipping(&self, state: &mut State) {
        let missing = if state.first_name.is_empty() && !self.has(Quirk::FirstNameNotValidated) {
            Some("First Name")
        } else if state.last_name.is_empty() {
            Some("Last Name")
        } else if state.postal_code.is_empty() {
            Some("Postal Code")
        } else {
            None
        };

        match missing {
            Some(field) => state.error = Some(format!("Error: {field} is required")),
            None => self.navigate(state, View::Overview),
        }
    }
}

#[async_trait]
impl Page for FakeStorefront {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.open()?;
        let path = url
            .strip_prefix(&self.base_url)
            .ok_or_else(|| E2eError::Driver(format!("net::ERR_NAME_NOT_RESOLVED at {url}")))?;

        let view = View::from_path(path);
        if view == View::NotFound {
            state.view = View::NotFound;
            state.path = path.to_string();
            return Ok(());
        }
        self.navigate(&mut state, view);
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        let mut state = self.open()?;
        if self.elements(&state, selector).is_empty() {
            return Err(self.timeout(selector, "be editable"));
        }

        let field = match selector {
            sel::USERNAME => &mut state.username,
            sel::PASSWORD => &mut state.password,
            sel::FIRST_NAME => &mut state.first_name,
            sel::LAST_NAME => &mut state.last_name,
            sel::POSTAL_CODE => &mut state.postal_code,
            _ => {
                return Err(E2eError::Driver(format!(
                    "Element {selector} is not an <input>, <textarea> or <select> element"
                )))
            }
        };
        *field = value.to_string();
        Ok(())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        let mut state = self.open()?;
        if self.elements(&state, selector).is_empty() {
            return Err(self.timeout(selector, "be clickable"));
        }

        match selector {
            sel::LOGIN_BUTTON => self.submit_login(&mut state),
            sel::CART_LINK => self.navigate(&mut state, View::Cart),
            sel::BURGER_MENU => state.menu_open = true,
            sel::LOGOUT_LINK => {
                if self.has(Quirk::LogoutIgnored) {
                    state.menu_open = false;
                } else {
                    state.logged_in = false;
                    state.username.clear();
                    state.password.clear();
                    self.navigate(&mut state, View::Login);
                }
            }
            sel::CHECKOUT => self.navigate(&mut state, View::CheckoutInfo),
            sel::CONTINUE_SHOPPING | sel::BACK_TO_PRODUCTS => {
                if selector == sel::CONTINUE_SHOPPING && self.has(Quirk::CartClearedOnContinue) {
                    state.cart.clear();
                }
                self.navigate(&mut state, View::Inventory)
            }
            sel::CONTINUE => self.submit_shipping(&mut state),
            sel::FINISH => {
                state.cart.clear();
                self.navigate(&mut state, View::Complete);
            }
            s if s.starts_with(ADD_PREFIX) => {
                if let Some(product) = product_in(s, ADD_PREFIX) {
                    state.cart.push(product);
                }
            }
            s if s.starts_with(REMOVE_PREFIX) => {
                if !self.has(Quirk::RemoveIgnored) {
                    if let Some(product) = product_in(s, REMOVE_PREFIX) {
                        state.cart.retain(|p| *p != product);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()> {
        let mut state = self.open()?;
        if selector != sel::SORT_CONTAINER || self.elements(&state, selector).is_empty() {
            return Err(self.timeout(selector, "be selectable"));
        }
        state.sort = SortOrder::from_value(value)
            .ok_or_else(|| self.timeout(selector, "offer the option"))?;
        Ok(())
    }

    async fn text(&self, selector: &str) -> E2eResult<Option<String>> {
        let state = self.open()?;
        Ok(self.elements(&state, selector).into_iter().next())
    }

    async fn all_texts(&self, selector: &str) -> E2eResult<Vec<String>> {
        let state = self.open()?;
        Ok(self.elements(&state, selector))
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        let state = self.open()?;
        Ok(self.elements(&state, selector).len())
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        Ok(self.count(selector).await? > 0)
    }

    async fn url(&self) -> E2eResult<String> {
        let state = self.open()?;
        if state.view == View::Blank {
            return Ok("about:blank".to_string());
        }
        Ok(format!("{}{}", self.base_url, state.path))
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let state = self.open()?;
        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.extend_from_slice(state.path.as_bytes());
        Ok(png)
    }

    async fn close(&self) -> E2eResult<()> {
        let mut state = self.lock();
        if !state.closed {
            state.closed = true;
            if let Some(counter) = &self.closed_counter {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}

/// Hands out fresh [`FakeStorefront`] tabs and counts them
pub struct FakeLauncher {
    base_url: String,
    quirks: Vec<Quirk>,
    launched: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            quirks: Vec::new(),
            launched: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_quirk(mut self, quirk: Quirk) -> Self {
        self.quirks.push(quirk);
        self
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn Page>> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        let mut page = FakeStorefront::new(&self.base_url);
        for quirk in &self.quirks {
            page = page.with_quirk(*quirk);
        }
        page.closed_counter = Some(Arc::clone(&self.closed));
        Ok(Box::new(page))
    }
}

fn product_in(selector: &str, prefix: &str) -> Option<Product> {
    selector
        .strip_prefix(prefix)?
        .strip_suffix("\"]")
        .and_then(Product::from_slug)
}

fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

fn subtotal_cents(cart: &[Product]) -> u64 {
    cart.iter().map(Product::price_cents).sum()
}

fn tax_cents(cart: &[Product]) -> u64 {
    (subtotal_cents(cart) * TAX_PERCENT + 50) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://shop.test";

    async fn logged_in() -> FakeStorefront {
        let page = FakeStorefront::new(BASE);
        page.goto(&format!("{BASE}/")).await.unwrap();
        page.fill(sel::USERNAME, Credentials::STANDARD_USER).await.unwrap();
        page.fill(sel::PASSWORD, Credentials::PASSWORD).await.unwrap();
        page.click(sel::LOGIN_BUTTON).await.unwrap();
        page
    }

    #[test]
    fn test_format_price_and_tax() {
        assert_eq!(format_price(2999), "$29.99");
        assert_eq!(format_price(5), "$0.05");
        // 39.98 * 8% = 3.1984
        assert_eq!(tax_cents(&[Product::Backpack, Product::BikeLight]), 320);
    }

    #[tokio::test]
    async fn test_login_lands_on_inventory() {
        let page = logged_in().await;
        assert_eq!(page.text(sel::TITLE).await.unwrap().as_deref(), Some("Products"));
        assert_eq!(page.url().await.unwrap(), format!("{BASE}/inventory.html"));
        assert_eq!(page.count(sel::ITEM_NAME).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_deep_link_requires_login() {
        let page = FakeStorefront::new(BASE);
        page.goto(&format!("{BASE}/cart.html")).await.unwrap();
        assert_eq!(page.url().await.unwrap(), format!("{BASE}/"));
        let error = page.text(sel::ERROR).await.unwrap().unwrap();
        assert!(error.contains("'/cart.html'"), "{error}");
    }

    #[tokio::test]
    async fn test_click_on_missing_element_times_out() {
        let page = logged_in().await;
        let err = page.click(sel::FINISH).await.unwrap_err();
        assert!(matches!(err, E2eError::Timeout { ref selector, .. } if selector == sel::FINISH), "{err}");
    }

    #[tokio::test]
    async fn test_add_button_swaps_to_remove() {
        let page = logged_in().await;
        page.click(&sel::add_to_cart(Product::Onesie)).await.unwrap();
        assert_eq!(page.count(&sel::add_to_cart(Product::Onesie)).await.unwrap(), 0);
        assert_eq!(page.count(&sel::remove(Product::Onesie)).await.unwrap(), 1);
        assert_eq!(page.cart(), vec![Product::Onesie]);
    }

    #[tokio::test]
    async fn test_overview_totals() {
        let page = logged_in().await;
        page.click(&sel::add_to_cart(Product::Backpack)).await.unwrap();
        page.click(&sel::add_to_cart(Product::BikeLight)).await.unwrap();
        page.click(sel::CART_LINK).await.unwrap();
        page.click(sel::CHECKOUT).await.unwrap();
        page.fill(sel::FIRST_NAME, "John").await.unwrap();
        page.fill(sel::LAST_NAME, "Doe").await.unwrap();
        page.fill(sel::POSTAL_CODE, "12345").await.unwrap();
        page.click(sel::CONTINUE).await.unwrap();

        assert_eq!(page.text(sel::SUBTOTAL_LABEL).await.unwrap().as_deref(), Some("Item total: $39.98"));
        assert_eq!(page.text(sel::TAX_LABEL).await.unwrap().as_deref(), Some("Tax: $3.20"));
        assert_eq!(page.text(sel::TOTAL_LABEL).await.unwrap().as_deref(), Some("Total: $43.18"));
    }

    #[tokio::test]
    async fn test_closed_page_rejects_calls() {
        let page = logged_in().await;
        page.close().await.unwrap();
        assert!(matches!(page.url().await, Err(E2eError::Driver(_))));
        page.close().await.unwrap();
    }
}

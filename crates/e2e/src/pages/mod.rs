//! Page objects for the Sauce Labs demo storefront
//!
//! One capability object per page. Scenarios talk to these instead of raw
//! selectors so that markup churn stays in [`selectors`].

pub mod cart;
pub mod checkout;
pub mod header;
pub mod inventory;
pub mod login;
pub mod selectors;

pub use cart::CartPage;
pub use checkout::{CheckoutCompletePage, CheckoutInfoPage, CheckoutOverviewPage, ShippingInfo};
pub use header::Header;
pub use inventory::{InventoryPage, SortOrder};
pub use login::LoginPage;

use crate::expect::{expect_with, Expect, ExpectOptions};
use crate::page::Page;

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// Login pair accepted by the storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub const STANDARD_USER: &'static str = "standard_user";
    pub const LOCKED_OUT_USER: &'static str = "locked_out_user";
    pub const PASSWORD: &'static str = "secret_sauce";

    pub fn standard() -> Self {
        Self {
            username: Self::STANDARD_USER.to_string(),
            password: Self::PASSWORD.to_string(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::standard()
    }
}

/// Everything a scenario needs to know about the site besides the page
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Origin of the storefront, without trailing slash
    pub base_url: String,
    pub credentials: Credentials,
    pub expect: ExpectOptions,
}

impl SiteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// The site root as the browser reports it, with trailing slash
    pub fn root_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// Resolve a site-relative path; absolute URLs pass through
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    pub(crate) fn expect<'a>(&self, page: &'a dyn Page, selector: &str) -> Expect<'a> {
        expect_with(page, selector, self.expect)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::standard(),
            expect: ExpectOptions::default(),
        }
    }
}

/// The demo catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    Backpack,
    BikeLight,
    BoltTShirt,
    FleeceJacket,
    Onesie,
    RedTShirt,
}

impl Product {
    pub const ALL: [Product; 6] = [
        Product::Backpack,
        Product::BikeLight,
        Product::BoltTShirt,
        Product::FleeceJacket,
        Product::Onesie,
        Product::RedTShirt,
    ];

    /// Suffix of the `add-to-cart-*` / `remove-*` data-test attributes
    pub fn slug(&self) -> &'static str {
        match self {
            Product::Backpack => "sauce-labs-backpack",
            Product::BikeLight => "sauce-labs-bike-light",
            Product::BoltTShirt => "sauce-labs-bolt-t-shirt",
            Product::FleeceJacket => "sauce-labs-fleece-jacket",
            Product::Onesie => "sauce-labs-onesie",
            Product::RedTShirt => "test.allthethings()-t-shirt-(red)",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Product::Backpack => "Sauce Labs Backpack",
            Product::BikeLight => "Sauce Labs Bike Light",
            Product::BoltTShirt => "Sauce Labs Bolt T-Shirt",
            Product::FleeceJacket => "Sauce Labs Fleece Jacket",
            Product::Onesie => "Sauce Labs Onesie",
            Product::RedTShirt => "Test.allTheThings() T-Shirt (Red)",
        }
    }

    /// List price in cents
    pub fn price_cents(&self) -> u64 {
        match self {
            Product::Backpack => 2999,
            Product::BikeLight => 999,
            Product::BoltTShirt => 1599,
            Product::FleeceJacket => 4999,
            Product::Onesie => 799,
            Product::RedTShirt => 1599,
        }
    }

    pub fn from_slug(slug: &str) -> Option<Product> {
        Product::ALL.into_iter().find(|p| p.slug() == slug)
    }
}

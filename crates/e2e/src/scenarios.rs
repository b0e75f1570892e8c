//! The checkout suite
//!
//! Every scenario logs in on its own page and shares nothing with the
//! others, so they can run in any order or in parallel.

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::E2eResult;
use crate::page::Page;
use crate::pages::{selectors, LoginPage, Product, ShippingInfo, SiteConfig, SortOrder};
use crate::price::{self, Order};
use crate::spec::TestSpec;

pub type ScenarioFuture<'a> = BoxFuture<'a, E2eResult<()>>;
pub type ScenarioFn = for<'a> fn(&'a dyn Page, &'a SiteConfig) -> ScenarioFuture<'a>;

/// A runnable scenario: either compiled in or loaded from YAML
#[derive(Clone)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub body: ScenarioBody,
}

#[derive(Clone)]
pub enum ScenarioBody {
    Builtin(ScenarioFn),
    Spec(TestSpec),
}

impl Scenario {
    pub fn builtin(id: &str, name: &str, tags: &[&str], body: ScenarioFn) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            body: ScenarioBody::Builtin(body),
        }
    }

    pub fn from_spec(spec: TestSpec) -> Self {
        Self {
            id: spec.name.clone(),
            name: if spec.description.is_empty() {
                spec.name.clone()
            } else {
                spec.description.clone()
            },
            tags: spec.tags.clone(),
            body: ScenarioBody::Spec(spec),
        }
    }

    pub async fn run(&self, page: &dyn Page, site: &SiteConfig) -> E2eResult<()> {
        match &self.body {
            ScenarioBody::Builtin(body) => body(page, site).await,
            ScenarioBody::Spec(spec) => spec.execute(page, site).await,
        }
    }

    /// Match by id (case-insensitive) or exact name
    pub fn matches(&self, key: &str) -> bool {
        self.id.eq_ignore_ascii_case(key) || self.name == key
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// TC001 to TC006, in suite order
pub fn builtin() -> Vec<Scenario> {
    vec![
        Scenario::builtin(
            "TC001",
            "Complete checkout process with valid credentials",
            &["smoke", "checkout"],
            complete_checkout,
        ),
        Scenario::builtin(
            "TC002",
            "Validation: Empty checkout information",
            &["checkout", "validation"],
            empty_checkout_information,
        ),
        Scenario::builtin(
            "TC003",
            "Remove item from cart",
            &["cart"],
            remove_item_from_cart,
        ),
        Scenario::builtin(
            "TC004",
            "Product sorting functionality",
            &["inventory"],
            sort_by_price,
        ),
        Scenario::builtin(
            "TC005",
            "Navigation: Continue shopping from cart",
            &["cart", "navigation"],
            continue_shopping,
        ),
        Scenario::builtin(
            "TC006",
            "Logout functionality",
            &["smoke", "auth"],
            logout,
        ),
    ]
}

pub fn complete_checkout<'a>(page: &'a dyn Page, site: &'a SiteConfig) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let inventory = LoginPage::new(page, site).open_and_login().await?;

        inventory.add_all(&[Product::Backpack, Product::BikeLight]).await?;
        inventory.header().expect_cart_count(2).await?;

        let cart = inventory.header().open_cart().await?;
        cart.expect_item_count(2).await?;
        cart.expect_first_item(Product::Backpack.name()).await?;

        let info = cart.checkout().await?;
        let overview = info
            .continue_with(&ShippingInfo::new("John", "Doe", "12345"))
            .await?;
        let subtotal = overview.subtotal().await?;
        debug!(subtotal, "order overview");

        overview.finish().await?.expect_order_confirmed().await
    })
}

pub fn empty_checkout_information<'a>(
    page: &'a dyn Page,
    site: &'a SiteConfig,
) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let inventory = LoginPage::new(page, site).open_and_login().await?;
        inventory.add_to_cart(Product::Backpack).await?;

        let info = inventory.header().open_cart().await?.checkout().await?;
        info.submit().await?;
        info.expect_error("First Name is required").await
    })
}

pub fn remove_item_from_cart<'a>(page: &'a dyn Page, site: &'a SiteConfig) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let inventory = LoginPage::new(page, site).open_and_login().await?;
        inventory
            .add_all(&[Product::Backpack, Product::BikeLight, Product::BoltTShirt])
            .await?;
        inventory.header().expect_cart_count(3).await?;

        let cart = inventory.header().open_cart().await?;
        cart.expect_item_count(3).await?;

        cart.remove(Product::BikeLight).await?;
        cart.expect_item_count(2).await?;
        cart.header().expect_cart_count(2).await
    })
}

pub fn sort_by_price<'a>(page: &'a dyn Page, site: &'a SiteConfig) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let inventory = LoginPage::new(page, site).open_and_login().await?;
        inventory.sort_by(SortOrder::PriceLowHigh).await?;

        site.expect(page, selectors::ITEM_PRICE).to_be_visible().await?;
        let prices = inventory.prices().await?;
        debug!(?prices, "sorted low to high");

        price::check_sorted(selectors::ITEM_PRICE, &prices, Order::Ascending)
    })
}

pub fn continue_shopping<'a>(page: &'a dyn Page, site: &'a SiteConfig) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let inventory = LoginPage::new(page, site).open_and_login().await?;
        inventory.add_to_cart(Product::Backpack).await?;

        let inventory = inventory.header().open_cart().await?.continue_shopping().await?;
        inventory.header().expect_cart_count(1).await
    })
}

pub fn logout<'a>(page: &'a dyn Page, site: &'a SiteConfig) -> ScenarioFuture<'a> {
    Box::pin(async move {
        let inventory = LoginPage::new(page, site).open_and_login().await?;

        let login = inventory.header().logout().await?;
        login.expect_shown().await?;
        login.expect_at_site_root().await
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique() {
        let scenarios = builtin();
        let ids: Vec<_> = scenarios.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["TC001", "TC002", "TC003", "TC004", "TC005", "TC006"]);

        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_matches_by_id_or_name() {
        let scenarios = builtin();
        assert!(scenarios[2].matches("tc003"));
        assert!(scenarios[2].matches("Remove item from cart"));
        assert!(!scenarios[2].matches("remove item from cart"));
        assert!(scenarios[5].has_tag("auth"));
    }
}

//! The three checkout steps: information, overview, complete

use super::{selectors, InventoryPage, SiteConfig};
use crate::error::{E2eError, E2eResult};
use crate::page::Page;
use crate::price;

pub const INFO_TITLE: &str = "Checkout: Your Information";
pub const OVERVIEW_TITLE: &str = "Checkout: Overview";
pub const COMPLETE_TITLE: &str = "Checkout: Complete!";
pub const ORDER_CONFIRMATION: &str = "Thank you for your order!";

/// Shipping form input. Validation belongs to the storefront.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

impl ShippingInfo {
    pub fn new(first_name: &str, last_name: &str, postal_code: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            postal_code: postal_code.to_string(),
        }
    }
}

pub struct CheckoutInfoPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteConfig,
}

impl<'a> CheckoutInfoPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteConfig) -> Self {
        Self { page, site }
    }

    pub async fn expect_loaded(&self) -> E2eResult<()> {
        self.site
            .expect(self.page, selectors::TITLE)
            .to_have_text(INFO_TITLE)
            .await
    }

    pub async fn fill(&self, info: &ShippingInfo) -> E2eResult<()> {
        self.page.fill(selectors::FIRST_NAME, &info.first_name).await?;
        self.page.fill(selectors::LAST_NAME, &info.last_name).await?;
        self.page.fill(selectors::POSTAL_CODE, &info.postal_code).await
    }

    /// Press continue whatever the form holds
    pub async fn submit(&self) -> E2eResult<()> {
        self.page.click(selectors::CONTINUE).await
    }

    pub async fn continue_with(&self, info: &ShippingInfo) -> E2eResult<CheckoutOverviewPage<'a>> {
        self.fill(info).await?;
        self.submit().await?;
        let overview = CheckoutOverviewPage::new(self.page, self.site);
        overview.expect_loaded().await?;
        Ok(overview)
    }

    pub async fn expect_error(&self, message: &str) -> E2eResult<()> {
        let error = self.site.expect(self.page, selectors::ERROR);
        error.to_be_visible().await?;
        error.to_contain_text(message).await
    }
}

pub struct CheckoutOverviewPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteConfig,
}

impl<'a> CheckoutOverviewPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteConfig) -> Self {
        Self { page, site }
    }

    pub async fn expect_loaded(&self) -> E2eResult<()> {
        self.site
            .expect(self.page, selectors::TITLE)
            .to_have_text(OVERVIEW_TITLE)
            .await
    }

    /// Amount shown on the item total line; fails unless it carries a `$` price
    pub async fn subtotal(&self) -> E2eResult<f64> {
        self.site
            .expect(self.page, selectors::SUBTOTAL_LABEL)
            .to_contain_text("$")
            .await?;

        let label = self
            .page
            .text(selectors::SUBTOTAL_LABEL)
            .await?
            .unwrap_or_default();
        price::parse_price(&label)
            .ok_or_else(|| E2eError::mismatch(selectors::SUBTOTAL_LABEL, "a $-formatted total", label))
    }

    pub async fn finish(&self) -> E2eResult<CheckoutCompletePage<'a>> {
        self.page.click(selectors::FINISH).await?;
        Ok(CheckoutCompletePage::new(self.page, self.site))
    }
}

pub struct CheckoutCompletePage<'a> {
    page: &'a dyn Page,
    site: &'a SiteConfig,
}

impl<'a> CheckoutCompletePage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteConfig) -> Self {
        Self { page, site }
    }

    pub async fn expect_order_confirmed(&self) -> E2eResult<()> {
        self.site
            .expect(self.page, selectors::COMPLETE_HEADER)
            .to_have_text(ORDER_CONFIRMATION)
            .await?;
        self.site
            .expect(self.page, selectors::COMPLETE_TEXT)
            .to_be_visible()
            .await
    }

    pub async fn back_to_products(&self) -> E2eResult<InventoryPage<'a>> {
        self.page.click(selectors::BACK_TO_PRODUCTS).await?;
        let inventory = InventoryPage::new(self.page, self.site);
        inventory.expect_loaded().await?;
        Ok(inventory)
    }
}

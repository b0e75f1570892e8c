//! Cart page

use super::{selectors, CheckoutInfoPage, Header, InventoryPage, Product, SiteConfig};
use crate::error::E2eResult;
use crate::page::Page;

pub const TITLE: &str = "Your Cart";

pub struct CartPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteConfig,
}

impl<'a> CartPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteConfig) -> Self {
        Self { page, site }
    }

    pub fn header(&self) -> Header<'a> {
        Header::new(self.page, self.site)
    }

    pub async fn expect_loaded(&self) -> E2eResult<()> {
        self.site
            .expect(self.page, selectors::TITLE)
            .to_have_text(TITLE)
            .await
    }

    pub async fn expect_item_count(&self, count: usize) -> E2eResult<()> {
        self.site
            .expect(self.page, selectors::CART_ITEM)
            .to_have_count(count)
            .await
    }

    /// Name of the first row contains `name`
    pub async fn expect_first_item(&self, name: &str) -> E2eResult<()> {
        self.site
            .expect(self.page, selectors::ITEM_NAME)
            .to_contain_text(name)
            .await
    }

    pub async fn remove(&self, product: Product) -> E2eResult<()> {
        self.page.click(&selectors::remove(product)).await
    }

    pub async fn checkout(&self) -> E2eResult<CheckoutInfoPage<'a>> {
        self.page.click(selectors::CHECKOUT).await?;
        let info = CheckoutInfoPage::new(self.page, self.site);
        info.expect_loaded().await?;
        Ok(info)
    }

    pub async fn continue_shopping(&self) -> E2eResult<InventoryPage<'a>> {
        self.page.click(selectors::CONTINUE_SHOPPING).await?;
        let inventory = InventoryPage::new(self.page, self.site);
        inventory.expect_loaded().await?;
        Ok(inventory)
    }
}

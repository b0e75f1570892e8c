//! Primary header shared by every logged-in page

use super::{selectors, CartPage, LoginPage, SiteConfig};
use crate::error::E2eResult;
use crate::page::Page;

pub struct Header<'a> {
    page: &'a dyn Page,
    site: &'a SiteConfig,
}

impl<'a> Header<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteConfig) -> Self {
        Self { page, site }
    }

    /// The badge is removed from the DOM when the cart is empty
    pub async fn expect_cart_count(&self, count: usize) -> E2eResult<()> {
        let badge = self.site.expect(self.page, selectors::CART_BADGE);
        if count == 0 {
            badge.to_have_count(0).await
        } else {
            badge.to_have_text(&count.to_string()).await
        }
    }

    pub async fn open_cart(&self) -> E2eResult<CartPage<'a>> {
        self.page.click(selectors::CART_LINK).await?;
        let cart = CartPage::new(self.page, self.site);
        cart.expect_loaded().await?;
        Ok(cart)
    }

    pub async fn logout(&self) -> E2eResult<LoginPage<'a>> {
        self.page.click(selectors::BURGER_MENU).await?;
        self.page.click(selectors::LOGOUT_LINK).await?;
        Ok(LoginPage::new(self.page, self.site))
    }
}

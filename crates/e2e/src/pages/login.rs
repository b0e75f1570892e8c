//! Login page at the site root

use tracing::debug;

use super::{selectors, Credentials, InventoryPage, SiteConfig};
use crate::error::E2eResult;
use crate::page::Page;

pub struct LoginPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteConfig,
}

impl<'a> LoginPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteConfig) -> Self {
        Self { page, site }
    }

    pub async fn open(&self) -> E2eResult<()> {
        self.page.goto(&self.site.root_url()).await
    }

    /// Fill both fields and press the login button without checking the outcome
    pub async fn submit(&self, credentials: &Credentials) -> E2eResult<()> {
        debug!(username = %credentials.username, "logging in");
        self.page.fill(selectors::USERNAME, &credentials.username).await?;
        self.page.fill(selectors::PASSWORD, &credentials.password).await?;
        self.page.click(selectors::LOGIN_BUTTON).await
    }

    /// Log in and wait for the product listing
    pub async fn login(&self, credentials: &Credentials) -> E2eResult<InventoryPage<'a>> {
        self.submit(credentials).await?;
        let inventory = InventoryPage::new(self.page, self.site);
        inventory.expect_loaded().await?;
        Ok(inventory)
    }

    /// Open the site and log in with the configured credentials
    pub async fn open_and_login(&self) -> E2eResult<InventoryPage<'a>> {
        self.open().await?;
        self.login(&self.site.credentials).await
    }

    pub async fn expect_shown(&self) -> E2eResult<()> {
        self.site
            .expect(self.page, selectors::LOGIN_BUTTON)
            .to_be_visible()
            .await
    }

    pub async fn expect_at_site_root(&self) -> E2eResult<()> {
        crate::expect::expect_page(self.page, self.site.expect)
            .to_have_url(&self.site.root_url())
            .await
    }

    pub async fn expect_error(&self, message: &str) -> E2eResult<()> {
        let error = self.site.expect(self.page, selectors::ERROR);
        error.to_be_visible().await?;
        error.to_contain_text(message).await
    }
}

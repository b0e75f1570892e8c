//! Product listing shown after login

use super::{selectors, Header, Product, SiteConfig};
use crate::error::E2eResult;
use crate::page::Page;
use crate::price;

pub const TITLE: &str = "Products";

/// Values of the sort `<select>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    PriceLowHigh,
    PriceHighLow,
}

impl SortOrder {
    pub fn value(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "az",
            SortOrder::NameDesc => "za",
            SortOrder::PriceLowHigh => "lohi",
            SortOrder::PriceHighLow => "hilo",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "az" => Some(SortOrder::NameAsc),
            "za" => Some(SortOrder::NameDesc),
            "lohi" => Some(SortOrder::PriceLowHigh),
            "hilo" => Some(SortOrder::PriceHighLow),
            _ => None,
        }
    }
}

pub struct InventoryPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteConfig,
}

impl<'a> InventoryPage<'a> {
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

    pub async fn add_to_cart(&self, product: Product) -> E2eResult<()> {
        self.page.click(&selectors::add_to_cart(product)).await
    }

    pub async fn add_all(&self, products: &[Product]) -> E2eResult<()> {
        for product in products {
            self.add_to_cart(*product).await?;
        }
        Ok(())
    }

    pub async fn remove(&self, product: Product) -> E2eResult<()> {
        self.page.click(&selectors::remove(product)).await
    }

    pub async fn sort_by(&self, order: SortOrder) -> E2eResult<()> {
        self.page
            .select_option(selectors::SORT_CONTAINER, order.value())
            .await
    }

    pub async fn item_names(&self) -> E2eResult<Vec<String>> {
        self.page.all_texts(selectors::ITEM_NAME).await
    }

    /// Displayed prices, in display order
    pub async fn prices(&self) -> E2eResult<Vec<f64>> {
        let texts = self.page.all_texts(selectors::ITEM_PRICE).await?;
        price::parse_prices(selectors::ITEM_PRICE, &texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_values_round_trip() {
        for order in [
            SortOrder::NameAsc,
            SortOrder::NameDesc,
            SortOrder::PriceLowHigh,
            SortOrder::PriceHighLow,
        ] {
            assert_eq!(SortOrder::from_value(order.value()), Some(order));
        }
        assert_eq!(SortOrder::from_value("price"), None);
    }
}

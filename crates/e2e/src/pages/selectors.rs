//! Every selector the suite relies on. If the storefront markup changes,
//! this is the only file that should need to follow.

use super::Product;

// Login
pub const USERNAME: &str = "#user-name";
pub const PASSWORD: &str = "#password";
pub const LOGIN_BUTTON: &str = "#login-button";

// Shared chrome
pub const TITLE: &str = ".title";
pub const CART_BADGE: &str = ".shopping_cart_badge";
pub const CART_LINK: &str = ".shopping_cart_link";
pub const BURGER_MENU: &str = "#react-burger-menu-btn";
pub const LOGOUT_LINK: &str = "#logout_sidebar_link";
pub const ERROR: &str = "[data-test=\"error\"]";

// Inventory
pub const ITEM_NAME: &str = ".inventory_item_name";
pub const ITEM_PRICE: &str = ".inventory_item_price";
pub const SORT_CONTAINER: &str = ".product_sort_container";

// Cart
pub const CART_ITEM: &str = ".cart_item";
pub const CHECKOUT: &str = "#checkout";
pub const CONTINUE_SHOPPING: &str = "#continue-shopping";

// Checkout
pub const FIRST_NAME: &str = "#first-name";
pub const LAST_NAME: &str = "#last-name";
pub const POSTAL_CODE: &str = "#postal-code";
pub const CONTINUE: &str = "#continue";
pub const SUBTOTAL_LABEL: &str = ".summary_subtotal_label";
pub const TAX_LABEL: &str = ".summary_tax_label";
pub const TOTAL_LABEL: &str = ".summary_total_label";
pub const FINISH: &str = "#finish";
pub const COMPLETE_HEADER: &str = ".complete-header";
pub const COMPLETE_TEXT: &str = ".complete-text";
pub const BACK_TO_PRODUCTS: &str = "#back-to-products";

pub fn add_to_cart(product: Product) -> String {
    format!("[data-test=\"add-to-cart-{}\"]", product.slug())
}

pub fn remove(product: Product) -> String {
    format!("[data-test=\"remove-{}\"]", product.slug())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_selectors() {
        assert_eq!(
            add_to_cart(Product::Backpack),
            r#"[data-test="add-to-cart-sauce-labs-backpack"]"#
        );
        assert_eq!(
            remove(Product::BikeLight),
            r#"[data-test="remove-sauce-labs-bike-light"]"#
        );
    }
}

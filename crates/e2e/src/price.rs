//! Reading prices off the page

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

static PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?").expect("price regex"));

/// First `$amount` in `text`, e.g. `"Item total: $39.98"` -> `39.98`
pub fn parse_price(text: &str) -> Option<f64> {
    let caps = PRICE.captures(text)?;
    let whole = caps.get(1)?.as_str().replace(',', "");
    let fraction = caps.get(2).map_or("", |m| m.as_str());
    format!("{whole}{fraction}").parse().ok()
}

/// Parse every text or fail on the first one that is not a price
pub fn parse_prices(selector: &str, texts: &[String]) -> E2eResult<Vec<f64>> {
    texts
        .iter()
        .map(|text| {
            parse_price(text).ok_or_else(|| E2eError::mismatch(selector, "a $-formatted price", text))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

impl Order {
    fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            Order::Ascending => left <= right,
            Order::Descending => left >= right,
        }
    }
}

/// Index `i` of the first adjacent pair `(values[i], values[i + 1])` that breaks `order`
pub fn first_out_of_order(values: &[f64], order: Order) -> Option<usize> {
    values
        .windows(2)
        .position(|pair| !order.holds(pair[0], pair[1]))
}

pub fn check_sorted(selector: &str, values: &[f64], order: Order) -> E2eResult<()> {
    match first_out_of_order(values, order) {
        None => Ok(()),
        Some(i) => Err(E2eError::mismatch(
            format!("{selector} (items {} and {})", i + 1, i + 2),
            format!("{order:?} order"),
            format!("{} then {}", values[i], values[i + 1]),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("$29.99", Some(29.99) ; "plain")]
    #[test_case("Item total: $39.98", Some(39.98) ; "labelled")]
    #[test_case("$ 7.99", Some(7.99) ; "spaced")]
    #[test_case("$1,249.00", Some(1249.0) ; "thousands")]
    #[test_case("$15", Some(15.0) ; "whole dollars")]
    #[test_case("29.99", None ; "missing currency")]
    #[test_case("Free", None ; "not a price")]
    fn test_parse_price(text: &str, expected: Option<f64>) {
        assert_eq!(parse_price(text), expected);
    }

    #[test]
    fn test_parse_prices_reports_offender() {
        let texts = vec!["$9.99".to_string(), "N/A".to_string()];
        let err = parse_prices(".inventory_item_price", &texts).unwrap_err();
        match err {
            E2eError::AssertionFailed { actual, .. } => assert_eq!(actual, "N/A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ties_are_sorted() {
        let prices = [7.99, 9.99, 15.99, 15.99, 29.99, 49.99];
        assert_eq!(first_out_of_order(&prices, Order::Ascending), None);
        assert_eq!(first_out_of_order(&prices, Order::Descending), Some(0));
    }

    #[test]
    fn test_check_sorted_names_pair() {
        let err = check_sorted(".inventory_item_price", &[7.99, 29.99, 9.99], Order::Ascending)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("items 2 and 3"), "{message}");
        assert!(message.contains("29.99 then 9.99"), "{message}");
    }

    #[test]
    fn test_short_lists_are_sorted() {
        assert!(check_sorted("x", &[], Order::Ascending).is_ok());
        assert!(check_sorted("x", &[1.0], Order::Descending).is_ok());
    }
}

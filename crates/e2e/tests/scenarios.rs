//! Checkout suite against the in-memory storefront
//!
//! Runs every built-in scenario and the bundled YAML specs without a
//! browser, then switches on storefront bugs one at a time to check that
//! the matching scenario fails with the right kind of failure.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use checkout_e2e::expect::ExpectOptions;
use checkout_e2e::fake::{FakeLauncher, FakeStorefront, Quirk};
use checkout_e2e::pages::{selectors, LoginPage, Product, ShippingInfo, SiteConfig, SortOrder};
use checkout_e2e::runner::{self, FailureKind, TestSuiteResult};
use checkout_e2e::{scenarios, E2eError, Page, RunnerConfig, Selection, TestRunner, TestSpec};

const BASE: &str = "https://shop.test";

fn site() -> SiteConfig {
    let mut site = SiteConfig::new(BASE);
    site.expect = ExpectOptions {
        timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
    };
    site
}

fn specs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("specs")
}

fn runner_config(output_dir: PathBuf) -> RunnerConfig {
    RunnerConfig {
        site: site(),
        workers: 3,
        scenario_timeout: Duration::from_secs(10),
        specs_dir: None,
        output_dir,
        capture_screenshots: true,
        preflight: None,
    }
}

async fn run_builtin(id: &str, quirk: Option<Quirk>) -> Result<(), E2eError> {
    let scenario = scenarios::builtin()
        .into_iter()
        .find(|s| s.id == id)
        .expect("builtin scenario");

    let mut page = FakeStorefront::new(BASE);
    if let Some(quirk) = quirk {
        page = page.with_quirk(quirk);
    }
    let result = scenario.run(&page, &site()).await;
    page.close().await.unwrap();
    result
}

#[tokio::test]
async fn builtin_suite_passes_on_healthy_storefront() {
    for scenario in scenarios::builtin() {
        let page = FakeStorefront::new(BASE);
        if let Err(e) = scenario.run(&page, &site()).await {
            panic!("{} failed: {}", scenario.id, e);
        }
    }
}

#[tokio::test]
async fn checkout_empties_the_cart() {
    let scenario = scenarios::builtin().remove(0);
    let page = FakeStorefront::new(BASE);
    scenario.run(&page, &site()).await.unwrap();

    assert!(page.cart().is_empty());
    assert_eq!(page.url().await.unwrap(), format!("{BASE}/checkout-complete.html"));
}

#[tokio::test]
async fn back_home_after_order_shows_empty_cart() {
    let site = site();
    let page = FakeStorefront::new(BASE);

    let inventory = LoginPage::new(&page, &site).open_and_login().await.unwrap();
    inventory.add_to_cart(Product::Onesie).await.unwrap();
    let overview = inventory
        .header()
        .open_cart()
        .await
        .unwrap()
        .checkout()
        .await
        .unwrap()
        .continue_with(&ShippingInfo::new("Ada", "Lovelace", "10115"))
        .await
        .unwrap();
    assert_eq!(overview.subtotal().await.unwrap(), 7.99);

    let inventory = overview.finish().await.unwrap().back_to_products().await.unwrap();
    inventory.header().expect_cart_count(0).await.unwrap();

    inventory.sort_by(SortOrder::NameDesc).await.unwrap();
    let names = inventory.item_names().await.unwrap();
    assert_eq!(names.len(), 6);
    assert_eq!(names[0], "Test.allTheThings() T-Shirt (Red)");
}

#[tokio::test]
async fn ignored_sort_is_a_mismatch() {
    match run_builtin("TC004", Some(Quirk::SortIgnored)).await {
        Err(E2eError::AssertionFailed { selector, actual, .. }) => {
            assert_eq!(selector, format!("{} (items 1 and 2)", selectors::ITEM_PRICE));
            assert_eq!(actual, "29.99 then 9.99");
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_badge_is_a_timeout() {
    match run_builtin("TC003", Some(Quirk::CartBadgeMissing)).await {
        Err(E2eError::Timeout { selector, timeout_ms, .. }) => {
            assert_eq!(selector, selectors::CART_BADGE);
            assert_eq!(timeout_ms, 200);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn ignored_remove_reports_item_count() {
    match run_builtin("TC003", Some(Quirk::RemoveIgnored)).await {
        Err(E2eError::AssertionFailed { selector, actual, .. }) => {
            assert_eq!(selector, selectors::CART_ITEM);
            assert_eq!(actual, "3");
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_validation_message_is_a_mismatch() {
    match run_builtin("TC002", Some(Quirk::FirstNameNotValidated)).await {
        Err(E2eError::AssertionFailed { selector, actual, .. }) => {
            assert_eq!(selector, selectors::ERROR);
            assert!(actual.contains("Last Name is required"), "{actual}");
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn ignored_logout_never_shows_login() {
    match run_builtin("TC006", Some(Quirk::LogoutIgnored)).await {
        Err(E2eError::Timeout { selector, .. }) => {
            assert_eq!(selector, selectors::LOGIN_BUTTON);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn subtotal_without_currency_is_a_mismatch() {
    match run_builtin("TC001", Some(Quirk::SubtotalUnformatted)).await {
        Err(E2eError::AssertionFailed { selector, actual, .. }) => {
            assert_eq!(selector, selectors::SUBTOTAL_LABEL);
            assert_eq!(actual, "Item total: 39.98");
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_confirmation_banner_is_a_mismatch() {
    match run_builtin("TC001", Some(Quirk::WrongConfirmation)).await {
        Err(E2eError::AssertionFailed { selector, expected, actual }) => {
            assert_eq!(selector, selectors::COMPLETE_HEADER);
            assert_eq!(expected, "\"Thank you for your order!\"");
            assert_eq!(actual, "Thanks for your order");
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn cart_lost_on_continue_shopping_is_a_timeout() {
    match run_builtin("TC005", Some(Quirk::CartClearedOnContinue)).await {
        Err(E2eError::Timeout { selector, .. }) => {
            assert_eq!(selector, selectors::CART_BADGE);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn remove_from_listing_hides_badge() {
    let site = site();
    let page = FakeStorefront::new(BASE);

    let inventory = LoginPage::new(&page, &site).open_and_login().await.unwrap();
    inventory.add_all(&[Product::Backpack, Product::FleeceJacket]).await.unwrap();
    inventory.header().expect_cart_count(2).await.unwrap();

    inventory.remove(Product::Backpack).await.unwrap();
    inventory.header().expect_cart_count(1).await.unwrap();
    inventory.remove(Product::FleeceJacket).await.unwrap();
    inventory.header().expect_cart_count(0).await.unwrap();
    assert!(page.cart().is_empty());
}

#[tokio::test]
async fn bundled_specs_pass() {
    let specs = TestSpec::load_all(&specs_dir()).unwrap();
    assert!(!specs.is_empty());

    for spec in specs {
        let page = FakeStorefront::new(BASE);
        if let Err(e) = spec.execute(&page, &site()).await {
            panic!("{} failed: {}", spec.name, e);
        }
    }
}

#[tokio::test]
async fn runner_keeps_order_and_isolates_failures() {
    let output = tempfile::tempdir().unwrap();
    let launcher = Arc::new(FakeLauncher::new(BASE).with_quirk(Quirk::SortIgnored));
    let runner = TestRunner::new(runner_config(output.path().to_path_buf()), Arc::clone(&launcher));

    let suite = runner.run_selection(&Selection::All).await.unwrap();

    let ids: Vec<_> = suite.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["TC001", "TC002", "TC003", "TC004", "TC005", "TC006"]);
    assert_eq!((suite.passed, suite.failed), (5, 1));
    assert!(!suite.success());

    // Every scenario got its own page and every page was closed
    assert_eq!(launcher.launched(), 6);
    assert_eq!(launcher.closed(), 6);

    let failed = &suite.results[3];
    let failure = failed.failure.as_ref().unwrap();
    assert_eq!(failure.kind, FailureKind::Mismatch);
    assert!(failure.selector.as_deref().unwrap().starts_with(selectors::ITEM_PRICE));

    let shot = failed.screenshot.as_ref().unwrap();
    assert_eq!(shot.path, output.path().join("screenshots").join("TC004.png"));
    assert!(shot.path.exists());
    assert_eq!(shot.sha256.len(), 64);
    assert!(suite.results.iter().filter(|r| r.success).all(|r| r.screenshot.is_none()));
}

#[tokio::test]
async fn runner_writes_json_report() {
    let output = tempfile::tempdir().unwrap();
    let runner = TestRunner::new(runner_config(output.path().to_path_buf()), FakeLauncher::new(BASE));

    let suite = runner.run_selection(&Selection::Tag("smoke".to_string())).await.unwrap();
    assert_eq!(suite.total, 2);
    assert!(suite.success());

    let path = runner.write_results(&suite).unwrap();
    assert_eq!(path, output.path().join("test-results.json"));

    let parsed: TestSuiteResult =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.base_url, BASE);
    assert_eq!(parsed.results[0].id, "TC001");
    assert_eq!(parsed.results[1].id, "TC006");
}

#[tokio::test]
async fn scenario_timeout_bounds_a_slow_scenario() {
    let output = tempfile::tempdir().unwrap();
    let mut config = runner_config(output.path().to_path_buf());
    config.scenario_timeout = Duration::from_millis(50);
    config.site.expect.timeout = Duration::from_secs(5);
    config.capture_screenshots = false;

    // The badge never appears, so TC003 waits out the assertion timeout
    let launcher = FakeLauncher::new(BASE).with_quirk(Quirk::CartBadgeMissing);
    let runner = TestRunner::new(config, launcher);

    let suite = runner.run_selection(&Selection::Name("TC003".to_string())).await.unwrap();
    let failure = suite.results[0].failure.as_ref().unwrap();
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(failure.selector.as_deref(), Some("TC003"));
    assert!(suite.results[0].screenshot.is_none());
}

#[test]
fn selection_by_name_and_unknown_name() {
    let all = runner::load_scenarios(Some(&specs_dir())).unwrap();
    assert!(all.iter().any(|s| s.id == "locked_out_user"));

    let picked = runner::select(all.clone(), &Selection::Name("tc005".to_string())).unwrap();
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].id, "TC005");

    let inventory = runner::select(all.clone(), &Selection::Tag("inventory".to_string())).unwrap();
    let ids: Vec<_> = inventory.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["TC004", "sort_price_high_low"]);

    match runner::select(all, &Selection::Name("TC999".to_string())) {
        Err(E2eError::ScenarioNotFound(name)) => assert_eq!(name, "TC999"),
        other => panic!("expected not found, got {other:?}"),
    }
}

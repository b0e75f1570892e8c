//! Checkout E2E Test Framework
//!
//! Browser tests for the checkout flow of the Sauce Labs demo storefront.
//! This crate:
//! - Drives a real browser through a Playwright bridge (node + JSON lines)
//! - Wraps the storefront in page objects with auto-waiting assertions
//! - Ships the TC001-TC006 checkout suite and accepts extra YAML scenarios
//! - Runs scenarios in isolated browsers, optionally in parallel, and writes
//!   a JSON report with failure screenshots
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── preflight() -> target reachable?                     │
//! │    ├── select(Selection) -> [Scenario]                      │
//! │    └── run([Scenario]) -> TestSuiteResult                   │
//! │          └── per scenario: Launcher::launch() -> Page       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario                                                   │
//! │    ├── Builtin: page objects (Login, Inventory, Cart, ...)  │
//! │    └── Spec: YAML steps                                     │
//! │          both assert through site.expect(page, sel)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page                                                       │
//! │    ├── PlaywrightSession (node driver.js, one browser)      │
//! │    └── FakeStorefront (in-memory, for offline tests)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod error;
pub mod expect;
pub mod fake;
pub mod page;
pub mod pages;
pub mod playwright;
pub mod price;
pub mod runner;
pub mod scenarios;
pub mod spec;
pub mod target;

pub use error::{E2eError, E2eResult};
pub use page::{Launcher, Page};
pub use runner::{RunnerConfig, Selection, TestRunner};
pub use scenarios::Scenario;
pub use spec::{TestSpec, TestStep};

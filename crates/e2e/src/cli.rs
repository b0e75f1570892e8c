//! Command line of the live suite binary
//!
//! The binary is a `harness = false` test target, so `cargo test` forwards
//! its own libtest arguments (name filters, `--nocapture`, ...) to it as
//! well. Those are accepted and ignored.

use std::path::PathBuf;

use clap::Parser;

use crate::pages::DEFAULT_BASE_URL;
use crate::playwright::Browser;
use crate::runner::Selection;

#[derive(Parser, Debug)]
#[command(name = "checkout-e2e")]
#[command(about = "Checkout E2E suite for the Sauce Labs demo storefront")]
pub struct Args {
    /// Storefront origin
    #[arg(long, env = "CHECKOUT_E2E_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    pub browser: Browser,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Scenarios to run in parallel, one browser each
    #[arg(short, long, default_value = "1")]
    pub workers: usize,

    /// Assertion timeout in milliseconds
    #[arg(long, default_value = "5000")]
    pub timeout_ms: u64,

    /// Run only the scenario with this id or name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Run only scenarios with this tag
    #[arg(short, long, conflicts_with = "name")]
    pub tag: Option<String>,

    /// Directory of extra YAML scenarios
    #[arg(long)]
    pub specs: Option<PathBuf>,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    pub output: PathBuf,

    /// node_modules directory containing playwright
    #[arg(long, env = "CHECKOUT_E2E_NODE_PATH")]
    pub node_path: Option<PathBuf>,

    /// List the selected scenarios and exit
    #[arg(long)]
    pub list: bool,

    /// Fail instead of skipping when Playwright or the target is unavailable
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    libtest: LibtestArgs,
}

/// libtest arguments cargo forwards to every test binary
#[derive(clap::Args, Debug, Default)]
#[allow(dead_code)]
struct LibtestArgs {
    #[arg(hide = true)]
    filters: Vec<String>,
    #[arg(long, hide = true)]
    nocapture: bool,
    #[arg(long, hide = true)]
    show_output: bool,
    #[arg(long, hide = true)]
    test_threads: Option<usize>,
    #[arg(short, long, hide = true)]
    quiet: bool,
    #[arg(long, hide = true)]
    exact: bool,
    #[arg(long, hide = true)]
    ignored: bool,
    #[arg(long, hide = true)]
    include_ignored: bool,
    #[arg(long, hide = true)]
    format: Option<String>,
    #[arg(long, hide = true)]
    color: Option<String>,
    #[arg(long, hide = true)]
    skip: Vec<String>,
}

impl Args {
    pub fn selection(&self) -> Selection {
        match (&self.name, &self.tag) {
            (Some(name), _) => Selection::Name(name.clone()),
            (None, Some(tag)) => Selection::Tag(tag.clone()),
            (None, None) => Selection::All,
        }
    }

    /// libtest name filters cargo passed through, ignored by the suite
    pub fn forwarded_filters(&self) -> &[String] {
        &self.libtest.filters
    }
}

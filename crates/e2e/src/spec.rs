//! Declarative YAML scenarios
//!
//! Extra scenarios can be dropped into a specs directory without touching
//! Rust code. They run through the same page handle and the same
//! auto-waiting assertions as the built-in suite.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::expect::expect_page;
use crate::page::Page;
use crate::pages::{Credentials, LoginPage, SiteConfig};
use crate::price::{self, Order};

/// A complete test specification parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Unique name for this test
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering tests
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,
}

/// A single step in a test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a URL (relative to base)
    Navigate {
        url: String,
    },

    /// Open the site root and submit the login form. Falls back to the
    /// configured credentials for any field left out.
    Login {
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },

    /// Fill an input field
    Fill {
        selector: String,
        value: String,
    },

    /// Click an element
    Click {
        selector: String,
    },

    /// Select an option from a dropdown
    Select {
        selector: String,
        value: String,
    },

    /// Assert something about an element. `visible: false` means absent.
    Assert {
        selector: String,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        text_contains: Option<String>,
        #[serde(default)]
        count: Option<usize>,
    },

    /// Assert the current URL (relative to base)
    AssertUrl {
        url: String,
    },

    /// Assert that the prices under `selector` are ordered
    AssertSorted {
        selector: String,
        #[serde(default)]
        order: Order,
    },

    /// Log a message (for debugging)
    Log {
        message: String,
    },
}

impl TestStep {
    pub fn name(&self) -> String {
        match self {
            TestStep::Navigate { url } => format!("navigate:{}", url),
            TestStep::Login { .. } => "login".to_string(),
            TestStep::Fill { selector, .. } => format!("fill:{}", selector),
            TestStep::Click { selector } => format!("click:{}", selector),
            TestStep::Select { selector, .. } => format!("select:{}", selector),
            TestStep::Assert { selector, .. } => format!("assert:{}", selector),
            TestStep::AssertUrl { url } => format!("assert_url:{}", url),
            TestStep::AssertSorted { selector, .. } => format!("assert_sorted:{}", selector),
            TestStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }

    pub async fn run(&self, page: &dyn Page, site: &SiteConfig) -> E2eResult<()> {
        match self {
            TestStep::Navigate { url } => page.goto(&site.resolve(url)).await,
            TestStep::Login { username, password } => {
                let credentials = Credentials {
                    username: username.clone().unwrap_or_else(|| site.credentials.username.clone()),
                    password: password.clone().unwrap_or_else(|| site.credentials.password.clone()),
                };
                let login = LoginPage::new(page, site);
                login.open().await?;
                login.submit(&credentials).await
            }
            TestStep::Fill { selector, value } => page.fill(selector, value).await,
            TestStep::Click { selector } => page.click(selector).await,
            TestStep::Select { selector, value } => page.select_option(selector, value).await,
            TestStep::Assert { selector, visible, text, text_contains, count } => {
                let expect = site.expect(page, selector);
                match visible {
                    Some(true) => expect.to_be_visible().await?,
                    Some(false) => expect.to_have_count(0).await?,
                    None => {}
                }
                if let Some(text) = text {
                    expect.to_have_text(text).await?;
                }
                if let Some(fragment) = text_contains {
                    expect.to_contain_text(fragment).await?;
                }
                if let Some(count) = count {
                    expect.to_have_count(*count).await?;
                }
                Ok(())
            }
            TestStep::AssertUrl { url } => {
                expect_page(page, site.expect)
                    .to_have_url(&site.resolve(url))
                    .await
            }
            TestStep::AssertSorted { selector, order } => {
                site.expect(page, selector).to_be_visible().await?;
                let texts = page.all_texts(selector).await?;
                let prices = price::parse_prices(selector, &texts)?;
                price::check_sorted(selector, &prices, *order)
            }
            TestStep::Log { message } => {
                info!("[TEST LOG] {}", message);
                Ok(())
            }
        }
    }
}

impl TestSpec {
    /// Parse a test spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a test spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all test specs from a directory, ordered by path. An unreadable
    /// directory is an error, not an empty suite.
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut paths = Vec::new();
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry.map_err(|e| E2eError::SpecParse(format!("{}: {}", dir.display(), e)))?;
            let path = entry.into_path();
            if matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml" | "yml")) {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|p| Self::from_file(p)).collect()
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    /// Run every step in order, stopping at the first failure
    pub async fn execute(&self, page: &dyn Page, site: &SiteConfig) -> E2eResult<()> {
        for (i, step) in self.steps.iter().enumerate() {
            debug!("{} step {}: {}", self.name, i + 1, step.name());
            step.run(page, site).await?;
        }
        Ok(())
    }

    fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::SpecParse("spec has an empty name".to_string()));
        }
        if self.steps.is_empty() {
            return Err(E2eError::SpecParse(format!("{}: no steps", self.name)));
        }
        for (i, step) in self.steps.iter().enumerate() {
            if let TestStep::Assert { visible: None, text: None, text_contains: None, count: None, .. } = step {
                return Err(E2eError::SpecParse(format!(
                    "{}: step {} asserts nothing",
                    self.name,
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

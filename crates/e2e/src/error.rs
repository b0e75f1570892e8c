//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Assertion failed on '{selector}': expected {expected}, got {actual}")]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
    },

    #[error("Timed out after {timeout_ms} ms waiting for '{selector}' to {condition}")]
    Timeout {
        selector: String,
        condition: String,
        timeout_ms: u64,
    },

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Browser driver error: {0}")]
    Driver(String),

    #[error("Target {url} unreachable after {attempts} attempts")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Test spec parse error: {0}")]
    SpecParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Build a mismatch error from anything printable.
    pub fn mismatch(
        selector: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        E2eError::AssertionFailed {
            selector: selector.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

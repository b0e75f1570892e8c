//! Main test runner: scenario selection, bounded parallel execution, failure
//! artifacts and the JSON report

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::page::{Launcher, Page};
use crate::pages::SiteConfig;
use crate::scenarios::{self, Scenario};
use crate::spec::TestSpec;
use crate::target::{self, PreflightConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Element or condition never showed up
    Timeout,
    /// Page showed something other than expected
    Mismatch,
    /// Browser or bridge broke
    Driver,
    /// Anything else in the harness (IO, config)
    Harness,
}

/// Why a scenario failed, with enough context to diagnose without rerunning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: FailureKind,
    pub message: String,
    pub selector: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl From<&E2eError> for FailureReport {
    fn from(err: &E2eError) -> Self {
        let message = err.to_string();
        match err {
            E2eError::AssertionFailed { selector, expected, actual } => Self {
                kind: FailureKind::Mismatch,
                message,
                selector: Some(selector.clone()),
                expected: Some(expected.clone()),
                actual: Some(actual.clone()),
            },
            E2eError::Timeout { selector, condition, .. } => Self {
                kind: FailureKind::Timeout,
                message,
                selector: Some(selector.clone()),
                expected: Some(condition.clone()),
                actual: None,
            },
            E2eError::Driver(_) | E2eError::PlaywrightNotFound => Self {
                kind: FailureKind::Driver,
                message,
                selector: None,
                expected: None,
                actual: None,
            },
            _ => Self {
                kind: FailureKind::Harness,
                message,
                selector: None,
                expected: None,
                actual: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotRecord {
    pub path: PathBuf,
    pub sha256: String,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub failure: Option<FailureReport>,
    pub screenshot: Option<ScreenshotRecord>,
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Which scenarios to run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Tag(String),
    /// Scenario id or exact name
    Name(String),
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub site: SiteConfig,

    /// Scenarios in flight at once, each with its own browser
    pub workers: usize,

    /// Hard bound on one scenario from launch to last assertion
    pub scenario_timeout: Duration,

    /// Extra YAML scenarios
    pub specs_dir: Option<PathBuf>,

    /// Results, screenshots
    pub output_dir: PathBuf,

    pub capture_screenshots: bool,

    /// `None` skips the reachability check
    pub preflight: Option<PreflightConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            workers: 1,
            scenario_timeout: Duration::from_secs(60),
            specs_dir: None,
            output_dir: PathBuf::from("test-results"),
            capture_screenshots: true,
            preflight: Some(PreflightConfig::default()),
        }
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,
    launcher: Box<dyn Launcher>,
}

impl TestRunner {
    pub fn new(config: RunnerConfig, launcher: impl Launcher + 'static) -> Self {
        Self {
            config,
            launcher: Box::new(launcher),
        }
    }

    /// Built-in scenarios followed by any YAML specs
    pub fn scenarios(&self) -> E2eResult<Vec<Scenario>> {
        load_scenarios(self.config.specs_dir.as_deref())
    }

    pub fn select(&self, selection: &Selection) -> E2eResult<Vec<Scenario>> {
        select(self.scenarios()?, selection)
    }

    pub async fn preflight(&self) -> E2eResult<()> {
        match &self.config.preflight {
            Some(preflight) => target::wait_for_reachable(&self.config.site.base_url, preflight).await,
            None => Ok(()),
        }
    }

    /// Preflight, then run the selection
    pub async fn run_selection(&self, selection: &Selection) -> E2eResult<TestSuiteResult> {
        let scenarios = self.select(selection)?;
        self.preflight().await?;
        self.run(&scenarios).await
    }

    /// Run scenarios with at most `workers` in flight. Results keep the
    /// input order.
    pub async fn run(&self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let workers = self.config.workers.max(1);

        info!("Running {} scenario(s) with {} worker(s)...", scenarios.len(), workers);

        let results: Vec<TestResult> = stream::iter(scenarios)
            .map(|scenario| self.run_scenario(scenario))
            .buffered(workers)
            .collect()
            .await;

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!("Test Results: {} passed, {} failed ({} ms)", passed, failed, duration_ms);

        Ok(TestSuiteResult {
            base_url: self.config.site.base_url.clone(),
            started_at,
            total: results.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    /// Run one scenario on a freshly launched page. Never fails: every error
    /// ends up in the result.
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let started_at = Utc::now();
        let start = Instant::now();
        debug!("Running scenario: {} {}", scenario.id, scenario.name);

        let (outcome, screenshot) = match self.launcher.launch().await {
            Ok(page) => {
                let outcome = self.drive(scenario, page.as_ref()).await;
                let screenshot = match &outcome {
                    Err(_) if self.config.capture_screenshots => {
                        self.capture(page.as_ref(), &scenario.id).await
                    }
                    _ => None,
                };
                if let Err(e) = page.close().await {
                    warn!("Closing page for {} failed: {}", scenario.id, e);
                }
                (outcome, screenshot)
            }
            Err(e) => (Err(e), None),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(()) => info!("✓ {} {} ({} ms)", scenario.id, scenario.name, duration_ms),
            Err(e) => error!("✗ {} {} - {}", scenario.id, scenario.name, e),
        }

        TestResult {
            id: scenario.id.clone(),
            name: scenario.name.clone(),
            tags: scenario.tags.clone(),
            success: outcome.is_ok(),
            started_at,
            duration_ms,
            failure: outcome.as_ref().err().map(FailureReport::from),
            screenshot,
        }
    }

    async fn drive(&self, scenario: &Scenario, page: &dyn Page) -> E2eResult<()> {
        let bound = self.config.scenario_timeout;
        match timeout(bound, scenario.run(page, &self.config.site)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(E2eError::Timeout {
                selector: scenario.id.clone(),
                condition: "complete".to_string(),
                timeout_ms: bound.as_millis() as u64,
            }),
        }
    }

    /// Best effort: a failing screenshot must not hide the scenario's error
    async fn capture(&self, page: &dyn Page, id: &str) -> Option<ScreenshotRecord> {
        let dir = self.config.output_dir.join("screenshots");
        let path = dir.join(format!("{}.png", artifact_name(id)));

        let result = async {
            let png = page.screenshot().await?;
            std::fs::create_dir_all(&dir)?;
            std::fs::write(&path, &png)?;
            Ok::<_, E2eError>(hex::encode(Sha256::digest(&png)))
        }
        .await;

        match result {
            Ok(sha256) => {
                info!("Screenshot for {} saved to {}", id, path.display());
                Some(ScreenshotRecord { path, sha256 })
            }
            Err(e) => {
                warn!("Screenshot for {} failed: {}", id, e);
                None
            }
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        write_results(&self.config.output_dir, results)
    }
}

/// Built-in scenarios followed by the YAML specs under `specs_dir`
pub fn load_scenarios(specs_dir: Option<&Path>) -> E2eResult<Vec<Scenario>> {
    let mut all = scenarios::builtin();
    if let Some(dir) = specs_dir {
        let specs = TestSpec::load_all(dir)?;
        info!("Loaded {} spec(s) from {}", specs.len(), dir.display());
        all.extend(specs.into_iter().map(Scenario::from_spec));
    }
    Ok(all)
}

pub fn select(all: Vec<Scenario>, selection: &Selection) -> E2eResult<Vec<Scenario>> {
    match selection {
        Selection::All => Ok(all),
        Selection::Tag(tag) => Ok(all.into_iter().filter(|s| s.has_tag(tag)).collect()),
        Selection::Name(name) => {
            let picked: Vec<_> = all.into_iter().filter(|s| s.matches(name)).collect();
            if picked.is_empty() {
                return Err(E2eError::ScenarioNotFound(name.clone()));
            }
            Ok(picked)
        }
    }
}

pub fn write_results(output_dir: &Path, results: &TestSuiteResult) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("test-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

/// File-system safe version of a scenario id
fn artifact_name(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name() {
        assert_eq!(artifact_name("TC001"), "TC001");
        assert_eq!(artifact_name("cart/remove all"), "cart_remove_all");
    }

    #[test]
    fn test_failure_report_kinds() {
        let report = FailureReport::from(&E2eError::mismatch(".shopping_cart_badge", "2", "3"));
        assert_eq!(report.kind, FailureKind::Mismatch);
        assert_eq!(report.actual.as_deref(), Some("3"));

        let report = FailureReport::from(&E2eError::Timeout {
            selector: "#finish".to_string(),
            condition: "be clickable".to_string(),
            timeout_ms: 5000,
        });
        assert_eq!(report.kind, FailureKind::Timeout);
        assert_eq!(report.selector.as_deref(), Some("#finish"));
        assert_eq!(report.actual, None);

        let report = FailureReport::from(&E2eError::Driver("browser crashed".to_string()));
        assert_eq!(report.kind, FailureKind::Driver);

        let report = FailureReport::from(&E2eError::ScenarioNotFound("TC999".to_string()));
        assert_eq!(report.kind, FailureKind::Harness);
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let suite = TestSuiteResult {
            base_url: "https://shop.test".to_string(),
            started_at: Utc::now(),
            total: 0,
            passed: 0,
            failed: 0,
            duration_ms: 0,
            results: vec![],
        };
        let path = write_results(&dir.path().join("out"), &suite).unwrap();
        let parsed: TestSuiteResult =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert!(parsed.success());
        assert_eq!(parsed.base_url, "https://shop.test");
    }
}

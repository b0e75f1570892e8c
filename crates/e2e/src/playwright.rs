//! Playwright browser automation
//!
//! Each [`PlaywrightSession`] is one `node` process running the bundled
//! `driver.js`, which owns exactly one browser and one context. The Rust side
//! writes JSON requests to its stdin and reads one JSON reply per request
//! from its stdout, so the session behaves like a remote page handle.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::page::{Launcher, Page};

const DRIVER_SCRIPT: &str = include_str!("driver.js");

/// Slack on top of the Playwright timeout before the bridge itself is
/// considered hung
const REPLY_GRACE: Duration = Duration::from_secs(5);

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(format!("unknown browser '{other}' (chromium, firefox, webkit)")),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    /// `node` executable
    pub node_binary: PathBuf,

    /// `node_modules` directory that contains `playwright`, exported as
    /// `NODE_PATH`. Defaults to Node's own resolution.
    pub node_path: Option<PathBuf>,

    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Bound for clicks, fills and selects
    pub action_timeout: Duration,

    /// Bound for page loads
    pub navigation_timeout: Duration,

    /// Bound for starting node and the browser
    pub launch_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            node_binary: PathBuf::from("node"),
            node_path: None,
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            launch_timeout: Duration::from_secs(30),
        }
    }
}

/// One request on the bridge
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum DriverCommand<'a> {
    Goto { url: &'a str },
    Fill { selector: &'a str, value: &'a str },
    Click { selector: &'a str },
    SelectOption { selector: &'a str, value: &'a str },
    Text { selector: &'a str },
    AllTexts { selector: &'a str },
    Count { selector: &'a str },
    Visible { selector: &'a str },
    Url,
    Screenshot,
    Close,
}

impl DriverCommand<'_> {
    /// What a Playwright timeout on this command was waiting for
    fn target(&self) -> (&str, &'static str) {
        match self {
            DriverCommand::Goto { url } => (*url, "finish loading"),
            DriverCommand::Fill { selector, .. } => (*selector, "be editable"),
            DriverCommand::Click { selector } => (*selector, "be clickable"),
            DriverCommand::SelectOption { selector, .. } => (*selector, "offer the option"),
            DriverCommand::Text { selector }
            | DriverCommand::AllTexts { selector }
            | DriverCommand::Count { selector }
            | DriverCommand::Visible { selector } => (*selector, "be readable"),
            DriverCommand::Url | DriverCommand::Screenshot | DriverCommand::Close => {
                ("page", "respond")
            }
        }
    }
}

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    timeout_ms: u64,
    #[serde(flatten)]
    command: &'a DriverCommand<'a>,
}

#[derive(Debug, Deserialize)]
struct Handshake {
    ready: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<DriverFailure>,
}

#[derive(Debug, Deserialize)]
struct DriverFailure {
    kind: FailureKind,
    message: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum FailureKind {
    Timeout,
    Error,
}

struct DriverIo {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    closed: bool,
}

/// A live browser context behind the node bridge
pub struct PlaywrightSession {
    io: Mutex<DriverIo>,
    action_timeout: Duration,
    navigation_timeout: Duration,
    // Holds driver.js for as long as node may read it
    _workdir: tempfile::TempDir,
}

impl PlaywrightSession {
    /// Start node, launch the browser and wait for the bridge handshake
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        let workdir = tempfile::tempdir()?;
        let script_path = workdir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        let options = serde_json::json!({
            "browser": config.browser.as_str(),
            "headless": config.headless,
            "viewport": {
                "width": config.viewport_width,
                "height": config.viewport_height,
            },
        });

        debug!("Launching {} via {}", config.browser.as_str(), script_path.display());

        let mut cmd = TokioCommand::new(&config.node_binary);
        cmd.arg(&script_path)
            .arg(options.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(node_path) = &config.node_path {
            cmd.env("NODE_PATH", node_path);
        }

        let mut child = cmd.spawn().map_err(|e| {
            E2eError::Driver(format!(
                "failed to spawn {}: {}",
                config.node_binary.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Driver("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Driver("driver stdout unavailable".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "playwright", "{}", line);
                }
            });
        }

        let mut io = DriverIo {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            closed: false,
        };

        let handshake = timeout(config.launch_timeout, io.stdout.next_line())
            .await
            .map_err(|_| {
                E2eError::Driver(format!(
                    "browser did not start within {:?}",
                    config.launch_timeout
                ))
            })??
            .ok_or_else(|| E2eError::Driver("driver exited during launch".to_string()))?;

        let handshake: Handshake = serde_json::from_str(&handshake).map_err(|e| {
            E2eError::Driver(format!("unexpected handshake {handshake:?}: {e}"))
        })?;
        if !handshake.ready {
            return Err(E2eError::Driver(format!(
                "browser launch failed: {}",
                handshake.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        Ok(Self {
            io: Mutex::new(io),
            action_timeout: config.action_timeout,
            navigation_timeout: config.navigation_timeout,
            _workdir: workdir,
        })
    }

    async fn request(&self, command: DriverCommand<'_>) -> E2eResult<serde_json::Value> {
        let bound = match command {
            DriverCommand::Goto { .. } => self.navigation_timeout,
            _ => self.action_timeout,
        };
        let mut io = self.io.lock().await;
        if io.closed {
            return Err(E2eError::Driver("session already closed".to_string()));
        }
        exchange(&mut io, &command, bound).await
    }

    async fn request_as<T: serde::de::DeserializeOwned>(
        &self,
        command: DriverCommand<'_>,
    ) -> E2eResult<T> {
        let value = self.request(command).await?;
        Ok(serde_json::from_value(value)?)
    }
}

async fn exchange(
    io: &mut DriverIo,
    command: &DriverCommand<'_>,
    bound: Duration,
) -> E2eResult<serde_json::Value> {
    io.next_id += 1;
    let id = io.next_id;

    let mut line = serde_json::to_string(&Request {
        id,
        timeout_ms: bound.as_millis() as u64,
        command,
    })?;
    line.push('\n');
    io.stdin.write_all(line.as_bytes()).await?;
    io.stdin.flush().await?;

    let reply = timeout(bound + REPLY_GRACE, read_reply(&mut io.stdout, id))
        .await
        .map_err(|_| E2eError::Driver(format!("no reply to {command:?} within {:?}", bound + REPLY_GRACE)))??;

    if reply.ok {
        return Ok(reply.value);
    }

    let failure = reply.error.unwrap_or(DriverFailure {
        kind: FailureKind::Error,
        message: "driver reported failure without details".to_string(),
    });
    Err(match failure.kind {
        FailureKind::Timeout => {
            let (selector, condition) = command.target();
            E2eError::Timeout {
                selector: selector.to_string(),
                condition: condition.to_string(),
                timeout_ms: bound.as_millis() as u64,
            }
        }
        FailureKind::Error => E2eError::Driver(failure.message),
    })
}

async fn read_reply(stdout: &mut Lines<BufReader<ChildStdout>>, id: u64) -> E2eResult<Reply> {
    loop {
        let line = stdout
            .next_line()
            .await?
            .ok_or_else(|| E2eError::Driver("driver exited".to_string()))?;

        match serde_json::from_str::<Reply>(&line) {
            Ok(reply) if reply.id == id => return Ok(reply),
            Ok(reply) => warn!("Dropping stale driver reply {}", reply.id),
            // Anything else on stdout is console noise from node
            Err(_) => debug!(target: "playwright", "{}", line),
        }
    }
}

#[cfg(unix)]
fn terminate(child: &Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = child.id() {
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }
}

#[cfg(not(unix))]
fn terminate(_child: &Child) {}

#[async_trait]
impl Page for PlaywrightSession {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.request(DriverCommand::Goto { url }).await.map(drop)
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.request(DriverCommand::Fill { selector, value })
            .await
            .map(drop)
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.request(DriverCommand::Click { selector }).await.map(drop)
    }

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.request(DriverCommand::SelectOption { selector, value })
            .await
            .map(drop)
    }

    async fn text(&self, selector: &str) -> E2eResult<Option<String>> {
        self.request_as(DriverCommand::Text { selector }).await
    }

    async fn all_texts(&self, selector: &str) -> E2eResult<Vec<String>> {
        self.request_as(DriverCommand::AllTexts { selector }).await
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        self.request_as(DriverCommand::Count { selector }).await
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        self.request_as(DriverCommand::Visible { selector }).await
    }

    async fn url(&self) -> E2eResult<String> {
        self.request_as(DriverCommand::Url).await
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let encoded: String = self.request_as(DriverCommand::Screenshot).await?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| E2eError::Driver(format!("bad screenshot payload: {e}")))
    }

    async fn close(&self) -> E2eResult<()> {
        let mut io = self.io.lock().await;
        if io.closed {
            return Ok(());
        }
        io.closed = true;

        if let Err(e) = exchange(&mut io, &DriverCommand::Close, CLOSE_TIMEOUT).await {
            debug!("Close request failed: {}", e);
        }

        match timeout(CLOSE_TIMEOUT, io.child.wait()).await {
            Ok(status) => {
                debug!("Driver exited: {:?}", status?);
            }
            Err(_) => {
                warn!("Driver did not exit, terminating");
                terminate(&io.child);
                if timeout(Duration::from_millis(500), io.child.wait()).await.is_err() {
                    io.child.kill().await?;
                }
            }
        }
        Ok(())
    }
}

/// Launches a fresh browser per scenario
pub struct PlaywrightLauncher {
    config: PlaywrightConfig,
}

impl PlaywrightLauncher {
    /// Fails fast with [`E2eError::PlaywrightNotFound`] when node cannot
    /// resolve Playwright. Without an explicit `node_path` the working
    /// directory's `node_modules` is used.
    pub fn new(mut config: PlaywrightConfig) -> E2eResult<Self> {
        if config.node_path.is_none() {
            config.node_path = local_node_modules();
        }
        check_playwright_installed(&config)?;
        info!("Using Playwright {} (headless: {})", config.browser.as_str(), config.headless);
        Ok(Self { config })
    }
}

#[async_trait]
impl Launcher for PlaywrightLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn Page>> {
        Ok(Box::new(PlaywrightSession::launch(&self.config).await?))
    }
}

/// `node_modules` of the working directory, when there is one
fn local_node_modules() -> Option<PathBuf> {
    let dir = std::env::current_dir().ok()?.join("node_modules");
    dir.is_dir().then_some(dir)
}

/// Resolves `playwright` the way driver.js will: from outside any project
/// (the script runs from a temp dir) with the session's `NODE_PATH`
fn install_check(config: &PlaywrightConfig) -> Command {
    let mut cmd = Command::new(&config.node_binary);
    cmd.args(["-e", "require.resolve('playwright')"])
        .current_dir(std::env::temp_dir())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(node_path) = &config.node_path {
        cmd.env("NODE_PATH", node_path);
    }
    cmd
}

/// Check if Playwright is installed where the driver will look for it
fn check_playwright_installed(config: &PlaywrightConfig) -> E2eResult<()> {
    match install_check(config).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            debug!("Playwright resolution failed: {}", status);
            Err(E2eError::PlaywrightNotFound)
        }
        Err(e) => {
            debug!("Could not run {}: {}", config.node_binary.display(), e);
            Err(E2eError::PlaywrightNotFound)
        }
    }
}

//! Target preflight - making sure the storefront answers before any browser
//! is launched

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone)]
pub struct PreflightConfig {
    /// Give up after this long
    pub deadline: Duration,

    /// Pause between attempts
    pub retry_interval: Duration,

    /// Per-request bound
    pub request_timeout: Duration,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(10),
            retry_interval: Duration::from_millis(100),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Wait until `base_url` answers a GET with a non-server-error status
pub async fn wait_for_reachable(base_url: &str, config: &PreflightConfig) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!("Target {} is reachable ({})", base_url, resp.status());
                return Ok(());
            }
            Ok(resp) => {
                warn!("Preflight returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {}...", base_url);
                }
                if !e.is_connect() && !e.is_timeout() {
                    warn!("Preflight error: {}", e);
                }
            }
        }

        if start.elapsed() >= config.deadline {
            return Err(E2eError::TargetUnreachable {
                url: base_url.to_string(),
                attempts,
            });
        }
        sleep(config.retry_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    /// A port nothing listens on
    fn closed_port() -> u16 {
        TcpListener::bind("127.0.0.1:0")
            .expect("bind ephemeral port")
            .local_addr()
            .expect("local addr")
            .port()
    }

    #[tokio::test]
    async fn test_unreachable_target_reports_attempts() {
        let url = format!("http://127.0.0.1:{}/", closed_port());
        let config = PreflightConfig {
            deadline: Duration::from_millis(300),
            retry_interval: Duration::from_millis(50),
            request_timeout: Duration::from_millis(200),
        };

        match wait_for_reachable(&url, &config).await {
            Err(E2eError::TargetUnreachable { url: reported, attempts }) => {
                assert_eq!(reported, url);
                assert!(attempts >= 2, "only {attempts} attempts");
            }
            other => panic!("expected unreachable, got {other:?}"),
        }
    }
}

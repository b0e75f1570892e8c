//! Auto-waiting assertions over a [`Page`]
//!
//! Mirrors Playwright's `expect(locator)`: each assertion re-reads the page
//! until the condition holds or the timeout elapses. The failure keeps the
//! last observation so a report can show what the page actually had:
//!
//! - never observed the element: [`E2eError::Timeout`]
//! - observed it with another value: [`E2eError::AssertionFailed`]

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::trace;

use crate::error::{E2eError, E2eResult};
use crate::page::Page;

/// Playwright's default `expect` timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const PAGE_URL: &str = "<page url>";

#[derive(Debug, Clone, Copy)]
pub struct ExpectOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ExpectOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Pending assertion on one selector
pub struct Expect<'a> {
    page: &'a dyn Page,
    selector: String,
    options: ExpectOptions,
}

pub fn expect_with<'a>(page: &'a dyn Page, selector: &str, options: ExpectOptions) -> Expect<'a> {
    Expect {
        page,
        selector: selector.to_string(),
        options,
    }
}

/// Start an assertion on the page itself (URL checks)
pub fn expect_page(page: &dyn Page, options: ExpectOptions) -> Expect<'_> {
    expect_with(page, PAGE_URL, options)
}

impl<'a> Expect<'a> {
    /// Text equals `expected` after whitespace normalisation
    pub async fn to_have_text(&self, expected: &str) -> E2eResult<()> {
        let (page, selector) = (self.page, self.selector.as_str());
        let wanted = normalize_whitespace(expected);
        self.poll(
            &format!("have text {expected:?}"),
            &format!("{expected:?}"),
            || async move { page.text(selector).await },
            |actual| normalize_whitespace(actual) == wanted,
        )
        .await
    }

    pub async fn to_contain_text(&self, expected: &str) -> E2eResult<()> {
        let (page, selector) = (self.page, self.selector.as_str());
        let wanted = normalize_whitespace(expected);
        self.poll(
            &format!("contain text {expected:?}"),
            &format!("text containing {expected:?}"),
            || async move { page.text(selector).await },
            |actual| normalize_whitespace(actual).contains(&wanted),
        )
        .await
    }

    pub async fn to_be_visible(&self) -> E2eResult<()> {
        let (page, selector) = (self.page, self.selector.as_str());
        self.poll(
            "be visible",
            "visible",
            || async move {
                if page.count(selector).await? == 0 {
                    return Ok(None);
                }
                let state = if page.is_visible(selector).await? {
                    "visible"
                } else {
                    "hidden"
                };
                Ok::<_, E2eError>(Some(state.to_string()))
            },
            |state| state == "visible",
        )
        .await
    }

    /// Exact number of matches. Zero matches is an observation, not a timeout.
    pub async fn to_have_count(&self, expected: usize) -> E2eResult<()> {
        let (page, selector) = (self.page, self.selector.as_str());
        let wanted = expected.to_string();
        self.poll(
            &format!("have count {expected}"),
            &wanted,
            || async move { Ok::<_, E2eError>(Some(page.count(selector).await?.to_string())) },
            |actual| actual == wanted,
        )
        .await
    }

    pub async fn to_have_url(&self, expected: &str) -> E2eResult<()> {
        let page = self.page;
        self.poll(
            &format!("have URL {expected:?}"),
            expected,
            || async move { Ok::<_, E2eError>(Some(page.url().await?)) },
            |actual| actual == expected,
        )
        .await
    }

    async fn poll<P, F, A>(
        &self,
        condition: &str,
        expected: &str,
        mut probe: P,
        accept: A,
    ) -> E2eResult<()>
    where
        P: FnMut() -> F,
        F: Future<Output = E2eResult<Option<String>>>,
        A: Fn(&str) -> bool,
    {
        let deadline = Instant::now() + self.options.timeout;

        loop {
            let observed = probe().await?;
            if observed.as_deref().is_some_and(&accept) {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(match observed {
                    Some(actual) => E2eError::AssertionFailed {
                        selector: self.selector.clone(),
                        expected: expected.to_string(),
                        actual,
                    },
                    None => E2eError::Timeout {
                        selector: self.selector.clone(),
                        condition: condition.to_string(),
                        timeout_ms: self.options.timeout.as_millis() as u64,
                    },
                });
            }

            trace!(selector = %self.selector, ?observed, "waiting to {}", condition);
            sleep(self.options.poll_interval).await;
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Thank you\n  for\tyour order! "), "Thank you for your order!");
        assert_eq!(normalize_whitespace(""), "");
    }
}

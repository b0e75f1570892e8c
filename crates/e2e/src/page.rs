//! The page handle every scenario drives
//!
//! A [`Page`] is one live browser context. Actions (`goto`, `fill`, `click`,
//! `select_option`) wait for their target and fail with
//! [`E2eError::Timeout`](crate::E2eError::Timeout) when it never becomes
//! actionable. Queries (`text`, `all_texts`, `count`, `is_visible`) never
//! wait; the [`expect`](crate::expect) layer polls them.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::E2eResult;

#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to an absolute URL and wait for the load event
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Replace the value of an input field
    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> E2eResult<()>;

    /// Pick an option of a `<select>` by value
    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()>;

    /// Text content of the first match, `None` when nothing matches
    async fn text(&self, selector: &str) -> E2eResult<Option<String>>;

    /// Text content of every match, in document order
    async fn all_texts(&self, selector: &str) -> E2eResult<Vec<String>>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &str) -> E2eResult<usize>;

    async fn is_visible(&self, selector: &str) -> E2eResult<bool>;

    /// Current URL of the page
    async fn url(&self) -> E2eResult<String>;

    /// Full-page PNG screenshot
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    /// Tear down the browser context. Further calls are errors.
    async fn close(&self) -> E2eResult<()>;
}

/// Produces a fresh, isolated page for each scenario
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn Page>>;
}

#[async_trait]
impl<L: Launcher + ?Sized> Launcher for Arc<L> {
    async fn launch(&self) -> E2eResult<Box<dyn Page>> {
        (**self).launch().await
    }
}

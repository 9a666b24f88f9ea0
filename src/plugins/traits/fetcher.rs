use async_trait::async_trait;

use crate::utils::error::Result;

/// Retrieves the raw body of a product page.
///
/// Network failures, non-success statuses and timeouts must all come back
/// as `AppError::Transport` so the caller can retry them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

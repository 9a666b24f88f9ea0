use async_trait::async_trait;

use crate::utils::error::Result;

/// Trait for delivering a plain-text alert (Discord webhook, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Plugin metadata
    fn name(&self) -> &str;

    /// Errors are reported as `AppError::Delivery`.
    async fn notify(&self, message: &str) -> Result<()>;
}

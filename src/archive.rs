use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::utils::error::Result;

/// Keeps the body of the most recent page that never yielded a price.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FailureArchive: Send + Sync {
    async fn archive(&self, body: &str) -> Result<()>;
}

/// Writes the failed body to a single file, replacing whatever the previous
/// failure left there.
#[derive(Debug, Clone)]
pub struct FileArchive {
    path: PathBuf,
}

impl FileArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FailureArchive for FileArchive {
    async fn archive(&self, body: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&self.path, body).await?;
        tracing::info!(
            "Saved failed page ({} bytes) to {}",
            body.len(),
            self.path.display()
        );
        Ok(())
    }
}

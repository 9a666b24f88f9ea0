pub mod archive;
pub mod config;
pub mod fetcher;
pub mod models;
pub mod plugins;
pub mod product_manager;
pub mod scheduler;
pub mod utils;

// Re-export commonly used types
pub use archive::{FailureArchive, FileArchive};
pub use config::AppConfig;
pub use fetcher::{FetcherConfig, HttpFetcher};
pub use models::Product;
pub use product_manager::{CheckOutcome, ProductChecker, ProductManager, RetryPolicy};
pub use scheduler::{CycleReport, Pacing, PriceMonitor};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;

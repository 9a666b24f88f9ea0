pub mod fetcher;
pub mod notifier;
pub mod price_source;

pub use fetcher::Fetcher;
pub use notifier::Notifier;
pub use price_source::PriceSource;

use rust_decimal::Decimal;

/// Pulls a price out of a fetched page.
///
/// `None` means the page did not expose a recognisable price. Implementations
/// must not panic on malformed markup.
#[cfg_attr(test, mockall::automock)]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;
    fn extract_price(&self, body: &str) -> Option<Decimal>;
}

// Price extraction from product pages
pub mod currency;
pub mod price;

pub use currency::normalize_currency;
pub use price::{PriceExtractor, PriceSelectors, PriceStrategy};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product page being watched for a price drop.
///
/// Products are loaded once from configuration and never mutated while the
/// monitor runs. Two entries with the same name are checked independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub name: String,
    pub url: String,
    pub target_price: Decimal,
}

impl Product {
    pub fn new(name: impl Into<String>, url: impl Into<String>, target_price: Decimal) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            target_price,
        }
    }

    /// Prices at or below the target trigger a notification.
    pub fn is_target_reached(&self, price: Decimal) -> bool {
        price <= self.target_price
    }
}

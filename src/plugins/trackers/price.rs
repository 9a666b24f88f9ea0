use rust_decimal::Decimal;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::currency::normalize_currency;
use crate::plugins::traits::PriceSource;

/// CSS selectors for each price shape a product page may render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSelectors {
    /// Tried in order; the first non-empty match wins.
    #[serde(default = "default_full_price_selectors")]
    pub full_price: Vec<String>,
    #[serde(default = "default_whole_selector")]
    pub whole: String,
    #[serde(default = "default_fraction_selector")]
    pub fraction: String,
}

fn default_full_price_selectors() -> Vec<String> {
    vec![
        "span.a-offscreen".to_string(),
        "#corePrice_feature_div span.a-offscreen".to_string(),
    ]
}

fn default_whole_selector() -> String {
    "span.a-price-whole".to_string()
}

fn default_fraction_selector() -> String {
    "span.a-price-fraction".to_string()
}

impl Default for PriceSelectors {
    fn default() -> Self {
        Self {
            full_price: default_full_price_selectors(),
            whole: default_whole_selector(),
            fraction: default_fraction_selector(),
        }
    }
}

/// One way of locating a price in a page.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceStrategy {
    /// A single node holding the complete price text, e.g. `R$ 1.499,99`.
    FullText { selectors: Vec<String> },
    /// The integer and cents rendered in separate nodes. A missing cents
    /// node is read as `00`.
    WholeAndFraction { whole: String, fraction: String },
}

impl PriceStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            PriceStrategy::FullText { .. } => "full-text",
            PriceStrategy::WholeAndFraction { .. } => "whole-and-fraction",
        }
    }

    fn apply(&self, document: &Html) -> Option<Decimal> {
        match self {
            PriceStrategy::FullText { selectors } => selectors
                .iter()
                .find_map(|selector| first_text(document, selector))
                .and_then(|raw| normalize_currency(&raw)),
            PriceStrategy::WholeAndFraction { whole, fraction } => {
                let whole_text = first_text(document, whole)?;
                // Some variants render the decimal separator inside the whole node
                let whole_text = whole_text.trim_end_matches([',', '.']);
                let fraction_text =
                    first_text(document, fraction).unwrap_or_else(|| "00".to_string());
                normalize_currency(&format!("{},{}", whole_text, fraction_text))
            }
        }
    }
}

/// Trimmed text of the first element matching `selector`, if non-empty.
/// Invalid selectors behave like a missing node.
fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Runs an ordered chain of [`PriceStrategy`] over a page; the first
/// strategy that yields a price wins.
#[derive(Debug, Clone)]
pub struct PriceExtractor {
    strategies: Vec<PriceStrategy>,
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::from_selectors(&PriceSelectors::default())
    }
}

impl PriceExtractor {
    pub fn new(strategies: Vec<PriceStrategy>) -> Self {
        Self { strategies }
    }

    pub fn from_selectors(selectors: &PriceSelectors) -> Self {
        Self::new(vec![
            PriceStrategy::FullText {
                selectors: selectors.full_price.clone(),
            },
            PriceStrategy::WholeAndFraction {
                whole: selectors.whole.clone(),
                fraction: selectors.fraction.clone(),
            },
        ])
    }

    pub fn strategies(&self) -> &[PriceStrategy] {
        &self.strategies
    }
}

impl PriceSource for PriceExtractor {
    fn name(&self) -> &str {
        "CSS Price Extractor"
    }

    fn extract_price(&self, body: &str) -> Option<Decimal> {
        let document = Html::parse_document(body);

        for strategy in &self.strategies {
            if let Some(price) = strategy.apply(&document) {
                tracing::debug!("Price {} found with {} strategy", price, strategy.label());
                return Some(price);
            }
        }

        tracing::debug!(
            "No price strategy matched ({} tried)",
            self.strategies.len()
        );
        None
    }
}

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

use crate::archive::FailureArchive;
use crate::models::Product;
use crate::plugins::traits::{Fetcher, Notifier, PriceSource};
use crate::utils::pacing::{SleepOutcome, Sleeper};

/// How many times a product is re-fetched and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub jitter_min_seconds: i64,
    pub jitter_max_seconds: i64,
    pub min_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(30),
            jitter_min_seconds: -2,
            jitter_max_seconds: 5,
            min_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// One initial try plus `max_retries` retries.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn jittered_delay(&self) -> Duration {
        let low = self.jitter_min_seconds.min(self.jitter_max_seconds) as f64;
        let high = self.jitter_min_seconds.max(self.jitter_max_seconds) as f64;
        let jitter = rand::thread_rng().gen_range(low..=high);
        self.delay_with_jitter(jitter)
    }

    /// Base delay shifted by `jitter_seconds`, never below `min_delay`.
    pub fn delay_with_jitter(&self, jitter_seconds: f64) -> Duration {
        let seconds = self.base_delay.as_secs_f64() + jitter_seconds;
        let seconds = seconds.max(self.min_delay.as_secs_f64());
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// A price was read; `notified` is true when an alert was delivered.
    Resolved {
        price: Decimal,
        attempts: u32,
        notified: bool,
    },
    /// Every attempt failed; `archived` is true when the last page was saved.
    Exhausted { attempts: u32, archived: bool },
    /// Shutdown arrived while waiting to retry.
    Interrupted { attempts: u32 },
}

impl CheckOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            CheckOutcome::Resolved { attempts, .. }
            | CheckOutcome::Exhausted { attempts, .. }
            | CheckOutcome::Interrupted { attempts } => *attempts,
        }
    }
}

/// Something that can run one full check of a product. The monitor only
/// depends on this, which keeps its pacing testable on its own.
#[async_trait]
pub trait ProductChecker: Send + Sync {
    async fn check_product(&self, product: &Product) -> CheckOutcome;
}

#[derive(Debug, Default)]
struct AttemptState {
    attempts_made: u32,
    last_body: Option<String>,
}

pub struct ProductManager {
    fetcher: Arc<dyn Fetcher>,
    price_source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    archive: Arc<dyn FailureArchive>,
    sleeper: Arc<dyn Sleeper>,
    retry_policy: RetryPolicy,
    currency_symbol: String,
}

impl ProductManager {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        price_source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        archive: Arc<dyn FailureArchive>,
        sleeper: Arc<dyn Sleeper>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            price_source,
            notifier,
            archive,
            sleeper,
            retry_policy,
            currency_symbol: "R$".to_string(),
        }
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Fetches and parses a product until a price is found or the retry
    /// budget runs out.
    ///
    /// A found price ends the check immediately, whether or not it is low
    /// enough to notify. Transport errors and pages without a price both
    /// consume an attempt. When every attempt fails, the last fetched body
    /// (if any) goes to the failure archive.
    pub async fn check_with_retry(&self, product: &Product) -> CheckOutcome {
        let max_attempts = self.retry_policy.max_attempts();
        let mut state = AttemptState::default();

        loop {
            let attempt = state.attempts_made + 1;

            match self.fetcher.fetch(&product.url).await {
                Ok(body) => {
                    let price = self.price_source.extract_price(&body);
                    state.last_body = Some(body);

                    if let Some(price) = price {
                        tracing::info!(
                            "{} -> current price {} {:.2} (target {} {:.2})",
                            product.name,
                            self.currency_symbol,
                            price,
                            self.currency_symbol,
                            product.target_price
                        );
                        let notified = self.maybe_notify(product, price).await;
                        return CheckOutcome::Resolved {
                            price,
                            attempts: attempt,
                            notified,
                        };
                    }

                    tracing::warn!(
                        "Could not extract a price for '{}' (attempt {}/{})",
                        product.name,
                        attempt,
                        max_attempts
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to fetch '{}' (attempt {}/{}): {}",
                        product.name,
                        attempt,
                        max_attempts,
                        e
                    );
                }
            }

            state.attempts_made = attempt;
            if state.attempts_made >= max_attempts {
                break;
            }

            let delay = self.retry_policy.jittered_delay();
            tracing::info!(
                "Retrying '{}' in {:.1}s",
                product.name,
                delay.as_secs_f64()
            );
            if self.sleeper.sleep(delay).await == SleepOutcome::Interrupted {
                tracing::info!("Retry of '{}' interrupted by shutdown", product.name);
                return CheckOutcome::Interrupted {
                    attempts: state.attempts_made,
                };
            }
        }

        tracing::error!(
            "Giving up on '{}' after {} attempts",
            product.name,
            state.attempts_made
        );

        let archived = match state.last_body.as_deref() {
            Some(body) => match self.archive.archive(body).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("Failed to archive page for '{}': {}", product.name, e);
                    false
                }
            },
            None => {
                tracing::debug!("No page body to archive for '{}'", product.name);
                false
            }
        };

        CheckOutcome::Exhausted {
            attempts: state.attempts_made,
            archived,
        }
    }

    /// Sends an alert when `price` is at or below the product's target.
    ///
    /// Delivery failures are logged and swallowed; returns whether an alert
    /// went out.
    pub async fn maybe_notify(&self, product: &Product, price: Decimal) -> bool {
        if !product.is_target_reached(price) {
            return false;
        }

        let message = self.build_message(product, price);
        match self.notifier.notify(&message).await {
            Ok(()) => {
                tracing::info!("Notification sent for '{}'", product.name);
                true
            }
            Err(e) => {
                tracing::error!("Failed to send notification for '{}': {}", product.name, e);
                false
            }
        }
    }

    pub fn build_message(&self, product: &Product, price: Decimal) -> String {
        format!(
            "🔥 The price of **{}** dropped to **{} {:.2}** (target: {} {:.2})\nLink: {}",
            product.name,
            self.currency_symbol,
            price,
            self.currency_symbol,
            product.target_price,
            product.url
        )
    }
}

#[async_trait]
impl ProductChecker for ProductManager {
    async fn check_product(&self, product: &Product) -> CheckOutcome {
        self.check_with_retry(product).await
    }
}

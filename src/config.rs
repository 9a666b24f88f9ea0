use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::fetcher::{build_header_map, FetcherConfig};
use crate::models::Product;
use crate::plugins::notifiers::DiscordConfig;
use crate::plugins::trackers::PriceSelectors;
use crate::product_manager::RetryPolicy;
use crate::utils::Result;

/// Upper bound for retry delays, one day.
const MAX_DELAY_SECONDS: u64 = 86_400;
use crate::scheduler::Pacing;

/// Everything the watcher reads from `config.json`, with environment
/// overrides under the `PRICE_WATCH` prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub products: Vec<Product>,
    pub webhook_url: String,
    #[serde(default)]
    pub request_headers: HashMap<String, String>,

    #[serde(default = "default_interval_between_products")]
    pub interval_between_products_seconds: u64,
    #[serde(default = "default_interval_between_cycles")]
    pub interval_between_cycles_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_seconds: u64,
    #[serde(default = "default_jitter_min")]
    pub jitter_min_seconds: i64,
    #[serde(default = "default_jitter_max")]
    pub jitter_max_seconds: i64,
    #[serde(default = "default_min_delay")]
    pub min_delay_seconds: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_failure_artifact_path")]
    pub failure_artifact_path: PathBuf,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default)]
    pub discord_username: Option<String>,
    #[serde(default)]
    pub discord_avatar_url: Option<String>,

    #[serde(default)]
    pub selectors: PriceSelectors,
}

fn default_interval_between_products() -> u64 {
    30
}

fn default_interval_between_cycles() -> u64 {
    3600
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay() -> u64 {
    30
}

fn default_jitter_min() -> i64 {
    -2
}

fn default_jitter_max() -> i64 {
    5
}

fn default_min_delay() -> u64 {
    1
}

fn default_request_timeout() -> u64 {
    15
}

fn default_failure_artifact_path() -> PathBuf {
    PathBuf::from("last_failure.html")
}

fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = Config::builder()
            .add_source(File::from(path.as_ref()))
            // Add environment variables with prefix "PRICE_WATCH_"
            .add_source(
                Environment::with_prefix("PRICE_WATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !Self::is_http_url(&self.webhook_url) {
            return Err(ConfigError::Message("webhook_url must be a valid http(s) URL".into()));
        }

        for (index, product) in self.products.iter().enumerate() {
            if product.name.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "Product #{} has an empty name",
                    index + 1
                )));
            }
            if !Self::is_http_url(&product.url) {
                return Err(ConfigError::Message(format!(
                    "Product '{}' has an invalid URL: {}",
                    product.name, product.url
                )));
            }
            if product.target_price.is_sign_negative() {
                return Err(ConfigError::Message(format!(
                    "Product '{}' target_price must not be negative",
                    product.name
                )));
            }
        }

        if self.jitter_min_seconds > self.jitter_max_seconds {
            return Err(ConfigError::Message(
                "jitter_min_seconds cannot exceed jitter_max_seconds".into(),
            ));
        }

        if self.base_delay_seconds > MAX_DELAY_SECONDS
            || self.min_delay_seconds > MAX_DELAY_SECONDS
        {
            return Err(ConfigError::Message(format!(
                "base_delay_seconds and min_delay_seconds must not exceed {}",
                MAX_DELAY_SECONDS
            )));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }

        if let Err(e) = build_header_map(&self.request_headers) {
            return Err(ConfigError::Message(e.to_string()));
        }

        Ok(())
    }

    fn is_http_url(value: &str) -> bool {
        match Url::parse(value) {
            Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
            Err(_) => false,
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            between_items: Duration::from_secs(self.interval_between_products_seconds),
            between_cycles: Duration::from_secs(self.interval_between_cycles_seconds),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_secs(self.base_delay_seconds),
            jitter_min_seconds: self.jitter_min_seconds,
            jitter_max_seconds: self.jitter_max_seconds,
            min_delay: Duration::from_secs(self.min_delay_seconds),
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            headers: self.request_headers.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }

    pub fn discord_config(&self) -> DiscordConfig {
        DiscordConfig {
            webhook_url: self.webhook_url.clone(),
            username: self.discord_username.clone(),
            avatar_url: self.discord_avatar_url.clone(),
        }
    }
}

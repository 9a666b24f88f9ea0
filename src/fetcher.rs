use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::plugins::traits::Fetcher;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub headers: HashMap<String, String>,
    pub request_timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Builds a header map, rejecting names or values HTTP cannot carry.
pub fn build_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Validation(format!("Invalid header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| {
                AppError::Validation(format!("Invalid value for header '{}': {}", name, e))
            })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Plain HTTP GET fetcher. Timeouts and non-2xx statuses come back as
/// transport errors.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(build_header_map(&config.headers)?)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::transport(url, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| AppError::transport(url, e))?;

        let body = response.text().await.map_err(|e| AppError::transport(url, e))?;

        tracing::debug!(
            "Fetched {} ({} bytes) in {}ms",
            url,
            body.len(),
            start_time.elapsed().as_millis()
        );
        Ok(body)
    }
}

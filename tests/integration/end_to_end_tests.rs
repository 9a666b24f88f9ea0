use rust_decimal::Decimal;
use std::io::Write;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use price_drop_watcher::{
    AppConfig, FileArchive, HttpFetcher, Pacing, PriceMonitor,
    plugins::notifiers::DiscordNotifier,
    utils::TokioSleeper,
};

fn instant_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::ZERO,
        jitter_min_seconds: 0,
        jitter_max_seconds: 0,
        min_delay: Duration::ZERO,
    }
}

fn no_pacing() -> Pacing {
    Pacing {
        between_items: Duration::ZERO,
        between_cycles: Duration::ZERO,
    }
}

fn build_monitor(config: &AppConfig, retry_policy: RetryPolicy) -> PriceMonitor {
    let sleeper = Arc::new(TokioSleeper::uninterruptible());
    let manager = ProductManager::new(
        Arc::new(HttpFetcher::new(&config.fetcher_config()).unwrap()),
        Arc::new(PriceExtractor::from_selectors(&config.selectors)),
        Arc::new(DiscordNotifier::new(config.discord_config()).unwrap()),
        Arc::new(FileArchive::new(config.failure_artifact_path.clone())),
        sleeper.clone(),
        retry_policy,
    )
    .with_currency_symbol(config.currency_symbol.clone());

    PriceMonitor::new(config.products.clone(), Arc::new(manager), sleeper, no_pacing())
}

fn write_config(dir: &std::path::Path, server_uri: &str) -> std::path::PathBuf {
    let config_path = dir.join("config.json");
    let contents = format!(
        r#"{{
            "webhook_url": "{uri}/api/webhooks/42/token",
            "request_headers": {{"User-Agent": "Mozilla/5.0 (X11; Linux x86_64)"}},
            "failure_artifact_path": "{artifact}",
            "products": [
                {{"name": "Kindle", "url": "{uri}/dp/kindle", "target_price": 500.0}},
                {{"name": "Echo", "url": "{uri}/dp/echo", "target_price": 1500.0}},
                {{"name": "Fire TV", "url": "{uri}/dp/fire", "target_price": 100.0}}
            ]
        }}"#,
        uri = server_uri,
        artifact = dir.join("failures").join("last_failure.html").display(),
    );
    let mut file = std::fs::File::create(&config_path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    config_path
}

#[tokio::test]
async fn test_full_cycle_against_mock_store() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Kindle: split price shape, above target
    Mock::given(method("GET"))
        .and(path("/dp/kindle"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPLIT_PRICE_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    // Echo: full price shape, below target
    Mock::given(method("GET"))
        .and(path("/dp/echo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FULL_PRICE_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    // Fire TV: captcha on every attempt
    Mock::given(method("GET"))
        .and(path("/dp/fire"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAPTCHA_PAGE))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/42/token"))
        .and(body_string_contains("Echo"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig::from_file(write_config(dir.path(), &server.uri())).unwrap();
    let monitor = build_monitor(&config, instant_retries(2));

    let report = monitor.run_cycle().await;

    assert_eq!(report.checked, 3);
    assert_eq!(report.resolved, 2);
    assert_eq!(report.exhausted, 1);
    assert!(!report.interrupted);

    let archived = std::fs::read_to_string(&config.failure_artifact_path).unwrap();
    assert_eq!(archived, CAPTCHA_PAGE);
}

#[tokio::test]
async fn test_server_errors_are_retried_then_recovered() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/dp/kindle"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dp/kindle"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<span class="a-offscreen">R$ 449,00</span>"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config: AppConfig = serde_json::from_value(serde_json::json!({
        "webhook_url": format!("{}/hook", server.uri()),
        "failure_artifact_path": dir.path().join("last_failure.html"),
        "products": [
            {"name": "Kindle", "url": format!("{}/dp/kindle", server.uri()), "target_price": 500}
        ]
    }))
    .unwrap();
    let monitor = build_monitor(&config, instant_retries(2));

    let report = monitor.run_cycle().await;

    // The webhook failed, but the check itself resolved
    assert_eq!(report.resolved, 1);
    assert_eq!(report.exhausted, 0);
    assert!(!dir.path().join("last_failure.html").exists());
}

#[tokio::test]
async fn test_products_from_config_keep_order_and_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let config: AppConfig = serde_json::from_value(serde_json::json!({
        "webhook_url": "https://discord.com/api/webhooks/1/token",
        "failure_artifact_path": dir.path().join("x.html"),
        "products": [
            {"name": "Kindle", "url": "https://example.com/a", "target_price": 1},
            {"name": "Kindle", "url": "https://example.com/b", "target_price": 2}
        ]
    }))
    .unwrap();

    assert!(config.validate().is_ok());
    let monitor = build_monitor(&config, instant_retries(0));
    let urls: Vec<_> = monitor.products().iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
    assert_eq!(monitor.products()[1].target_price, Decimal::new(2, 0));
}

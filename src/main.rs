use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use price_drop_watcher::{
    AppConfig, FileArchive, HttpFetcher, PriceMonitor, ProductManager,
    plugins::{
        Notifier, PriceSource,
        notifiers::DiscordNotifier,
        trackers::PriceExtractor,
    },
    utils::TokioSleeper,
};

#[derive(Debug, Parser)]
#[command(name = "price-drop-watcher", version, about = "Watches product pages for price drops")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Run a single pass over the products and exit
    #[arg(long)]
    once: bool,

    /// Load and validate the configuration, then exit
    #[arg(long)]
    validate: bool,

    /// Log filter directive for this crate (e.g. debug, info, warn)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("price_drop_watcher={}", cli.log_level).parse()?),
        )
        .init();

    let config = AppConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if cli.validate {
        println!(
            "Configuration OK: {} products, retries {}, {}s between products, {}s between cycles",
            config.products.len(),
            config.max_retries,
            config.interval_between_products_seconds,
            config.interval_between_cycles_seconds
        );
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sleeper = Arc::new(TokioSleeper::new(shutdown_rx));

    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher_config())?);
    let price_source: Arc<dyn PriceSource> =
        Arc::new(PriceExtractor::from_selectors(&config.selectors));
    let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(config.discord_config())?);
    let archive = Arc::new(FileArchive::new(config.failure_artifact_path.clone()));

    info!(
        "Starting Price Drop Watcher: {} products, parser '{}', notifier '{}'",
        config.products.len(),
        price_source.name(),
        notifier.name()
    );

    let product_manager = ProductManager::new(
        fetcher,
        price_source,
        notifier,
        archive,
        sleeper.clone(),
        config.retry_policy(),
    )
    .with_currency_symbol(config.currency_symbol.clone());

    let monitor = PriceMonitor::new(
        config.products.clone(),
        Arc::new(product_manager),
        sleeper,
        config.pacing(),
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    if cli.once {
        let report = monitor.run_cycle().await;
        info!(
            "Single pass finished: {} checked, {} priced, {} failed",
            report.checked, report.resolved, report.exhausted
        );
    } else {
        monitor.run_forever().await;
    }

    info!("Price Drop Watcher stopped");
    Ok(())
}

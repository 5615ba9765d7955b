use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use kleinwatch::config::AppConfig;
use kleinwatch::monitor::{MonitorCycle, MonitorTuning, PriceCycle, ShutdownSignal, TaskManager, TrackingCycle};
use kleinwatch::notifications::{LogNotifier, NotificationSink, WebhookNotifier};
use kleinwatch::scraper::{ListingScraper, PriceClient};
use kleinwatch::storage::{MarketStore, SqliteStore};
use kleinwatch::tracking::{CarrierApi, TrackingClient};

#[derive(Parser)]
#[command(name = "kleinwatch", about = "Purchase and watchlist monitor", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the monitoring service until interrupted
    Run,
    /// Run a single price-watch cycle and exit
    CheckPrices,
    /// Run a single shipment-tracking cycle and exit
    CheckTracking,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kleinwatch=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let store: Arc<dyn MarketStore> = Arc::new(SqliteStore::connect(&config.database).await?);
    let price_client: Arc<dyn PriceClient> = Arc::new(ListingScraper::new(&config.scraper)?);
    let tracking_client: Arc<dyn TrackingClient> = Arc::new(CarrierApi::new(&config.scraper)?);
    let sink: Arc<dyn NotificationSink> = match &config.notifications.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url)?),
        None => Arc::new(LogNotifier),
    };
    let tuning = MonitorTuning::default();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!("Starting kleinwatch...");
            let mut manager =
                TaskManager::new(store, price_client, tracking_client, sink, tuning);
            manager.start_all().await?;

            tokio::signal::ctrl_c().await?;
            info!("Shutting down...");
            manager.stop_all().await;
        }
        Command::CheckPrices => {
            let cycle = PriceCycle::new(store, price_client, sink, tuning.price_item_delay);
            let (_tx, mut shutdown) = ShutdownSignal::channel();
            let outcome = cycle.run_cycle(&mut shutdown).await?;
            info!(
                checked = outcome.checked,
                updated = outcome.updated,
                "price check completed"
            );
        }
        Command::CheckTracking => {
            let cycle =
                TrackingCycle::new(store, tracking_client, sink, tuning.tracking_item_delay);
            let (_tx, mut shutdown) = ShutdownSignal::channel();
            let outcome = cycle.run_cycle(&mut shutdown).await?;
            info!(
                checked = outcome.checked,
                updated = outcome.updated,
                "tracking check completed"
            );
        }
    }

    Ok(())
}

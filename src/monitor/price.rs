use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::models::WatchedItem;
use crate::monitor::{CycleOutcome, LoopKind, MonitorCycle, ShutdownSignal};
use crate::notifications::{Notification, NotificationSink, PriceChangeEvent};
use crate::scraper::PriceClient;
use crate::storage::MarketStore;
use crate::utils::Result;

/// One pass over the watched items: fetch each listing's current price,
/// record changes, raise price-change events. Items are checked strictly
/// sequentially with a pause in between; the marketplace is rate-sensitive.
pub struct PriceCycle {
    store: Arc<dyn MarketStore>,
    client: Arc<dyn PriceClient>,
    sink: Arc<dyn NotificationSink>,
    item_delay: Duration,
}

impl PriceCycle {
    pub fn new(
        store: Arc<dyn MarketStore>,
        client: Arc<dyn PriceClient>,
        sink: Arc<dyn NotificationSink>,
        item_delay: Duration,
    ) -> Self {
        Self {
            store,
            client,
            sink,
            item_delay,
        }
    }

    async fn check_item(&self, item: &mut WatchedItem) -> Result<bool> {
        let observed = self.client.fetch_current_price(&item.url).await?;
        let change = item.apply_price(observed, Utc::now());
        self.store.save_item(item).await?;

        let Some(change) = change else {
            return Ok(false);
        };

        if item.notifications_enabled {
            let event = PriceChangeEvent::new(
                &item.id,
                &item.title,
                &item.url,
                change.old_price,
                change.new_price,
            );
            self.sink.emit(Notification::PriceChange(event)).await?;
        }

        Ok(true)
    }
}

#[async_trait]
impl MonitorCycle for PriceCycle {
    fn kind(&self) -> LoopKind {
        LoopKind::Price
    }

    async fn run_cycle(&self, shutdown: &mut ShutdownSignal) -> Result<CycleOutcome> {
        let items = self.store.list_watchable_items().await?;
        let mut outcome = CycleOutcome::default();

        if items.is_empty() {
            return Ok(outcome);
        }
        tracing::debug!(count = items.len(), "checking watched item prices");

        for mut item in items {
            if shutdown.is_shutdown() {
                break;
            }

            outcome.checked += 1;
            match self.check_item(&mut item).await {
                Ok(true) => {
                    outcome.updated += 1;
                    tracing::info!(item = %item.title, price = item.current_price, "price change detected");
                }
                Ok(false) => {}
                // One item's failure must not abort the cycle
                Err(e) => tracing::warn!(item = %item.title, error = %e, "price check failed"),
            }

            if shutdown.sleep(self.item_delay).await {
                break;
            }
        }

        Ok(outcome)
    }
}

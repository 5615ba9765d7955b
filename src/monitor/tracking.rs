use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{Order, ShipmentState};
use crate::monitor::{CycleOutcome, LoopKind, MonitorCycle, ShutdownSignal};
use crate::notifications::{Notification, NotificationSink, TrackingUpdateEvent};
use crate::storage::MarketStore;
use crate::tracking::{normalize_tracking_result, resolve_carrier, TrackingClient, TrackingSnapshot};
use crate::utils::Result;

/// One pass over the undelivered orders: fetch each shipment's raw carrier
/// status, normalize it, persist the result (idempotent write) and raise an
/// event when status or progress moved. Sequential with a pause between
/// items, like the price cycle.
pub struct TrackingCycle {
    store: Arc<dyn MarketStore>,
    client: Arc<dyn TrackingClient>,
    sink: Arc<dyn NotificationSink>,
    item_delay: Duration,
}

impl TrackingCycle {
    pub fn new(
        store: Arc<dyn MarketStore>,
        client: Arc<dyn TrackingClient>,
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

    async fn check_shipment(&self, order: &mut Order) -> Result<bool> {
        let Some(tracking_number) = order.tracking_number.clone() else {
            return Ok(false);
        };

        let carrier = resolve_carrier(order.carrier, &tracking_number);
        let snapshot = match self.client.fetch_raw_status(&tracking_number, carrier).await {
            Ok(payload) => normalize_tracking_result(&tracking_number, &payload),
            // A failed fetch still produces a persistable snapshot
            Err(e) => TrackingSnapshot::failure(carrier, &tracking_number, e.to_string()),
        };

        let previous_status = order.tracking_status.clone();
        let previous_progress = order.progress;
        let was_delivered = order.state == ShipmentState::Delivered;

        order.apply_tracking(&snapshot, Utc::now());
        self.store.save_shipment(order).await?;

        if order.state == ShipmentState::Delivered && !was_delivered {
            tracing::info!(order = %order.title, "package delivered");
        }

        let changed = snapshot.error.is_none()
            && (previous_progress != order.progress
                || previous_status != order.tracking_status);
        if changed {
            let event = TrackingUpdateEvent {
                order_id: order.id.clone(),
                title: order.title.clone(),
                carrier,
                status: snapshot.status.clone(),
                progress: snapshot.progress,
                delivered: order.state == ShipmentState::Delivered,
                url: snapshot.url.clone(),
            };
            self.sink.emit(Notification::TrackingUpdate(event)).await?;
        }

        Ok(changed)
    }
}

#[async_trait]
impl MonitorCycle for TrackingCycle {
    fn kind(&self) -> LoopKind {
        LoopKind::Tracking
    }

    async fn run_cycle(&self, shutdown: &mut ShutdownSignal) -> Result<CycleOutcome> {
        let orders = self.store.list_active_shipments().await?;
        let mut outcome = CycleOutcome::default();

        if orders.is_empty() {
            return Ok(outcome);
        }
        tracing::debug!(count = orders.len(), "checking shipment tracking");

        for mut order in orders {
            if shutdown.is_shutdown() {
                break;
            }

            outcome.checked += 1;
            match self.check_shipment(&mut order).await {
                Ok(true) => outcome.updated += 1,
                Ok(false) => {}
                // One shipment's failure must not abort the cycle
                Err(e) => tracing::warn!(order = %order.title, error = %e, "tracking check failed"),
            }

            if shutdown.sleep(self.item_delay).await {
                break;
            }
        }

        Ok(outcome)
    }
}

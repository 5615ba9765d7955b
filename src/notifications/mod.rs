use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::PriceDirection;
use crate::tracking::Carrier;
use crate::utils::Result;

pub mod webhook;

pub use webhook::WebhookNotifier;

/// Payload raised by the price loop when a watched listing's price moves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceChangeEvent {
    pub item_id: String,
    pub title: String,
    pub old_price: f64,
    pub new_price: f64,
    /// Absolute difference between old and new price.
    pub change: f64,
    pub change_type: PriceDirection,
    pub url: String,
}

impl PriceChangeEvent {
    pub fn new(item_id: &str, title: &str, url: &str, old_price: f64, new_price: f64) -> Self {
        let change_type = if new_price > old_price {
            PriceDirection::Increased
        } else {
            PriceDirection::Decreased
        };
        Self {
            item_id: item_id.to_string(),
            title: title.to_string(),
            old_price,
            new_price,
            change: (new_price - old_price).abs(),
            change_type,
            url: url.to_string(),
        }
    }
}

/// Payload raised by the tracking loop when a shipment's status moves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingUpdateEvent {
    pub order_id: String,
    pub title: String,
    pub carrier: Carrier,
    pub status: String,
    pub progress: u8,
    pub delivered: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    PriceChange(PriceChangeEvent),
    TrackingUpdate(TrackingUpdateEvent),
}

/// Sink for the ephemeral notification payloads produced by a monitoring
/// cycle. The core hands events off and does not retain them.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn emit(&self, notification: Notification) -> Result<()>;
}

/// Default sink: structured log lines only.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn emit(&self, notification: Notification) -> Result<()> {
        match notification {
            Notification::PriceChange(event) => {
                tracing::info!(
                    item = %event.title,
                    old = event.old_price,
                    new = event.new_price,
                    direction = ?event.change_type,
                    "price change detected"
                );
            }
            Notification::TrackingUpdate(event) => {
                tracing::info!(
                    order = %event.title,
                    carrier = %event.carrier,
                    status = %event.status,
                    progress = event.progress,
                    "tracking update"
                );
            }
        }
        Ok(())
    }
}

// Shared test doubles for the integration suite: scripted clients over the
// narrow monitor traits, a collecting notification sink, and fixture
// builders.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use kleinwatch::models::{NewOrder, NewWatchedItem, Order, WatchedItem};
use kleinwatch::monitor::MonitorTuning;
use kleinwatch::notifications::{Notification, NotificationSink};
use kleinwatch::scraper::PriceClient;
use kleinwatch::tracking::{
    Carrier, DhlPayload, DhlShipment, HermesPayload, RawTrackingPayload, TrackingClient,
};
use kleinwatch::utils::AppError;
use kleinwatch::Result;

pub mod settings_tests;
pub mod carrier_api_tests;

/// Millisecond pacing so a whole cycle fits into a test.
pub fn fast_tuning() -> MonitorTuning {
    MonitorTuning {
        price_item_delay: Duration::from_millis(1),
        tracking_item_delay: Duration::from_millis(1),
        error_backoff: Duration::from_millis(10),
        restart_grace: Duration::from_millis(1),
    }
}

pub fn watched_item(ad_id: &str, price: f64) -> WatchedItem {
    WatchedItem::new(NewWatchedItem {
        ad_id: ad_id.to_string(),
        title: format!("Item {}", ad_id),
        url: format!("https://www.kleinanzeigen.de/s-anzeige/{}", ad_id),
        price,
    })
}

pub fn shipment(ad_id: &str, tracking_number: &str, carrier: Option<Carrier>) -> Order {
    Order::new(NewOrder {
        ad_id: ad_id.to_string(),
        title: format!("Order {}", ad_id),
        price: 50.0,
        article_url: None,
        tracking_number: Some(tracking_number.to_string()),
        carrier,
    })
}

/// Price client returning scripted prices per URL, with optional per-call
/// latency and per-URL failure injection.
#[derive(Default)]
pub struct ScriptedPriceClient {
    prices: Mutex<HashMap<String, f64>>,
    failing: Mutex<HashSet<String>>,
    pub calls: AtomicUsize,
    pub latency: Duration,
}

impl ScriptedPriceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&self, url: &str, price: f64) {
        self.prices.lock().unwrap().insert(url.to_string(), price);
    }

    pub fn fail_for(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }
}

#[async_trait]
impl PriceClient for ScriptedPriceClient {
    async fn fetch_current_price(&self, url: &str) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.lock().unwrap().contains(url) {
            return Err(AppError::Scraping(format!("connection refused: {}", url)));
        }
        self.prices
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .ok_or_else(|| AppError::Scraping(format!("no price found at {}", url)))
    }
}

/// Tracking client returning a scripted status text per tracking number,
/// wrapped in the payload shape of whichever carrier is asked for. Records
/// the carrier hint of every call.
#[derive(Default)]
pub struct ScriptedTrackingClient {
    statuses: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    pub calls: Mutex<Vec<(String, Carrier)>>,
}

impl ScriptedTrackingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, tracking_number: &str, status: &str) {
        self.statuses
            .lock()
            .unwrap()
            .insert(tracking_number.to_string(), status.to_string());
    }

    pub fn fail_for(&self, tracking_number: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(tracking_number.to_string());
    }

    pub fn carrier_hints(&self) -> Vec<Carrier> {
        self.calls.lock().unwrap().iter().map(|(_, c)| *c).collect()
    }
}

#[async_trait]
impl TrackingClient for ScriptedTrackingClient {
    async fn fetch_raw_status(
        &self,
        tracking_number: &str,
        carrier: Carrier,
    ) -> Result<RawTrackingPayload> {
        self.calls
            .lock()
            .unwrap()
            .push((tracking_number.to_string(), carrier));

        if self.failing.lock().unwrap().contains(tracking_number) {
            return Err(AppError::Tracking {
                carrier: carrier.to_string(),
                message: "connection reset".to_string(),
            });
        }

        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(tracking_number)
            .cloned()
            .unwrap_or_else(|| "Status unknown".to_string());

        match carrier {
            Carrier::Dhl => {
                let shipment: DhlShipment = serde_json::from_value(serde_json::json!({
                    "hasCompleteDetails": true,
                    "sendungsdetails": {
                        "sendungsverlauf": { "aktuellerStatus": status, "events": [] }
                    }
                }))
                .expect("valid scripted payload");
                Ok(RawTrackingPayload::Dhl(DhlPayload {
                    sendungen: vec![shipment],
                }))
            }
            Carrier::Hermes => {
                let payload: HermesPayload = serde_json::from_value(serde_json::json!({
                    "status": { "text": { "longText": status, "shortText": "" } },
                    "parcelHistory": []
                }))
                .expect("valid scripted payload");
                Ok(RawTrackingPayload::Hermes(payload))
            }
        }
    }
}

/// Sink that records every emitted notification.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Notification>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    pub fn price_changes(&self) -> Vec<kleinwatch::notifications::PriceChangeEvent> {
        self.events()
            .into_iter()
            .filter_map(|n| match n {
                Notification::PriceChange(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn tracking_updates(&self) -> Vec<kleinwatch::notifications::TrackingUpdateEvent> {
        self.events()
            .into_iter()
            .filter_map(|n| match n {
                Notification::TrackingUpdate(e) => Some(e),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl NotificationSink for CollectingSink {
    async fn emit(&self, notification: Notification) -> Result<()> {
        self.events.lock().unwrap().push(notification);
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{generate_id, ShipmentState};
use crate::tracking::{Carrier, TrackingSnapshot};

/// A purchase made on the marketplace. The tracking loop only touches the
/// shipment subset of these fields (tracking number, carrier, status,
/// progress, state).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub ad_id: String,
    pub title: String,
    pub price: f64,
    pub article_url: Option<String>,
    pub tracking_number: Option<String>,
    pub carrier: Option<Carrier>,
    pub tracking_status: Option<String>,
    pub progress: u8,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub state: ShipmentState,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub ad_id: String,
    pub title: String,
    pub price: f64,
    pub article_url: Option<String>,
    pub tracking_number: Option<String>,
    pub carrier: Option<Carrier>,
}

impl Order {
    pub fn new(new_order: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            ad_id: new_order.ad_id,
            title: new_order.title,
            price: new_order.price,
            article_url: new_order.article_url,
            tracking_number: new_order.tracking_number,
            carrier: new_order.carrier,
            tracking_status: None,
            progress: 0,
            status_updated_at: None,
            state: ShipmentState::Ordered,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold a normalized tracking snapshot into the order. The write is
    /// idempotent: status, progress and timestamp are overwritten on every
    /// check. Progress 100 moves the order to Delivered regardless of prior
    /// state; a clean non-terminal result promotes Ordered to Shipped. A
    /// carrier resolved by detection is kept once known.
    pub fn apply_tracking(&mut self, snapshot: &TrackingSnapshot, now: DateTime<Utc>) {
        if self.carrier.is_none() {
            self.carrier = Some(snapshot.carrier);
        }

        self.tracking_status = Some(snapshot.status.clone());
        self.progress = snapshot.progress;
        self.status_updated_at = Some(now);

        if snapshot.progress == 100 {
            self.state = ShipmentState::Delivered;
        } else if snapshot.error.is_none() && self.state == ShipmentState::Ordered {
            self.state = ShipmentState::Shipped;
        }

        self.updated_at = now;
    }
}

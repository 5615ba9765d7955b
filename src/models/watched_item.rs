use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::generate_id;

/// Upper bound on retained price observations per item, oldest evicted first.
pub const MAX_PRICE_HISTORY: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedItem {
    pub id: String,
    pub ad_id: String,
    pub title: String,
    pub url: String,
    pub current_price: f64,
    pub initial_price: f64,
    pub last_price: f64,
    pub price_history: Vec<PricePoint>,
    pub notifications_enabled: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWatchedItem {
    pub ad_id: String,
    pub title: String,
    pub url: String,
    pub price: f64,
}

/// The price movement recorded by one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub old_price: f64,
    pub new_price: f64,
}

impl WatchedItem {
    pub fn new(new_item: NewWatchedItem) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            ad_id: new_item.ad_id,
            title: new_item.title,
            url: new_item.url,
            current_price: new_item.price,
            initial_price: new_item.price,
            last_price: new_item.price,
            price_history: Vec::new(),
            notifications_enabled: true,
            last_checked: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a freshly observed price. Returns the movement if the observation
    /// counts as a change: the price must be non-zero and differ from the
    /// stored current price. `last_checked` is stamped either way.
    pub fn apply_price(&mut self, observed: f64, now: DateTime<Utc>) -> Option<PriceChange> {
        self.last_checked = Some(now);

        if observed <= 0.0 || observed == self.current_price {
            return None;
        }

        let change = PriceChange {
            old_price: self.current_price,
            new_price: observed,
        };

        self.last_price = self.current_price;
        self.current_price = observed;
        self.price_history.push(PricePoint {
            price: observed,
            timestamp: now,
        });
        if self.price_history.len() > MAX_PRICE_HISTORY {
            let excess = self.price_history.len() - MAX_PRICE_HISTORY;
            self.price_history.drain(..excess);
        }
        self.updated_at = now;

        Some(change)
    }
}

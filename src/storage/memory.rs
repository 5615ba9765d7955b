use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{MonitorSettings, Order, ShipmentState, WatchedItem};
use crate::storage::MarketStore;
use crate::utils::Result;

/// In-memory store, used by the one-shot CLI commands without a database and
/// by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, WatchedItem>>,
    orders: Mutex<HashMap<String, Order>>,
    settings: Mutex<Option<MonitorSettings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: MonitorSettings) -> Self {
        let store = Self::new();
        *store.settings.lock().unwrap() = Some(settings);
        store
    }

    pub fn insert_item(&self, item: WatchedItem) {
        self.items.lock().unwrap().insert(item.id.clone(), item);
    }

    pub fn insert_order(&self, order: Order) {
        self.orders.lock().unwrap().insert(order.id.clone(), order);
    }

    pub fn get_item(&self, id: &str) -> Option<WatchedItem> {
        self.items.lock().unwrap().get(id).cloned()
    }

    pub fn get_order(&self, id: &str) -> Option<Order> {
        self.orders.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn list_watchable_items(&self) -> Result<Vec<WatchedItem>> {
        let mut items: Vec<WatchedItem> = self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|item| item.notifications_enabled)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn list_active_shipments(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|order| {
                order.tracking_number.is_some() && order.state != ShipmentState::Delivered
            })
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }

    async fn save_item(&self, item: &WatchedItem) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn save_shipment(&self, order: &Order) -> Result<()> {
        self.orders
            .lock()
            .unwrap()
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn load_settings(&self) -> Result<MonitorSettings> {
        Ok(self.settings.lock().unwrap().unwrap_or_default())
    }

    async fn save_settings(&self, settings: &MonitorSettings) -> Result<()> {
        *self.settings.lock().unwrap() = Some(*settings);
        Ok(())
    }
}

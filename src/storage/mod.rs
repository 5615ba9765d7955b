use async_trait::async_trait;

use crate::models::{MonitorSettings, Order, WatchedItem};
use crate::utils::Result;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence seam the monitoring loops run against. The two work-set
/// queries are filtered at the store: the price loop only sees items with
/// notifications enabled, the tracking loop only sees undelivered orders
/// that carry a tracking number. A delivered shipment drops out of the
/// work-set by construction.
#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn list_watchable_items(&self) -> Result<Vec<WatchedItem>>;
    async fn list_active_shipments(&self) -> Result<Vec<Order>>;
    async fn save_item(&self, item: &WatchedItem) -> Result<()>;
    async fn save_shipment(&self, order: &Order) -> Result<()>;
    async fn load_settings(&self) -> Result<MonitorSettings>;
    async fn save_settings(&self, settings: &MonitorSettings) -> Result<()>;
}

/// Settings keys as stored in the key/value settings table.
pub(crate) mod settings_keys {
    pub const PRICE_ENABLED: &str = "auto_check_enabled";
    pub const PRICE_INTERVAL: &str = "auto_check_interval";
    pub const TRACKING_ENABLED: &str = "auto_tracking_enabled";
    pub const TRACKING_INTERVAL: &str = "auto_tracking_interval";
}

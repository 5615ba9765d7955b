use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::models::{LoopSettings, MonitorSettings, Order, PricePoint, WatchedItem};
use crate::storage::{settings_keys, MarketStore};
use crate::tracking::Carrier;
use crate::utils::Result;

/// SQLite-backed store. The schema is created on connect.
pub struct SqliteStore {
    pool: SqlitePool,
}

const CREATE_WATCHED_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS watched_items (
    id TEXT PRIMARY KEY,
    ad_id TEXT UNIQUE NOT NULL,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    current_price REAL NOT NULL DEFAULT 0,
    initial_price REAL NOT NULL DEFAULT 0,
    last_price REAL NOT NULL DEFAULT 0,
    price_history TEXT NOT NULL DEFAULT '[]',
    notifications_enabled INTEGER NOT NULL DEFAULT 1,
    last_checked TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

const CREATE_ORDERS: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    ad_id TEXT UNIQUE NOT NULL,
    title TEXT NOT NULL,
    price REAL NOT NULL DEFAULT 0,
    article_url TEXT,
    tracking_number TEXT,
    carrier TEXT,
    tracking_status TEXT,
    progress INTEGER NOT NULL DEFAULT 0,
    status_updated_at TEXT,
    state TEXT NOT NULL DEFAULT 'ordered',
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

const CREATE_APP_SETTINGS: &str = r#"
CREATE TABLE IF NOT EXISTS app_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
"#;

impl SqliteStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .connect(&config.url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_WATCHED_ITEMS).execute(&self.pool).await?;
        sqlx::query(CREATE_ORDERS).execute(&self.pool).await?;
        sqlx::query(CREATE_APP_SETTINGS).execute(&self.pool).await?;
        Ok(())
    }

    fn item_from_row(row: &SqliteRow) -> Result<WatchedItem> {
        let history_json: String = row.try_get("price_history")?;
        let price_history: Vec<PricePoint> = serde_json::from_str(&history_json)?;

        Ok(WatchedItem {
            id: row.try_get("id")?,
            ad_id: row.try_get("ad_id")?,
            title: row.try_get("title")?,
            url: row.try_get("url")?,
            current_price: row.try_get("current_price")?,
            initial_price: row.try_get("initial_price")?,
            last_price: row.try_get("last_price")?,
            price_history,
            notifications_enabled: row.try_get("notifications_enabled")?,
            last_checked: row.try_get::<Option<DateTime<Utc>>, _>("last_checked")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn order_from_row(row: &SqliteRow) -> Result<Order> {
        Ok(Order {
            id: row.try_get("id")?,
            ad_id: row.try_get("ad_id")?,
            title: row.try_get("title")?,
            price: row.try_get("price")?,
            article_url: row.try_get("article_url")?,
            tracking_number: row.try_get("tracking_number")?,
            carrier: row.try_get::<Option<Carrier>, _>("carrier")?,
            tracking_status: row.try_get("tracking_status")?,
            progress: row.try_get::<i64, _>("progress")? as u8,
            status_updated_at: row.try_get::<Option<DateTime<Utc>>, _>("status_updated_at")?,
            state: row.try_get("state")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn read_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let row = sqlx::query("SELECT value FROM app_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("value")?;
        // Settings rows hold JSON values; legacy rows may hold bare strings.
        Ok(Some(
            serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw)),
        ))
    }

    async fn write_setting(&self, key: &str, value: serde_json::Value) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO app_settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MarketStore for SqliteStore {
    async fn list_watchable_items(&self) -> Result<Vec<WatchedItem>> {
        let rows = sqlx::query(
            "SELECT * FROM watched_items WHERE notifications_enabled = 1 ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::item_from_row).collect()
    }

    async fn list_active_shipments(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders \
             WHERE tracking_number IS NOT NULL AND state != 'delivered' \
             ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::order_from_row).collect()
    }

    async fn save_item(&self, item: &WatchedItem) -> Result<()> {
        let history_json = serde_json::to_string(&item.price_history)?;

        sqlx::query(
            "INSERT OR REPLACE INTO watched_items \
             (id, ad_id, title, url, current_price, initial_price, last_price, \
              price_history, notifications_enabled, last_checked, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&item.ad_id)
        .bind(&item.title)
        .bind(&item.url)
        .bind(item.current_price)
        .bind(item.initial_price)
        .bind(item.last_price)
        .bind(history_json)
        .bind(item.notifications_enabled)
        .bind(item.last_checked)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_shipment(&self, order: &Order) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO orders \
             (id, ad_id, title, price, article_url, tracking_number, carrier, \
              tracking_status, progress, status_updated_at, state, notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(&order.ad_id)
        .bind(&order.title)
        .bind(order.price)
        .bind(&order.article_url)
        .bind(&order.tracking_number)
        .bind(order.carrier)
        .bind(&order.tracking_status)
        .bind(order.progress as i64)
        .bind(order.status_updated_at)
        .bind(order.state)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_settings(&self) -> Result<MonitorSettings> {
        let defaults = MonitorSettings::default();

        let price = LoopSettings {
            enabled: self
                .read_setting(settings_keys::PRICE_ENABLED)
                .await?
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.price.enabled),
            interval_minutes: self
                .read_setting(settings_keys::PRICE_INTERVAL)
                .await?
                .and_then(|v| v.as_u64())
                .map(|v| v as u32)
                .unwrap_or(defaults.price.interval_minutes),
        };

        let tracking = LoopSettings {
            enabled: self
                .read_setting(settings_keys::TRACKING_ENABLED)
                .await?
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.tracking.enabled),
            interval_minutes: self
                .read_setting(settings_keys::TRACKING_INTERVAL)
                .await?
                .and_then(|v| v.as_u64())
                .map(|v| v as u32)
                .unwrap_or(defaults.tracking.interval_minutes),
        };

        Ok(MonitorSettings { price, tracking })
    }

    async fn save_settings(&self, settings: &MonitorSettings) -> Result<()> {
        self.write_setting(
            settings_keys::PRICE_ENABLED,
            serde_json::json!(settings.price.enabled),
        )
        .await?;
        self.write_setting(
            settings_keys::PRICE_INTERVAL,
            serde_json::json!(settings.price.interval_minutes),
        )
        .await?;
        self.write_setting(
            settings_keys::TRACKING_ENABLED,
            serde_json::json!(settings.tracking.enabled),
        )
        .await?;
        self.write_setting(
            settings_keys::TRACKING_INTERVAL,
            serde_json::json!(settings.tracking.interval_minutes),
        )
        .await?;
        Ok(())
    }
}

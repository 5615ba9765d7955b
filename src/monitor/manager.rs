use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::models::{MonitorSettings, SettingsUpdate};
use crate::monitor::{MonitorLoop, MonitorTuning, PriceCycle, TrackingCycle};
use crate::notifications::NotificationSink;
use crate::scraper::PriceClient;
use crate::storage::MarketStore;
use crate::tracking::TrackingClient;
use crate::utils::{AppError, Result};

/// Run-state snapshot exposed to whatever fronts the control surface.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MonitorStatus {
    pub price_active: bool,
    pub tracking_active: bool,
    pub last_price_run: Option<DateTime<Utc>>,
    pub last_tracking_run: Option<DateTime<Utc>>,
}

/// Owns the lifecycle of both monitoring loops. Constructed explicitly and
/// injected where needed; there is no global instance. Settings changes go
/// through `restart_with`: a full stop/start of the affected loops, never a
/// live mutation of a running loop.
pub struct TaskManager {
    store: Arc<dyn MarketStore>,
    price: MonitorLoop,
    tracking: MonitorLoop,
    settings: MonitorSettings,
    restart_grace: Duration,
}

impl TaskManager {
    pub fn new(
        store: Arc<dyn MarketStore>,
        price_client: Arc<dyn PriceClient>,
        tracking_client: Arc<dyn TrackingClient>,
        sink: Arc<dyn NotificationSink>,
        tuning: MonitorTuning,
    ) -> Self {
        let price_cycle = PriceCycle::new(
            Arc::clone(&store),
            price_client,
            Arc::clone(&sink),
            tuning.price_item_delay,
        );
        let tracking_cycle = TrackingCycle::new(
            Arc::clone(&store),
            tracking_client,
            sink,
            tuning.tracking_item_delay,
        );

        Self {
            price: MonitorLoop::new(Arc::new(price_cycle), tuning.error_backoff),
            tracking: MonitorLoop::new(Arc::new(tracking_cycle), tuning.error_backoff),
            store,
            settings: MonitorSettings::default(),
            restart_grace: tuning.restart_grace,
        }
    }

    /// Load settings from the store and start every enabled loop. A settings
    /// load failure is surfaced and leaves both loops stopped.
    pub async fn start_all(&mut self) -> Result<()> {
        self.settings = self.store.load_settings().await?;
        tracing::info!(
            price_enabled = self.settings.price.enabled,
            price_interval = self.settings.price.interval_minutes,
            tracking_enabled = self.settings.tracking.enabled,
            tracking_interval = self.settings.tracking.interval_minutes,
            "starting monitor loops"
        );

        self.price.start(&self.settings.price).await;
        self.tracking.start(&self.settings.tracking).await;
        Ok(())
    }

    /// Cancel both loops and await their clean termination.
    pub async fn stop_all(&mut self) {
        tokio::join!(self.price.stop(), self.tracking.stop());
        tracing::info!("monitor loops stopped");
    }

    /// The sole path for applying configuration changes: validate, merge the
    /// provided fields into the cached settings, persist, then fully restart
    /// both loops.
    pub async fn restart_with(&mut self, update: SettingsUpdate) -> Result<()> {
        update.validate().map_err(AppError::from)?;

        self.settings.merge(&update);
        self.store.save_settings(&self.settings).await?;

        self.stop_all().await;
        // Give in-flight teardown a moment before respawning
        tokio::time::sleep(self.restart_grace).await;
        self.start_all().await
    }

    /// Non-blocking read of both loops' run state.
    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            price_active: self.price.is_active(),
            tracking_active: self.tracking.is_active(),
            last_price_run: self.price.last_run(),
            last_tracking_run: self.tracking.last_run(),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }
}

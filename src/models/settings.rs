use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-loop monitor configuration. The authoritative copy lives in the store
/// as key/value rows; `TaskManager` caches a working copy between restarts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LoopSettings {
    pub enabled: bool,
    pub interval_minutes: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonitorSettings {
    pub price: LoopSettings,
    pub tracking: LoopSettings,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            price: LoopSettings {
                enabled: true,
                interval_minutes: 60,
            },
            tracking: LoopSettings {
                enabled: true,
                interval_minutes: 30,
            },
        }
    }
}

/// Partial settings patch applied through `TaskManager::restart_with`. Only
/// the provided fields are merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SettingsUpdate {
    pub price_enabled: Option<bool>,
    #[validate(range(min = 1, max = 1440))]
    pub price_interval_minutes: Option<u32>,
    pub tracking_enabled: Option<bool>,
    #[validate(range(min = 1, max = 1440))]
    pub tracking_interval_minutes: Option<u32>,
}

impl MonitorSettings {
    pub fn merge(&mut self, update: &SettingsUpdate) {
        if let Some(enabled) = update.price_enabled {
            self.price.enabled = enabled;
        }
        if let Some(interval) = update.price_interval_minutes {
            self.price.interval_minutes = interval;
        }
        if let Some(enabled) = update.tracking_enabled {
            self.tracking.enabled = enabled;
        }
        if let Some(interval) = update.tracking_interval_minutes {
            self.tracking.interval_minutes = interval;
        }
    }
}

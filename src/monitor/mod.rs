use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::utils::Result;

pub mod manager;
pub mod price;
pub mod runner;
pub mod tracking;

pub use manager::{MonitorStatus, TaskManager};
pub use price::PriceCycle;
pub use runner::{MonitorLoop, ShutdownSignal};
pub use tracking::TrackingCycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    Price,
    Tracking,
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopKind::Price => write!(f, "price"),
            LoopKind::Tracking => write!(f, "tracking"),
        }
    }
}

/// Fixed pacing of the monitoring loops. The inter-item pauses keep the
/// remote services from being hammered; the backoff throttles a loop whose
/// whole cycle failed. Tests shrink these to milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct MonitorTuning {
    pub price_item_delay: Duration,
    pub tracking_item_delay: Duration,
    pub error_backoff: Duration,
    pub restart_grace: Duration,
}

impl Default for MonitorTuning {
    fn default() -> Self {
        Self {
            price_item_delay: Duration::from_secs(2),
            tracking_item_delay: Duration::from_secs(1),
            error_backoff: Duration::from_secs(60),
            restart_grace: Duration::from_secs(1),
        }
    }
}

/// Counters reported by one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub checked: usize,
    pub updated: usize,
}

/// One pass over a loop's work-set. Implementations must treat the shutdown
/// signal as a cancellation point between items and must absorb per-item
/// failures; only cycle-level failures (work-set unavailable) are returned
/// as errors.
#[async_trait]
pub trait MonitorCycle: Send + Sync + 'static {
    fn kind(&self) -> LoopKind;
    async fn run_cycle(&self, shutdown: &mut ShutdownSignal) -> Result<CycleOutcome>;
}

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::LoopSettings;
use crate::monitor::MonitorCycle;

/// Receiving end of a loop's cancellation channel. Cancellation is
/// cooperative: it only takes effect at the suspension points (the
/// inter-item pause, the end-of-cycle sleep and the error backoff), so
/// mid-item work is never interrupted.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Create a signal together with its controlling sender. Dropping the
    /// sender counts as a shutdown request.
    pub fn channel() -> (watch::Sender<bool>, ShutdownSignal) {
        let (tx, rx) = watch::channel(false);
        (tx, ShutdownSignal { rx })
    }

    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleep that doubles as a cancellation point. Returns true when
    /// shutdown was requested, either before or during the sleep.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_shutdown() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.rx.changed() => true,
        }
    }
}

/// Run status shared between a loop task and `TaskManager::status` readers.
/// Written only by the owning loop; reads never block.
#[derive(Default)]
struct LoopState {
    active: AtomicBool,
    last_run: RwLock<Option<DateTime<Utc>>>,
}

impl LoopState {
    fn mark_run(&self) {
        *self.last_run.write().unwrap() = Some(Utc::now());
    }
}

/// A cancellable recurring task: Stopped -> Running -> Stopped, re-armable.
/// `start` is idempotent; a prior run is cancelled and awaited before the
/// new one spawns, so the same loop never runs twice concurrently.
pub struct MonitorLoop {
    cycle: Arc<dyn MonitorCycle>,
    state: Arc<LoopState>,
    error_backoff: Duration,
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl MonitorLoop {
    pub fn new(cycle: Arc<dyn MonitorCycle>, error_backoff: Duration) -> Self {
        Self {
            cycle,
            state: Arc::new(LoopState::default()),
            error_backoff,
            shutdown_tx: None,
            handle: None,
        }
    }

    pub async fn start(&mut self, settings: &LoopSettings) {
        // Cancel any prior run first
        self.stop().await;

        let kind = self.cycle.kind();
        if !settings.enabled {
            tracing::debug!(%kind, "monitor loop disabled, not starting");
            return;
        }

        let interval = Duration::from_secs(u64::from(settings.interval_minutes) * 60);
        let (tx, shutdown) = ShutdownSignal::channel();
        let cycle = Arc::clone(&self.cycle);
        let state = Arc::clone(&self.state);
        let backoff = self.error_backoff;

        state.active.store(true, Ordering::SeqCst);
        let handle = tokio::spawn(run_loop(cycle, state, interval, backoff, shutdown));

        self.shutdown_tx = Some(tx);
        self.handle = Some(handle);
        tracing::info!(%kind, interval_minutes = settings.interval_minutes, "monitor loop started");
    }

    /// Request cancellation and await clean termination. The loop exits at
    /// its next suspension point; an in-flight item check is allowed to
    /// finish first.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::SeqCst)
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        *self.state.last_run.read().unwrap()
    }
}

async fn run_loop(
    cycle: Arc<dyn MonitorCycle>,
    state: Arc<LoopState>,
    interval: Duration,
    backoff: Duration,
    mut shutdown: ShutdownSignal,
) {
    let kind = cycle.kind();

    loop {
        if shutdown.is_shutdown() {
            break;
        }

        match cycle.run_cycle(&mut shutdown).await {
            Ok(outcome) => {
                state.mark_run();
                tracing::info!(
                    %kind,
                    checked = outcome.checked,
                    updated = outcome.updated,
                    "cycle completed"
                );
                if shutdown.sleep(interval).await {
                    break;
                }
            }
            Err(e) => {
                // The loop survives cycle failures: back off and retry.
                tracing::error!(%kind, error = %e, "cycle failed, backing off");
                if shutdown.sleep(backoff).await {
                    break;
                }
            }
        }
    }

    state.active.store(false, Ordering::SeqCst);
    tracing::info!(%kind, "monitor loop stopped");
}
